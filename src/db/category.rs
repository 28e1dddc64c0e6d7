use super::DBClient;
use crate::dtos::CategoryDto;
use crate::models::Category;
use uuid::Uuid;

pub trait CategoryExt {
    /// Public listing, alphabetical, with approved-tool counts.
    async fn get_categories_by_name(&self) -> Result<Vec<CategoryDto>, sqlx::Error>;

    /// Back-office listing, newest first.
    async fn get_categories_by_creation(&self) -> Result<Vec<CategoryDto>, sqlx::Error>;

    async fn get_category(&self, category_id: Uuid) -> Result<Option<Category>, sqlx::Error>;

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, sqlx::Error>;

    async fn create_category(
        &self,
        name: &str,
        slug: &str,
        icon: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error>;

    async fn update_category(
        &self,
        category_id: Uuid,
        name: &str,
        slug: &str,
        icon: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error>;

    async fn delete_category(&self, category_id: Uuid) -> Result<(), sqlx::Error>;

    async fn get_category_count(&self) -> Result<i64, sqlx::Error>;
}

const CATEGORY_WITH_COUNT: &str = r#"
    SELECT c.id, c.name, c.slug, c.icon, c.description, c.created_at,
           COUNT(t.id) AS tool_count
    FROM categories c
    LEFT JOIN tools t ON t.category_id = c.id AND t.status = 'approved'
    GROUP BY c.id
"#;

impl CategoryExt for DBClient {
    async fn get_categories_by_name(&self) -> Result<Vec<CategoryDto>, sqlx::Error> {
        let sql = format!("{CATEGORY_WITH_COUNT} ORDER BY c.name ASC");
        sqlx::query_as::<_, CategoryDto>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_categories_by_creation(&self) -> Result<Vec<CategoryDto>, sqlx::Error> {
        let sql = format!("{CATEGORY_WITH_COUNT} ORDER BY c.created_at DESC");
        sqlx::query_as::<_, CategoryDto>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_category(&self, category_id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, icon, description, created_at FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, icon, description, created_at FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_category(
        &self,
        name: &str,
        slug: &str,
        icon: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, icon, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, icon, description, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(icon)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_category(
        &self,
        category_id: Uuid,
        name: &str,
        slug: &str,
        icon: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        // last write wins; no version column
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, icon = $3, description = $4
            WHERE id = $5
            RETURNING id, name, slug, icon, description, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(icon)
        .bind(description)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_category(&self, category_id: Uuid) -> Result<(), sqlx::Error> {
        // tools and, through them, reviews cascade
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_category_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ReviewExt, ToolExt, fixtures};
    use crate::models::ToolStatus;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a Postgres DATABASE_URL"]
    async fn deleting_a_category_removes_its_tools_and_their_reviews(pool: PgPool) {
        let db = DBClient::new(pool);
        let reviewer = fixtures::profile(&db, "Ana").await;
        let doomed = fixtures::category(&db, "images").await;
        let kept = fixtures::category(&db, "text").await;
        let lost = fixtures::tool(&db, doomed.id, "pixel", ToolStatus::Approved).await;
        let other = fixtures::tool(&db, kept.id, "prose", ToolStatus::Approved).await;
        db.save_review(lost.id, reviewer.id, 5, None).await.unwrap();
        db.save_review(other.id, reviewer.id, 3, None).await.unwrap();

        db.delete_category(doomed.id).await.unwrap();

        assert!(db.get_category(doomed.id).await.unwrap().is_none());
        assert!(db.get_tool(lost.id).await.unwrap().is_none());
        assert!(db.get_tool_reviews(lost.id).await.unwrap().is_empty());
        assert!(db.get_tool(other.id).await.unwrap().is_some());
        assert_eq!(db.get_review_stats().await.unwrap().total, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a Postgres DATABASE_URL"]
    async fn tool_counts_only_include_approved_tools(pool: PgPool) {
        let db = DBClient::new(pool);
        let category = fixtures::category(&db, "music").await;
        fixtures::tool(&db, category.id, "beat", ToolStatus::Approved).await;
        fixtures::tool(&db, category.id, "hum", ToolStatus::Pending).await;

        let listed = db.get_categories_by_name().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].tool_count, 1);
    }
}
