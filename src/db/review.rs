use super::DBClient;
use crate::dtos::{AdminReviewRow, ToolReviewDto};
use crate::models::Review;
use crate::utils::rating::ReviewStats;
use uuid::Uuid;

pub trait ReviewExt {
    /// Reviews of one tool, newest first, with the reviewer's display name.
    async fn get_tool_reviews(&self, tool_id: Uuid) -> Result<Vec<ToolReviewDto>, sqlx::Error>;

    /// Insert a review. A second review of the same tool by the same user
    /// fails with the unique-violation SQLSTATE; callers map it.
    async fn save_review(
        &self,
        tool_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error>;

    /// Moderation listing, optionally narrowed to one star rating.
    async fn get_admin_reviews(
        &self,
        rating: Option<i32>,
    ) -> Result<Vec<AdminReviewRow>, sqlx::Error>;

    /// Aggregate over every review, independent of any listing filter.
    async fn get_review_stats(&self) -> Result<ReviewStats, sqlx::Error>;

    async fn delete_review(&self, review_id: Uuid) -> Result<(), sqlx::Error>;
}

impl ReviewExt for DBClient {
    async fn get_tool_reviews(&self, tool_id: Uuid) -> Result<Vec<ToolReviewDto>, sqlx::Error> {
        sqlx::query_as::<_, ToolReviewDto>(
            r#"
            SELECT r.id, r.rating, r.comment, r.created_at, p.display_name AS reviewer_name
            FROM reviews r
            LEFT JOIN user_profiles p ON p.id = r.user_id
            WHERE r.tool_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_review(
        &self,
        tool_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (tool_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tool_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(tool_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_admin_reviews(
        &self,
        rating: Option<i32>,
    ) -> Result<Vec<AdminReviewRow>, sqlx::Error> {
        // left joins keep reviews whose tool or reviewer is gone
        sqlx::query_as::<_, AdminReviewRow>(
            r#"
            SELECT r.id, r.rating, r.comment, r.created_at,
                   t.id AS tool_id, t.name AS tool_name, t.slug AS tool_slug,
                   p.id AS reviewer_id, p.display_name AS reviewer_name
            FROM reviews r
            LEFT JOIN tools t ON t.id = r.tool_id
            LEFT JOIN user_profiles p ON p.id = r.user_id
            WHERE ($1::int IS NULL OR r.rating = $1)
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(rating)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_review_stats(&self) -> Result<ReviewStats, sqlx::Error> {
        let (total, average, five_star, low) = sqlx::query_as::<_, (i64, Option<f64>, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   AVG(rating)::float8,
                   COUNT(*) FILTER (WHERE rating = 5),
                   COUNT(*) FILTER (WHERE rating <= 2)
            FROM reviews
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewStats::from_aggregate(total, average, five_star, low))
    }

    async fn delete_review(&self, review_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::error::{UNIQUE_VIOLATION, sql_state};
    use crate::handler::tools::map_review_error;
    use crate::models::ToolStatus;
    use axum::http::StatusCode;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a Postgres DATABASE_URL"]
    async fn second_review_of_a_tool_is_a_conflict(pool: PgPool) {
        let db = DBClient::new(pool);
        let reviewer = fixtures::profile(&db, "Ana").await;
        let category = fixtures::category(&db, "writing").await;
        let tool = fixtures::tool(&db, category.id, "quill", ToolStatus::Approved).await;

        db.save_review(tool.id, reviewer.id, 5, Some("great"))
            .await
            .unwrap();
        let err = db
            .save_review(tool.id, reviewer.id, 1, None)
            .await
            .unwrap_err();

        assert_eq!(sql_state(&err).as_deref(), Some(UNIQUE_VIOLATION));
        let http = map_review_error(err);
        assert_eq!(http.status, StatusCode::CONFLICT);
        assert_eq!(http.message, "You have already reviewed this tool");
        assert_eq!(db.get_tool_reviews(tool.id).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a Postgres DATABASE_URL"]
    async fn rating_filter_does_not_narrow_the_stats(pool: PgPool) {
        let db = DBClient::new(pool);
        let category = fixtures::category(&db, "audio").await;
        let tool = fixtures::tool(&db, category.id, "echo", ToolStatus::Approved).await;
        for (name, rating) in [("Ana", 5), ("Ben", 4), ("Cy", 1)] {
            let reviewer = fixtures::profile(&db, name).await;
            db.save_review(tool.id, reviewer.id, rating, None)
                .await
                .unwrap();
        }

        let five_star = db.get_admin_reviews(Some(5)).await.unwrap();
        assert_eq!(five_star.len(), 1);
        assert_eq!(five_star[0].tool_name.as_deref(), Some("echo"));
        assert_eq!(five_star[0].reviewer_name.as_deref(), Some("Ana"));

        let stats = db.get_review_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.five_star, 1);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.average, 3.3);
    }
}
