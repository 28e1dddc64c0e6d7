use super::DBClient;
use crate::dtos::{DashboardStatsDto, RecentToolDto, StatusCountsDto, ToolSummaryDto};
use crate::generation::ToolContext;
use crate::models::{Tool, ToolDraft, ToolStatus};
use crate::utils::rating::round_rating;
use uuid::Uuid;

// Shared projection for catalog rows. Ratings are aggregated in SQL; rounding
// to one decimal happens in `finish_summaries`.
const SUMMARY_SELECT: &str = r#"
    SELECT t.id, t.name, t.slug, t.description, t.url, t.image_url, t.pricing, t.platforms,
           t.verified, t.featured, t.status, t.created_at, t.category_id,
           c.name AS category_name, c.slug AS category_slug,
           COALESCE(AVG(r.rating), 0)::float8 AS rating,
           COUNT(r.id) AS review_count
    FROM tools t
    LEFT JOIN categories c ON c.id = t.category_id
    LEFT JOIN reviews r ON r.tool_id = t.id
"#;

const TOOL_COLUMNS: &str = "id, name, slug, description, long_description, url, image_url, \
     category_id, pricing, platforms, verified, featured, status, submitted_by, created_at";

fn finish_summaries(mut rows: Vec<ToolSummaryDto>) -> Vec<ToolSummaryDto> {
    for row in rows.iter_mut() {
        row.rating = round_rating(row.rating);
    }
    rows
}

pub trait ToolExt {
    /// Approved tools, newest first, optionally narrowed by category slug,
    /// featured flag and a case-insensitive name/description match.
    async fn get_catalog(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
        search: Option<&str>,
    ) -> Result<Vec<ToolSummaryDto>, sqlx::Error>;

    /// Every tool regardless of status, or only those with `status`.
    async fn get_admin_tools(
        &self,
        status: Option<ToolStatus>,
    ) -> Result<Vec<ToolSummaryDto>, sqlx::Error>;

    async fn get_status_counts(&self) -> Result<StatusCountsDto, sqlx::Error>;

    async fn get_tool(&self, tool_id: Uuid) -> Result<Option<Tool>, sqlx::Error>;

    /// Name, description, url and category name, for prompt building.
    async fn get_tool_context(&self, tool_id: Uuid) -> Result<Option<ToolContext>, sqlx::Error>;

    async fn create_tool(&self, draft: &ToolDraft) -> Result<Tool, sqlx::Error>;

    /// Replace the editable fields. `submitted_by` and `created_at` are kept.
    async fn update_tool(&self, tool_id: Uuid, draft: &ToolDraft) -> Result<Tool, sqlx::Error>;

    async fn update_tool_status(
        &self,
        tool_id: Uuid,
        status: ToolStatus,
    ) -> Result<Tool, sqlx::Error>;

    async fn toggle_featured(&self, tool_id: Uuid) -> Result<Tool, sqlx::Error>;

    async fn toggle_verified(&self, tool_id: Uuid) -> Result<Tool, sqlx::Error>;

    async fn delete_tool(&self, tool_id: Uuid) -> Result<(), sqlx::Error>;

    async fn get_recent_tools(&self, limit: i64) -> Result<Vec<RecentToolDto>, sqlx::Error>;

    async fn get_approved_count(&self) -> Result<i64, sqlx::Error>;

    async fn get_dashboard_stats(&self) -> Result<DashboardStatsDto, sqlx::Error>;
}

impl ToolExt for DBClient {
    async fn get_catalog(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
        search: Option<&str>,
    ) -> Result<Vec<ToolSummaryDto>, sqlx::Error> {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            WHERE t.status = 'approved'
              AND ($1::text IS NULL OR c.slug = $1)
              AND ($2::bool IS NULL OR t.featured = $2)
              AND ($3::text IS NULL
                   OR strpos(lower(t.name), lower($3)) > 0
                   OR strpos(lower(t.description), lower($3)) > 0)
            GROUP BY t.id, c.id
            ORDER BY t.created_at DESC"#
        );

        let rows = sqlx::query_as::<_, ToolSummaryDto>(&sql)
            .bind(category_slug)
            .bind(featured)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;

        Ok(finish_summaries(rows))
    }

    async fn get_admin_tools(
        &self,
        status: Option<ToolStatus>,
    ) -> Result<Vec<ToolSummaryDto>, sqlx::Error> {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            WHERE ($1::tool_status IS NULL OR t.status = $1)
            GROUP BY t.id, c.id
            ORDER BY t.created_at DESC"#
        );

        let rows = sqlx::query_as::<_, ToolSummaryDto>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(finish_summaries(rows))
    }

    async fn get_status_counts(&self) -> Result<StatusCountsDto, sqlx::Error> {
        let rows = sqlx::query_as::<_, (ToolStatus, i64)>(
            "SELECT status, COUNT(*) FROM tools GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StatusCountsDto::from_rows(&rows))
    }

    async fn get_tool(&self, tool_id: Uuid) -> Result<Option<Tool>, sqlx::Error> {
        let sql = format!("SELECT {TOOL_COLUMNS} FROM tools WHERE id = $1");
        sqlx::query_as::<_, Tool>(&sql)
            .bind(tool_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_tool_context(&self, tool_id: Uuid) -> Result<Option<ToolContext>, sqlx::Error> {
        sqlx::query_as::<_, ToolContext>(
            r#"
            SELECT t.name, t.description, t.url, c.name AS category_name
            FROM tools t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.id = $1
            "#,
        )
        .bind(tool_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_tool(&self, draft: &ToolDraft) -> Result<Tool, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tools (name, slug, description, long_description, url, image_url,
                               category_id, pricing, platforms, verified, featured, status, submitted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {TOOL_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Tool>(&sql)
            .bind(&draft.name)
            .bind(&draft.slug)
            .bind(&draft.description)
            .bind(&draft.long_description)
            .bind(&draft.url)
            .bind(&draft.image_url)
            .bind(draft.category_id)
            .bind(draft.pricing)
            .bind(&draft.platforms)
            .bind(draft.verified)
            .bind(draft.featured)
            .bind(draft.status)
            .bind(draft.submitted_by)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_tool(&self, tool_id: Uuid, draft: &ToolDraft) -> Result<Tool, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tools
            SET name = $1, slug = $2, description = $3, long_description = $4, url = $5,
                image_url = $6, category_id = $7, pricing = $8, platforms = $9,
                verified = $10, featured = $11, status = $12
            WHERE id = $13
            RETURNING {TOOL_COLUMNS}
            "#
        );

        // fetch_one turns "no such tool" into RowNotFound, mapped to 404 upstream
        sqlx::query_as::<_, Tool>(&sql)
            .bind(&draft.name)
            .bind(&draft.slug)
            .bind(&draft.description)
            .bind(&draft.long_description)
            .bind(&draft.url)
            .bind(&draft.image_url)
            .bind(draft.category_id)
            .bind(draft.pricing)
            .bind(&draft.platforms)
            .bind(draft.verified)
            .bind(draft.featured)
            .bind(draft.status)
            .bind(tool_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_tool_status(
        &self,
        tool_id: Uuid,
        status: ToolStatus,
    ) -> Result<Tool, sqlx::Error> {
        let sql = format!("UPDATE tools SET status = $1 WHERE id = $2 RETURNING {TOOL_COLUMNS}");
        sqlx::query_as::<_, Tool>(&sql)
            .bind(status)
            .bind(tool_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn toggle_featured(&self, tool_id: Uuid) -> Result<Tool, sqlx::Error> {
        let sql = format!(
            "UPDATE tools SET featured = NOT featured WHERE id = $1 RETURNING {TOOL_COLUMNS}"
        );
        sqlx::query_as::<_, Tool>(&sql)
            .bind(tool_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn toggle_verified(&self, tool_id: Uuid) -> Result<Tool, sqlx::Error> {
        let sql = format!(
            "UPDATE tools SET verified = NOT verified WHERE id = $1 RETURNING {TOOL_COLUMNS}"
        );
        sqlx::query_as::<_, Tool>(&sql)
            .bind(tool_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_tool(&self, tool_id: Uuid) -> Result<(), sqlx::Error> {
        // reviews go with the tool (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM tools WHERE id = $1")
            .bind(tool_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_recent_tools(&self, limit: i64) -> Result<Vec<RecentToolDto>, sqlx::Error> {
        sqlx::query_as::<_, RecentToolDto>(
            r#"
            SELECT t.id, t.name, t.status, t.featured, t.created_at, c.name AS category_name
            FROM tools t
            LEFT JOIN categories c ON c.id = t.category_id
            ORDER BY t.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_approved_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tools WHERE status = 'approved'")
            .fetch_one(&self.pool)
            .await
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStatsDto, sqlx::Error> {
        let pending = async {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tools WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
        };
        let users = async {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_profiles")
                .fetch_one(&self.pool)
                .await
        };
        let reviews = async {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
                .fetch_one(&self.pool)
                .await
        };

        let (approved_tools, pending_tools, total_users, total_reviews) =
            tokio::try_join!(self.get_approved_count(), pending, users, reviews)?;

        Ok(DashboardStatsDto {
            approved_tools,
            pending_tools,
            total_users,
            total_reviews,
        })
    }
}
