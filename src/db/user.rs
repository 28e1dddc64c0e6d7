use super::DBClient;
use crate::models::{UserProfile, UserRole};
use uuid::Uuid;

/// Profile operations. The identity itself lives with the auth provider;
/// only the role/display layer is stored here.
pub trait UserExt {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error>;

    /// Profiles newest first, optionally narrowed to one role.
    async fn get_profiles(&self, role: Option<UserRole>) -> Result<Vec<UserProfile>, sqlx::Error>;

    /// Sign-up profile. Always starts with the `user` role.
    async fn create_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<UserProfile, sqlx::Error>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        role: UserRole,
    ) -> Result<UserProfile, sqlx::Error>;

    /// Delete a profile; its reviews cascade.
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
}

impl UserExt for DBClient {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, role, display_name, avatar_url, created_at FROM user_profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profiles(&self, role: Option<UserRole>) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, role, display_name, avatar_url, created_at
            FROM user_profiles
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<UserProfile, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (id, display_name, avatar_url)
            VALUES ($1, $2, $3)
            RETURNING id, role, display_name, avatar_url, created_at
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        role: UserRole,
    ) -> Result<UserProfile, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET display_name = $1, role = $2
            WHERE id = $3
            RETURNING id, role, display_name, avatar_url, created_at
            "#,
        )
        .bind(display_name)
        .bind(role)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
