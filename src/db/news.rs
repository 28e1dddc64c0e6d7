use super::DBClient;
use crate::models::NewsItem;
use uuid::Uuid;

pub trait NewsExt {
    async fn get_news(&self, news_id: Uuid) -> Result<Option<NewsItem>, sqlx::Error>;
}

impl NewsExt for DBClient {
    async fn get_news(&self, news_id: Uuid) -> Result<Option<NewsItem>, sqlx::Error> {
        sqlx::query_as::<_, NewsItem>(
            r#"
            SELECT id, title, description, content, image_url, category, source, date, created_at
            FROM news
            WHERE id = $1
            "#,
        )
        .bind(news_id)
        .fetch_optional(&self.pool)
        .await
    }
}
