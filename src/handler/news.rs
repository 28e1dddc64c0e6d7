use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    AppState,
    db::NewsExt,
    dtos::{NewsItemDto, NewsResponseDto},
    error::{AppPath, ErrorMessage, HttpError},
};

/// Public news routes, mounted at `/news`.
pub fn news_handler() -> Router<AppState> {
    Router::new().route("/{news_id}", get(get_news))
}

#[instrument(skip(app_state))]
pub async fn get_news(
    AppPath(news_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let item = app_state
        .db_client
        .get_news(news_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting news: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::NewsNotFound.to_string()))?;

    tracing::info!("get_news successful");
    Ok(Json(NewsResponseDto {
        status: "success".to_string(),
        data: NewsItemDto::from(item),
    }))
}
