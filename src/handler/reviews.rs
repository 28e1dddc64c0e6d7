use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{delete, get},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    db::ReviewExt,
    dtos::{AdminReviewDto, AdminReviewListResponse, AdminReviewsQuery, Response},
    error::{AppPath, AppQuery, ErrorMessage, HttpError},
    handler::map_write_error,
};

/// Review moderation, mounted at `/admin/reviews`.
pub fn admin_reviews_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews))
        .route("/{review_id}", delete(delete_review))
}

/// Every review with its tool and reviewer, plus stats over all reviews.
///
/// Query params: ?rating=<1..5>
#[instrument(skip(app_state))]
pub async fn list_reviews(
    AppQuery(params): AppQuery<AdminReviewsQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid review filter: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let (rows, stats) = tokio::try_join!(
        app_state.db_client.get_admin_reviews(params.rating),
        app_state.db_client.get_review_stats(),
    )
    .map_err(|e| {
        tracing::error!("DB error, listing reviews: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    tracing::info!("list_reviews successful");
    Ok(Json(AdminReviewListResponse {
        status: "success".to_string(),
        data: rows.into_iter().map(AdminReviewDto::from).collect(),
        stats,
    }))
}

#[instrument(skip(app_state))]
pub async fn delete_review(
    AppPath(review_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_review(review_id)
        .await
        .map_err(|e| map_write_error("deleting review", e, ErrorMessage::ReviewNotFound, None, None))?;

    tracing::info!("delete_review successful");
    Ok(Json(Response {
        status: "success",
        message: "Review deleted".to_string(),
    }))
}
