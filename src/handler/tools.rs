use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    db::{CategoryExt, ReviewExt, ToolExt},
    dtos::{
        AdminToolListResponseDto, AdminToolsQuery, CatalogQueryParams, InputReviewRequest,
        InputToolDto, Response, SingleReviewResponse, SiteStatsResponseDto, SubmitToolDto,
        ToolDetailDto, ToolDetailResponseDto, ToolListResponseDto, ToolResponseDto,
        ToolReviewListResponse, ToolStatusUpdateDto,
    },
    error::{
        AppJson, AppPath, AppQuery, ErrorMessage, FOREIGN_KEY_VIOLATION, HttpError,
        UNIQUE_VIOLATION, sql_state,
    },
    handler::map_write_error,
    middleware::{CurrentActor, auth},
    models::{Tool, ToolStatus},
    utils::rating::{average_rating, round_rating},
};

/// Public catalog routes, mounted at `/tools`. Submitting a tool and posting
/// a review require a signed-in user.
pub fn tools_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_catalog))
        .route(
            "/submit",
            post(submit_tool)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route("/{tool_id}", get(get_tool_detail))
        .route("/{tool_id}/reviews", get(get_tool_reviews))
        .route(
            "/{tool_id}/reviews",
            post(create_review).route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Back-office tool routes, mounted at `/admin/tools` behind the admin guard.
pub fn admin_tools_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_tools).post(create_tool))
        .route("/{tool_id}", put(update_tool).delete(delete_tool))
        .route("/{tool_id}/status", patch(update_tool_status))
        .route("/{tool_id}/featured", patch(toggle_featured))
        .route("/{tool_id}/verified", patch(toggle_verified))
}

/// Load a tool that is visible in the public catalog.
async fn approved_tool(app_state: &AppState, tool_id: Uuid) -> Result<Tool, HttpError> {
    app_state
        .db_client
        .get_tool(tool_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting tool: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .filter(|tool| tool.status == ToolStatus::Approved)
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ToolNotFound.to_string()))
}

/// A second review of the same tool is a 409 with its own message; a tool
/// deleted in the meantime is a 404. Anything else reads as a failed
/// submission.
pub(crate) fn map_review_error(e: sqlx::Error) -> HttpError {
    match sql_state(&e).as_deref() {
        Some(UNIQUE_VIOLATION) => {
            tracing::warn!("Duplicate review rejected");
            HttpError::unique_constraint_violation(ErrorMessage::DuplicateReview.to_string())
        }
        Some(FOREIGN_KEY_VIOLATION) => HttpError::not_found(ErrorMessage::ToolNotFound.to_string()),
        _ => {
            tracing::error!("DB error, saving review: {}", e);
            HttpError::server_error(ErrorMessage::ReviewSubmitFailed.to_string())
        }
    }
}

/// List approved tools.
///
/// Query params: ?category=<slug>&featured=<bool>&q=<text>
#[instrument(skip(app_state))]
pub async fn get_catalog(
    AppQuery(params): AppQuery<CatalogQueryParams>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid catalog query: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let category = params.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let search = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let tools = app_state
        .db_client
        .get_catalog(category, params.featured, search)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting catalog: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("get_catalog successful");
    Ok(Json(ToolListResponseDto {
        status: "success".to_string(),
        results: tools.len(),
        data: tools,
    }))
}

/// Tool page: the tool, its category name, its reviews and their mean.
#[instrument(skip(app_state))]
pub async fn get_tool_detail(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tool = approved_tool(&app_state, tool_id).await?;

    let (category, reviews) = tokio::try_join!(
        app_state.db_client.get_category(tool.category_id),
        app_state.db_client.get_tool_reviews(tool_id),
    )
    .map_err(|e| {
        tracing::error!("DB error, getting tool detail: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();

    tracing::info!("get_tool_detail successful");
    Ok(Json(ToolDetailResponseDto {
        status: "success".to_string(),
        data: ToolDetailDto {
            category_name: category.map(|c| c.name),
            rating: round_rating(average_rating(&ratings)),
            review_count: reviews.len(),
            reviews,
            tool,
        },
    }))
}

#[instrument(skip(app_state))]
pub async fn get_tool_reviews(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    approved_tool(&app_state, tool_id).await?;

    let reviews = app_state
        .db_client
        .get_tool_reviews(tool_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting tool reviews: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("get_tool_reviews successful");
    Ok(Json(ToolReviewListResponse {
        status: "success".to_string(),
        data: reviews,
    }))
}

/// Post a review. One per user and tool; the second attempt gets the
/// duplicate message, never the generic failure.
#[instrument(skip(app_state, actor, body), fields(user_id = %actor.id()))]
pub async fn create_review(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    AppJson(body): AppJson<InputReviewRequest>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid review input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    approved_tool(&app_state, tool_id).await?;

    let comment = body.normalized_comment();
    let review = app_state
        .db_client
        .save_review(tool_id, actor.id(), body.rating, comment.as_deref())
        .await
        .map_err(map_review_error)?;

    tracing::info!("create_review successful");
    Ok((
        StatusCode::CREATED,
        Json(SingleReviewResponse {
            status: "success".to_string(),
            data: review,
        }),
    ))
}

/// Public tool submission. Stored as pending until an admin decides.
#[instrument(skip(app_state, actor, body), fields(user_id = %actor.id()))]
pub async fn submit_tool(
    State(app_state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    AppJson(body): AppJson<SubmitToolDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid tool submission: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let draft = body.into_draft(actor.id());
    let tool = app_state
        .db_client
        .create_tool(&draft)
        .await
        .map_err(|e| {
            map_write_error(
                "submitting tool",
                e,
                ErrorMessage::ToolNotFound,
                Some(ErrorMessage::DuplicateSlug),
                Some(ErrorMessage::CategoryNotFound),
            )
        })?;

    tracing::info!(tool_id = %tool.id, "submit_tool successful");
    Ok((
        StatusCode::CREATED,
        Json(ToolResponseDto {
            status: "success".to_string(),
            data: tool,
        }),
    ))
}

/// Home page counters.
#[instrument(skip(app_state))]
pub async fn get_site_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (tools, categories) = tokio::try_join!(
        app_state.db_client.get_approved_count(),
        app_state.db_client.get_category_count(),
    )
    .map_err(|e| {
        tracing::error!("DB error, getting site stats: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    tracing::info!("get_site_stats successful");
    Ok(Json(SiteStatsResponseDto {
        status: "success".to_string(),
        tools,
        categories,
    }))
}

/// Every tool with its category and rating, plus per-status counts.
///
/// Query params: ?status=<all|pending|approved|rejected>
#[instrument(skip(app_state))]
pub async fn list_admin_tools(
    AppQuery(params): AppQuery<AdminToolsQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let status = params.status.unwrap_or_default().as_status();

    let (tools, counts) = tokio::try_join!(
        app_state.db_client.get_admin_tools(status),
        app_state.db_client.get_status_counts(),
    )
    .map_err(|e| {
        tracing::error!("DB error, listing admin tools: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    tracing::info!("list_admin_tools successful");
    Ok(Json(AdminToolListResponseDto {
        status: "success".to_string(),
        data: tools,
        counts,
    }))
}

/// Admin-created tools skip moderation unless a status is given.
#[instrument(skip(app_state, actor, body), fields(admin_id = %actor.id()))]
pub async fn create_tool(
    State(app_state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    AppJson(body): AppJson<InputToolDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid tool input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let draft = body.into_draft(Some(actor.id()));
    let tool = app_state
        .db_client
        .create_tool(&draft)
        .await
        .map_err(|e| {
            map_write_error(
                "creating tool",
                e,
                ErrorMessage::ToolNotFound,
                Some(ErrorMessage::DuplicateSlug),
                Some(ErrorMessage::CategoryNotFound),
            )
        })?;

    tracing::info!(tool_id = %tool.id, "create_tool successful");
    Ok((
        StatusCode::CREATED,
        Json(ToolResponseDto {
            status: "success".to_string(),
            data: tool,
        }),
    ))
}

/// Replace the editable fields. Without a `status` the current one is kept.
#[instrument(skip(app_state, body))]
pub async fn update_tool(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    AppJson(mut body): AppJson<InputToolDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid tool input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    if body.status.is_none() {
        let current = app_state
            .db_client
            .get_tool(tool_id)
            .await
            .map_err(|e| {
                tracing::error!("DB error, getting tool: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?
            .ok_or_else(|| HttpError::not_found(ErrorMessage::ToolNotFound.to_string()))?;
        body.status = Some(current.status);
    }

    let draft = body.into_draft(None);
    let tool = app_state
        .db_client
        .update_tool(tool_id, &draft)
        .await
        .map_err(|e| {
            map_write_error(
                "updating tool",
                e,
                ErrorMessage::ToolNotFound,
                Some(ErrorMessage::DuplicateSlug),
                Some(ErrorMessage::CategoryNotFound),
            )
        })?;

    tracing::info!("update_tool successful");
    Ok(Json(ToolResponseDto {
        status: "success".to_string(),
        data: tool,
    }))
}

/// Approve or reject (or send back to pending).
#[instrument(skip(app_state))]
pub async fn update_tool_status(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    AppJson(body): AppJson<ToolStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let tool = app_state
        .db_client
        .update_tool_status(tool_id, body.status)
        .await
        .map_err(|e| map_write_error("updating tool status", e, ErrorMessage::ToolNotFound, None, None))?;

    tracing::info!(status = tool.status.to_str(), "update_tool_status successful");
    Ok(Json(ToolResponseDto {
        status: "success".to_string(),
        data: tool,
    }))
}

#[instrument(skip(app_state))]
pub async fn toggle_featured(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tool = app_state
        .db_client
        .toggle_featured(tool_id)
        .await
        .map_err(|e| map_write_error("toggling featured", e, ErrorMessage::ToolNotFound, None, None))?;

    tracing::info!(featured = tool.featured, "toggle_featured successful");
    Ok(Json(ToolResponseDto {
        status: "success".to_string(),
        data: tool,
    }))
}

#[instrument(skip(app_state))]
pub async fn toggle_verified(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tool = app_state
        .db_client
        .toggle_verified(tool_id)
        .await
        .map_err(|e| map_write_error("toggling verified", e, ErrorMessage::ToolNotFound, None, None))?;

    tracing::info!(verified = tool.verified, "toggle_verified successful");
    Ok(Json(ToolResponseDto {
        status: "success".to_string(),
        data: tool,
    }))
}

/// Delete a tool and, by cascade, its reviews.
#[instrument(skip(app_state))]
pub async fn delete_tool(
    AppPath(tool_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_tool(tool_id)
        .await
        .map_err(|e| map_write_error("deleting tool", e, ErrorMessage::ToolNotFound, None, None))?;

    tracing::info!("delete_tool successful");
    Ok(Json(Response {
        status: "success",
        message: "Tool deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::fake_db;

    #[test]
    fn duplicate_review_gets_its_own_message() {
        let err = map_review_error(fake_db::with_code(UNIQUE_VIOLATION));
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "You have already reviewed this tool");
    }

    #[test]
    fn review_of_a_vanished_tool_is_not_found() {
        let err = map_review_error(fake_db::with_code(FOREIGN_KEY_VIOLATION));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, ErrorMessage::ToolNotFound.to_string());
    }

    #[test]
    fn other_review_failures_read_as_failed_submission() {
        for err in [fake_db::with_code("23514"), sqlx::Error::PoolTimedOut] {
            let err = map_review_error(err);
            assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.message, ErrorMessage::ReviewSubmitFailed.to_string());
            assert_ne!(err.message, ErrorMessage::DuplicateReview.to_string());
        }
    }
}
