use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use tracing::instrument;

use crate::{
    AppState,
    db::ToolExt,
    dtos::DashboardResponseDto,
    error::{ErrorMessage, HttpError},
};

const RECENT_TOOLS: i64 = 5;

pub fn admin_dashboard_handler() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// Counters and the most recent tools, fetched concurrently.
#[instrument(skip(app_state))]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (stats, recent_tools) = tokio::try_join!(
        app_state.db_client.get_dashboard_stats(),
        app_state.db_client.get_recent_tools(RECENT_TOOLS),
    )
    .map_err(|e| {
        tracing::error!("DB error, loading dashboard: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    tracing::info!("get_dashboard successful");
    Ok(Json(DashboardResponseDto {
        status: "success".to_string(),
        stats,
        recent_tools,
    }))
}
