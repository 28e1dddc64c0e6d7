use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use tracing::instrument;

use crate::{
    AppState,
    dtos::{
        GenerateAllRequest, GenerateContentRequest, GenerateCourseRequest, GenerateNewsRequest,
        GenerateTutorialRequest, GeneratedAllResponse, GeneratedContentResponse,
        GeneratedCourseResponse, GeneratedNewsResponse, GeneratedTutorialResponse,
    },
    error::{AppJson, ErrorMessage, GenerationKind, HttpError},
    generation::ContentGenerator,
};

/// Content generation, mounted at `/ai`. Not behind `auth`; browsers are
/// only gated by the CORS allow-list.
pub fn ai_handler() -> Router<AppState> {
    Router::new()
        .route("/generate-content", post(generate_content))
        .route("/generate-news", post(generate_news))
        .route("/generate-tutorial", post(generate_tutorial))
        .route("/generate-course", post(generate_course))
        .route("/generate-all", post(generate_all))
}

/// Empty strings count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(app_state, body))]
pub async fn generate_content(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<GenerateContentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let (Some(tool_id), Some(content_type)) = (present(body.tool_id), body.content_type) else {
        return Err(HttpError::bad_request(
            ErrorMessage::ToolIdAndTypeRequired.to_string(),
        ));
    };

    let generator = ContentGenerator::new(&app_state.db_client, &app_state.llm_client);
    let content = generator
        .generate_content(&tool_id, content_type)
        .await
        .map_err(|e| e.into_http_error(GenerationKind::Content))?;

    tracing::info!(%tool_id, ?content_type, "generate_content successful");
    Ok(Json(GeneratedContentResponse {
        success: true,
        content,
    }))
}

#[instrument(skip(app_state, body))]
pub async fn generate_news(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<GenerateNewsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let topic = present(body.topic)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::TopicRequired.to_string()))?;
    let tool_id = present(body.tool_id);

    let generator = ContentGenerator::new(&app_state.db_client, &app_state.llm_client);
    let news = generator
        .generate_news(&topic, tool_id.as_deref())
        .await
        .map_err(|e| e.into_http_error(GenerationKind::News))?;

    tracing::info!("generate_news successful");
    Ok(Json(GeneratedNewsResponse {
        success: true,
        news,
    }))
}

#[instrument(skip(app_state, body))]
pub async fn generate_tutorial(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<GenerateTutorialRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let tool_id = present(body.tool_id)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::ToolIdRequired.to_string()))?;

    let generator = ContentGenerator::new(&app_state.db_client, &app_state.llm_client);
    let tutorial = generator
        .generate_tutorial(&tool_id, body.difficulty.unwrap_or_default())
        .await
        .map_err(|e| e.into_http_error(GenerationKind::Tutorial))?;

    tracing::info!(%tool_id, "generate_tutorial successful");
    Ok(Json(GeneratedTutorialResponse {
        success: true,
        tutorial,
    }))
}

#[instrument(skip(app_state, body))]
pub async fn generate_course(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<GenerateCourseRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let tool_id = present(body.tool_id)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::ToolIdRequired.to_string()))?;

    let generator = ContentGenerator::new(&app_state.db_client, &app_state.llm_client);
    let course = generator
        .generate_course(&tool_id, body.level.unwrap_or_default())
        .await
        .map_err(|e| e.into_http_error(GenerationKind::Course))?;

    tracing::info!(%tool_id, "generate_course successful");
    Ok(Json(GeneratedCourseResponse {
        success: true,
        course,
    }))
}

#[instrument(skip(app_state, body))]
pub async fn generate_all(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<GenerateAllRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let tool_id = present(body.tool_id)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::ToolIdRequired.to_string()))?;

    let generator = ContentGenerator::new(&app_state.db_client, &app_state.llm_client);
    let data = generator.generate_all(&tool_id).await?;

    tracing::info!(%tool_id, "generate_all successful");
    Ok(Json(GeneratedAllResponse {
        success: true,
        data,
    }))
}
