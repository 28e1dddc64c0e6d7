use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    db::{CategoryExt, ToolExt},
    dtos::{
        CategoryListResponseDto, CategoryResponseDto, CategoryToolsResponseDto, InputCategoryDto,
        Response,
    },
    error::{AppJson, AppPath, ErrorMessage, HttpError},
    handler::map_write_error,
};

/// Public category routes, mounted at `/categories`.
pub fn categories_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_categories))
        .route("/{slug}", get(get_category_tools))
}

/// Back-office category routes, mounted at `/admin/categories`.
pub fn admin_categories_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_categories).post(create_category))
        .route("/{category_id}", put(update_category).delete(delete_category))
}

#[instrument(skip(app_state))]
pub async fn get_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .get_categories_by_name()
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting categories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("get_categories successful");
    Ok(Json(CategoryListResponseDto {
        status: "success".to_string(),
        data: categories,
    }))
}

/// Category page: the category and its approved tools.
#[instrument(skip(app_state))]
pub async fn get_category_tools(
    AppPath(slug): AppPath<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let category = app_state
        .db_client
        .get_category_by_slug(&slug)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CategoryNotFound.to_string()))?;

    let tools = app_state
        .db_client
        .get_catalog(Some(&category.slug), None, None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting category tools: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("get_category_tools successful");
    Ok(Json(CategoryToolsResponseDto {
        status: "success".to_string(),
        category,
        tools,
    }))
}

#[instrument(skip(app_state))]
pub async fn list_admin_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .get_categories_by_creation()
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing admin categories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("list_admin_categories successful");
    Ok(Json(CategoryListResponseDto {
        status: "success".to_string(),
        data: categories,
    }))
}

#[instrument(skip(app_state))]
pub async fn create_category(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<InputCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid category input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let category = app_state
        .db_client
        .create_category(
            &body.name,
            &body.slug,
            body.icon_or_default(),
            body.description.as_deref(),
        )
        .await
        .map_err(|e| {
            map_write_error(
                "creating category",
                e,
                ErrorMessage::CategoryNotFound,
                Some(ErrorMessage::DuplicateSlug),
                None,
            )
        })?;

    tracing::info!(slug = %category.slug, "create_category successful");
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponseDto {
            status: "success".to_string(),
            data: category,
        }),
    ))
}

#[instrument(skip(app_state))]
pub async fn update_category(
    AppPath(category_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    AppJson(body): AppJson<InputCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid category input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let category = app_state
        .db_client
        .update_category(
            category_id,
            &body.name,
            &body.slug,
            body.icon_or_default(),
            body.description.as_deref(),
        )
        .await
        .map_err(|e| {
            map_write_error(
                "updating category",
                e,
                ErrorMessage::CategoryNotFound,
                Some(ErrorMessage::DuplicateSlug),
                None,
            )
        })?;

    tracing::info!("update_category successful");
    Ok(Json(CategoryResponseDto {
        status: "success".to_string(),
        data: category,
    }))
}

/// Delete a category together with its tools and their reviews.
#[instrument(skip(app_state))]
pub async fn delete_category(
    AppPath(category_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_category(category_id)
        .await
        .map_err(|e| {
            map_write_error("deleting category", e, ErrorMessage::CategoryNotFound, None, None)
        })?;

    tracing::info!("delete_category successful");
    Ok(Json(Response {
        status: "success",
        message: "Category deleted".to_string(),
    }))
}
