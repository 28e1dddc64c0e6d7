use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, put},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    db::UserExt,
    dtos::{AdminUserDto, AdminUsersQuery, Response, UserListResponseDto, UserResponseDto, UserUpdateDto},
    error::{AppJson, AppPath, AppQuery, ErrorMessage, HttpError},
    handler::map_write_error,
};

/// User management, mounted at `/admin/users`.
pub fn admin_users_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/{user_id}", put(update_user).delete(delete_user))
}

/// Profiles newest first, with emails from the identity provider when the
/// privileged lookup is available.
///
/// Query params: ?role=<all|user|admin>
#[instrument(skip(app_state))]
pub async fn get_users(
    AppQuery(params): AppQuery<AdminUsersQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let role = params.role.unwrap_or_default().as_role();

    let profiles = app_state
        .db_client
        .get_profiles(role)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting users: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    // the email lookup never fails the listing
    let emails = match app_state.auth_admin.list_emails().await {
        Ok(emails) => emails,
        Err(e) => {
            tracing::warn!("Identity lookup unavailable, listing without emails: {}", e);
            None
        }
    };

    let users = AdminUserDto::merge_emails(profiles, emails.as_ref());

    tracing::info!("get_users successful");
    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        results: users.len(),
        users,
    }))
}

/// Change display name and role. The only way a profile becomes admin.
#[instrument(skip(app_state))]
pub async fn update_user(
    AppPath(user_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    AppJson(body): AppJson<UserUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid user update: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let profile = app_state
        .db_client
        .update_profile(user_id, &body.display_name, body.role)
        .await
        .map_err(|e| map_write_error("updating user", e, ErrorMessage::UserNotFound, None, None))?;

    tracing::info!(role = profile.role.to_str(), "update_user successful");
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: profile,
    }))
}

/// Delete the profile (its reviews cascade), then the identity itself.
/// The identity delete is best effort.
#[instrument(skip(app_state))]
pub async fn delete_user(
    AppPath(user_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_profile(user_id)
        .await
        .map_err(|e| map_write_error("deleting user", e, ErrorMessage::UserNotFound, None, None))?;

    match app_state.auth_admin.delete_user(user_id).await {
        Ok(true) => tracing::debug!("identity deleted"),
        Ok(false) => tracing::debug!("identity admin API not configured, profile only"),
        Err(e) => tracing::warn!("Identity delete failed, profile already removed: {}", e),
    }

    tracing::info!("delete_user successful");
    Ok(Json(Response {
        status: "success",
        message: "User deleted".to_string(),
    }))
}
