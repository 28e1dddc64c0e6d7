use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use validator::Validate;

use crate::{
    AppState,
    db::UserExt,
    dtos::{CreateProfileDto, UserResponseDto},
    error::{AppJson, ErrorMessage, HttpError},
    handler::map_write_error,
    middleware::{CurrentActor, auth, authenticated_user_id},
};

/// Profile routes for the signed-in identity, mounted at `/auth`.
pub fn profile_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", post(create_profile))
        .route(
            "/me",
            get(get_me).route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Sign-up step: create the profile for the token's identity. Always
/// `user`; the role can only be raised later by an admin.
#[instrument(skip(app_state, cookie_jar, headers, body))]
pub async fn create_profile(
    State(app_state): State<AppState>,
    cookie_jar: CookieJar,
    headers: HeaderMap,
    AppJson(body): AppJson<CreateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id =
        authenticated_user_id(&cookie_jar, &headers, app_state.env.jwt_secret.as_bytes())?;

    body.validate().map_err(|e| {
        tracing::error!("Invalid profile input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let profile = app_state
        .db_client
        .create_profile(user_id, &body.display_name, body.avatar_url.as_deref())
        .await
        .map_err(|e| {
            map_write_error(
                "creating profile",
                e,
                ErrorMessage::UserNotFound,
                Some(ErrorMessage::ProfileAlreadyExists),
                None,
            )
        })?;

    tracing::info!(%user_id, "create_profile successful");
    Ok((
        StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: profile,
        }),
    ))
}

#[instrument(skip(actor), fields(user_id = %actor.id()))]
pub async fn get_me(
    Extension(actor): Extension<CurrentActor>,
) -> Result<impl IntoResponse, HttpError> {
    tracing::info!(admin = actor.is_admin(), "get_me successful");
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: actor.profile,
    }))
}
