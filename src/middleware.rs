use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    AppState,
    db::UserExt,
    error::{ErrorMessage, HttpError},
    models::{UserProfile, UserRole},
    utils::token,
};

/// The authenticated caller, resolved once per request by [`auth`].
///
/// Handlers behind the middleware read it with
/// `Extension(actor): Extension<CurrentActor>`.
#[derive(Debug, Clone)]
pub struct CurrentActor {
    pub profile: UserProfile,
}

impl CurrentActor {
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn is_admin(&self) -> bool {
        self.profile.role == UserRole::Admin
    }
}

/// Access token from the `access_token` cookie, falling back to
/// `Authorization: Bearer <token>`.
pub fn extract_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(str::to_owned)
        })
}

/// Verify the token and return the identity's user id, without touching
/// the profile table. Used by profile creation, where no profile exists yet.
pub fn authenticated_user_id(
    cookie_jar: &CookieJar,
    headers: &HeaderMap,
    secret: &[u8],
) -> Result<Uuid, HttpError> {
    let token = extract_token(cookie_jar, headers)
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let subject = token::decode_token(token, secret)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    Uuid::parse_str(&subject)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))
}

/// Authentication middleware.
///
/// Resolves the token to a `UserProfile` and stores a [`CurrentActor`] in the
/// request extensions.
///
/// # Errors
/// 401 when the token is missing, invalid or expired, or when no profile
/// exists for its subject.
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = authenticated_user_id(
        &cookie_jar,
        req.headers(),
        app_state.env.jwt_secret.as_bytes(),
    )?;

    let profile = app_state
        .db_client
        .get_profile(user_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, loading profile for token: {}", e);
            HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string())
        })?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    req.extensions_mut().insert(CurrentActor { profile });

    Ok(next.run(req).await)
}

/// Role guard. Must run after [`auth`].
///
/// # Errors
/// 401 if no actor was resolved, 403 if the actor's role is not listed.
pub async fn role_check(
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = req
        .extensions()
        .get::<CurrentActor>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&actor.profile.role) {
        tracing::warn!(user_id = %actor.id(), "role check failed");
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    Ok(next.run(req).await)
}
