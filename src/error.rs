use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body sent to clients.
///
/// ```
/// {
///   "status": "fail",
///   "error": "toolId is required"
/// }
/// ```
///
/// The content-generation clients only read `error`; `status` keeps the
/// directory endpoints consistent with their `"success"` bodies.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Which generator failed. Only used to pick the user-facing message; the
/// provider's own error is logged and never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Content,
    News,
    Tutorial,
    Course,
}

/// User-facing error texts.
///
/// Handlers build `HttpError`s from these so the same condition always reads
/// the same way, e.g. a duplicate review is never reported with the generic
/// submission failure text.
#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    // Authentication
    InvalidToken,
    TokenNotProvided,
    UserNotAuthenticated,
    UserNoLongerExist,

    // Authorization
    PermissionDenied,

    // Directory
    ToolNotFound,
    CategoryNotFound,
    ReviewNotFound,
    UserNotFound,
    DuplicateSlug,
    DuplicateReview,
    ReviewSubmitFailed,
    ProfileAlreadyExists,
    NewsNotFound,

    // Content generation request validation
    ToolIdAndTypeRequired,
    TopicRequired,
    ToolIdRequired,

    GenerationFailed(GenerationKind),

    ServerError,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessage::InvalidToken => "Token is invalid or expired",
            ErrorMessage::TokenNotProvided => "You are not logged in, please provide a token",
            ErrorMessage::UserNotAuthenticated => "Authentication required. Please log in.",
            ErrorMessage::UserNoLongerExist => "User belonging to this token no longer exists",
            ErrorMessage::PermissionDenied => "You are not allowed to perform this action",
            ErrorMessage::ToolNotFound => "Tool not found",
            ErrorMessage::CategoryNotFound => "Category not found",
            ErrorMessage::ReviewNotFound => "Review not found",
            ErrorMessage::UserNotFound => "User not found",
            ErrorMessage::DuplicateSlug => "A record with this slug already exists",
            ErrorMessage::DuplicateReview => "You have already reviewed this tool",
            ErrorMessage::ReviewSubmitFailed => "Failed to submit review. Please try again.",
            ErrorMessage::ProfileAlreadyExists => "Profile already exists",
            ErrorMessage::NewsNotFound => "News article not found",
            ErrorMessage::ToolIdAndTypeRequired => "toolId and type are required",
            ErrorMessage::TopicRequired => "topic is required",
            ErrorMessage::ToolIdRequired => "toolId is required",
            ErrorMessage::GenerationFailed(kind) => match kind {
                GenerationKind::Content => "Failed to generate content",
                GenerationKind::News => "Failed to generate news article",
                GenerationKind::Tutorial => "Failed to generate tutorial",
                GenerationKind::Course => "Failed to generate course",
            },
            ErrorMessage::ServerError => "Server Error. Please try again later",
        };
        write!(f, "{}", message)
    }
}

/// Error type returned by every handler and middleware.
///
/// Bundles the client message with its status code; axum turns it into a
/// response through `IntoResponse`.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
        }
    }

    /// 500. Storage and provider failures; also the generation service's
    /// "Tool not found", which has always been reported as a 500.
    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 400. Missing or malformed input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// 409. Unique constraint violations (duplicate review, duplicate slug).
    pub fn unique_constraint_violation(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::CONFLICT,
        }
    }

    /// 401. Missing, invalid or expired credentials.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// 403. Authenticated but lacking the required role.
    pub fn forbidden(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::FORBIDDEN,
        }
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    pub fn into_http_response(self) -> Response {
        let json_response = Json(ErrorResponse {
            status: "fail".to_string(),
            error: self.message.clone(),
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::bad_request(rejection.body_text())
    }
}

/// `Json` extractor whose rejection (bad syntax, wrong content type, missing
/// fields) is answered in the same `{status, error}` shape as every other
/// failure.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(HttpError))]
pub struct AppJson<T>(pub T);

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        HttpError::bad_request(rejection.body_text())
    }
}

/// `Path` extractor; a malformed id is a 400 in the usual error shape.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(HttpError))]
pub struct AppPath<T>(pub T);

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        HttpError::bad_request(rejection.body_text())
    }
}

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(HttpError))]
pub struct AppQuery<T>(pub T);

/// Postgres SQLSTATE for unique_violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQLSTATE of a database error, if the error came from Postgres.
pub fn sql_state(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Database errors with a chosen SQLSTATE, for exercising error mapping
/// without a server.
#[cfg(test)]
pub(crate) mod fake_db {
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct CodedError(&'static str);

    impl fmt::Display for CodedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database error {}", self.0)
        }
    }

    impl std::error::Error for CodedError {}

    impl DatabaseError for CodedError {
        fn message(&self) -> &str {
            "database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                super::UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
                super::FOREIGN_KEY_VIOLATION => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub fn with_code(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(CodedError(code)))
    }
}
