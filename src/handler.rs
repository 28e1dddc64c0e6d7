pub mod ai;
pub mod categories;
pub mod dashboard;
pub mod news;
pub mod profile;
pub mod reviews;
pub mod tools;
pub mod users;

use crate::error::{ErrorMessage, FOREIGN_KEY_VIOLATION, HttpError, UNIQUE_VIOLATION, sql_state};

/// Map a failed single-row write.
///
/// `RowNotFound` (the target row is gone) becomes 404 with `missing`; a
/// unique violation becomes 409 with `duplicate` when one is given; a
/// foreign key violation becomes 404 with `missing_reference` when one is
/// given. Everything else is logged and reported as a server error.
pub(crate) fn map_write_error(
    op: &str,
    e: sqlx::Error,
    missing: ErrorMessage,
    duplicate: Option<ErrorMessage>,
    missing_reference: Option<ErrorMessage>,
) -> HttpError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return HttpError::not_found(missing.to_string());
    }

    match (sql_state(&e).as_deref(), duplicate, missing_reference) {
        (Some(UNIQUE_VIOLATION), Some(duplicate), _) => {
            tracing::warn!("{} rejected, unique violation: {}", op, e);
            HttpError::unique_constraint_violation(duplicate.to_string())
        }
        (Some(FOREIGN_KEY_VIOLATION), _, Some(reference)) => {
            tracing::warn!("{} rejected, missing reference: {}", op, e);
            HttpError::not_found(reference.to_string())
        }
        _ => {
            tracing::error!("DB error, {}: {}", op, e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        }
    }
}
