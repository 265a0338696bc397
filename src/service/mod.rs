//! Application services
//!
//! Business rules live here: validation, ownership checks, media
//! upload/cleanup ordering, and the session lifecycle. Handlers stay
//! thin and translate between HTTP and these functions.

pub mod account;
pub mod comment;
pub mod engagement;
pub mod playlist;
pub mod tweet;
pub mod video;

use crate::error::AppError;

/// Refuse mutation of a resource the actor does not own.
///
/// Authentication already happened; this is the authorization step,
/// so a mismatch is `Forbidden`, not `Unauthorized`.
pub fn ensure_owner(actor_id: &str, owner_id: &str) -> Result<(), AppError> {
    if actor_id != owner_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Reject blank or whitespace-only text fields.
pub(crate) fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
