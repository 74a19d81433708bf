//! History identifier validation.

use crate::error::{ResolverError, ResolverResult};

/// Longest history id accepted.
pub const MAX_ID_LEN: usize = 256;

/// Check that `id` can name a history.
///
/// Ids must be non-empty, at most [`MAX_ID_LEN`] bytes, and free of control
/// characters.
pub fn validate_history_id(id: &str) -> ResolverResult<()> {
    let reason = if id.is_empty() {
        "must not be empty"
    } else if id.len() > MAX_ID_LEN {
        "too long"
    } else if id.chars().any(char::is_control) {
        "contains control characters"
    } else {
        return Ok(());
    };
    Err(ResolverError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}
