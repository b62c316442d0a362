//! Request-shape validation helpers.
//!
//! Pure functions used by the API layer before any row is created.
//! Parameter *values* are handled by normalization and never fail;
//! these checks cover the parts of a request that must be rejected
//! outright.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of an endpoint or scan name.
const MAX_NAME_LEN: usize = 128;

/// Validate a user-supplied display name for an entity.
///
/// Rules:
/// - Must not be empty or whitespace-only.
/// - Must not exceed `MAX_NAME_LEN` characters.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "{kind} name must not be empty"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{kind} name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a scan's requested target set.
///
/// Rules:
/// - At least one target endpoint.
/// - No duplicate endpoint ids.
pub fn validate_target_set(endpoint_ids: &[DbId]) -> Result<(), CoreError> {
    if endpoint_ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one target endpoint is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(endpoint_ids.len());
    for id in endpoint_ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Duplicate target endpoint: {id}"
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name_accepted() {
        assert!(validate_name("Scan", "weekly perimeter sweep").is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        assert!(validate_name("Scan", "").is_err());
        assert!(validate_name("Scan", "   ").is_err());
    }

    #[test]
    fn overlong_name_rejected() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name("Endpoint", &name).is_err());
    }

    #[test]
    fn valid_target_set_accepted() {
        assert!(validate_target_set(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn empty_target_set_rejected() {
        assert!(validate_target_set(&[]).is_err());
    }

    #[test]
    fn duplicate_targets_rejected() {
        assert!(validate_target_set(&[1, 2, 1]).is_err());
    }
}
