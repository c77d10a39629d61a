//! Authorization key check.
//!
//! An app is protected when its record carries a non-empty key. Keys are
//! compared verbatim: no trimming, case folding or hashing.

use crate::error::{DomainError, DomainResult};
use crate::model::AppRecord;

/// Message returned when a protected app is accessed without a matching key.
pub const UNAUTHORIZED_MESSAGE: &str = "invalid or missing authorization key";

/// Whether `supplied_key` grants access to `record`.
///
/// A missing record is treated as open.
pub fn is_authorized(record: Option<&AppRecord>, supplied_key: Option<&str>) -> bool {
    match record.and_then(AppRecord::authorization_key) {
        None => true,
        Some(expected) => supplied_key == Some(expected),
    }
}

/// Fails with [`DomainError::Unauthorized`] unless `supplied_key` grants access.
pub fn check_authorization(record: &AppRecord, supplied_key: Option<&str>) -> DomainResult<()> {
    if is_authorized(Some(record), supplied_key) {
        Ok(())
    } else {
        Err(DomainError::unauthorized(UNAUTHORIZED_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuthorizationDescriptor;

    fn protected(key: &str) -> AppRecord {
        AppRecord::new().with_authorization(AuthorizationDescriptor::with_key(key))
    }

    #[test]
    fn test_open_record_accepts_any_key() {
        let record = AppRecord::new();
        assert!(check_authorization(&record, None).is_ok());
        assert!(check_authorization(&record, Some("anything")).is_ok());
    }

    #[test]
    fn test_empty_key_is_open() {
        let record = protected("");
        assert!(check_authorization(&record, None).is_ok());
        assert!(check_authorization(&record, Some("x")).is_ok());
    }

    #[test]
    fn test_protected_record_requires_exact_match() {
        let record = protected("s3cret");

        assert!(check_authorization(&record, Some("s3cret")).is_ok());
        assert_eq!(
            check_authorization(&record, None),
            Err(DomainError::unauthorized(UNAUTHORIZED_MESSAGE))
        );
        assert!(check_authorization(&record, Some("S3CRET")).is_err());
        assert!(check_authorization(&record, Some(" s3cret")).is_err());
        assert!(check_authorization(&record, Some("")).is_err());
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = check_authorization(&protected("k"), Some("wrong")).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_missing_record_is_authorized() {
        assert!(is_authorized(None, None));
        assert!(is_authorized(None, Some("k")));
    }
}
