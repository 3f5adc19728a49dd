//! Uniform `{success, data | error}` result shape for callers outside the core.

use crate::error::{ErrorKind, PrazoError, Result};
use serde::{Deserialize, Serialize};

/// Message returned in place of storage-level detail.
pub const INTERNAL_FAILURE: &str = "internal storage failure; see logs for details";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(err: &PrazoError) -> Self {
        let kind = err.kind();
        let message = if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "operation failed");
            INTERNAL_FAILURE.to_string()
        } else {
            err.to_string()
        };
        Self {
            success: false,
            data: None,
            error: Some(Failure { kind, message }),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => Outcome::failed(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_data() {
        let out: Outcome<u64> = Ok(7).into();
        assert!(out.success);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({"success": true, "data": 7})
        );
    }

    #[test]
    fn domain_errors_pass_through_verbatim() {
        let out: Outcome<()> = Err(PrazoError::NoActivePeriod(3)).into();
        let failure = out.error.unwrap();
        assert_eq!(failure.kind, ErrorKind::NotFound);
        assert_eq!(failure.message, "case 3 has no active deadline period");
    }

    #[test]
    fn storage_errors_are_masked() {
        let out: Outcome<()> = Err(PrazoError::Storage("page 17 checksum mismatch".into())).into();
        assert!(!out.success);
        let failure = out.error.unwrap();
        assert_eq!(failure.kind, ErrorKind::Internal);
        assert_eq!(failure.message, INTERNAL_FAILURE);
    }
}
