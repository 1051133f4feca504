//! Error Types
//!
//! The UI only ever distinguishes "session expired" from "something else
//! went wrong", but the variants keep enough detail for logging.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 401 from an authorized endpoint; the session has already been dropped
    #[error("session expired")]
    Unauthorized,
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Endpoint not served by this backend
    pub fn is_missing_endpoint(&self) -> bool {
        matches!(self, ApiError::Status(404) | ApiError::Status(405))
    }

    /// Scoped UI message for a failed operation, `None` when the failure
    /// is a forced logout and nothing should be shown.
    pub fn user_message(&self, fallback: &str) -> Option<String> {
        if self.is_unauthorized() {
            None
        } else {
            Some(fallback.to_string())
        }
    }
}

/// Client-side form validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please fill in the {0} field.")]
    Missing(&'static str),
    #[error("Age must be a whole number of years.")]
    InvalidAge,
    #[error("Estimated sessions must be between 1 and 999.")]
    InvalidSessions,
    #[error("Please choose a valid date.")]
    InvalidDate,
}
