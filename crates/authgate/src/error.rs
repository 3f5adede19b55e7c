//! Error types for the validation chain and its collaborators.
//!
//! Protocol-level problems with an authorization request (missing
//! parameters, unknown services, disabled access) are *not* errors: they
//! surface as a denied [`Verdict`](crate::oauth::Verdict). The types here
//! describe infrastructure faults and administrative mistakes that the
//! surrounding layer must be able to tell apart from a denial.

use std::fmt;

use crate::oauth::AuthorizationErrorCode;

/// Errors raised by the validation chain, the service directory, or the
/// access strategy enforcer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The service directory could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The access strategy enforcer failed to reach a decision.
    #[error("Access strategy error: {message}")]
    AccessStrategy {
        /// Description of the enforcer failure.
        message: String,
    },

    /// A registered service definition was rejected.
    #[error("Invalid service: {message}")]
    InvalidService {
        /// Description of why the service is invalid.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `AccessStrategy` error.
    #[must_use]
    pub fn access_strategy(message: impl Into<String>) -> Self {
        Self::AccessStrategy {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidService` error.
    #[must_use]
    pub fn invalid_service(message: impl Into<String>) -> Self {
        Self::InvalidService {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by the caller (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidService { .. })
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::AccessStrategy { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::AccessStrategy { .. } => ErrorCategory::Infrastructure,
            Self::InvalidService { .. } => ErrorCategory::Validation,
        }
    }

    /// Returns the OAuth 2.0 error code the authorization endpoint should
    /// answer with.
    #[must_use]
    pub fn oauth_error_code(&self) -> AuthorizationErrorCode {
        match self {
            Self::InvalidService { .. } => AuthorizationErrorCode::InvalidRequest,
            Self::Storage { .. } | Self::AccessStrategy { .. } => {
                AuthorizationErrorCode::ServerError
            }
        }
    }
}

/// Categories of errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request or registry validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::storage("registry unavailable");
        assert_eq!(err.to_string(), "Storage error: registry unavailable");

        let err = AuthError::access_strategy("policy backend timed out");
        assert_eq!(
            err.to_string(),
            "Access strategy error: policy backend timed out"
        );

        let err = AuthError::invalid_service("client id cannot be empty");
        assert_eq!(err.to_string(), "Invalid service: client id cannot be empty");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::storage("down");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());

        let err = AuthError::access_strategy("down");
        assert!(err.is_server_error());

        let err = AuthError::invalid_service("bad pattern");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::access_strategy("test").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::invalid_service("test").category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::storage("x").oauth_error_code(),
            AuthorizationErrorCode::ServerError
        );
        assert_eq!(
            AuthError::access_strategy("x").oauth_error_code().as_str(),
            "server_error"
        );
        assert_eq!(
            AuthError::invalid_service("x").oauth_error_code(),
            AuthorizationErrorCode::InvalidRequest
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
    }
}
