//! Domain error types

use thiserror::Error;

/// Categorised failures reported by the auth service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email/password combination was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Submitted data failed validation.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// An account already exists for the email.
    #[error("email is already registered")]
    EmailTaken,

    /// The presented token is missing, invalid or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The service could not be reached or answered unexpectedly.
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

impl AuthError {
    /// Returns true if the error means the stored session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
