//! Application error types

use thiserror::Error;

use clubhub_domain::AuthError;

use crate::ports::TokenStoreError;

/// Session-level errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The auth service rejected the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A user is already signed in.
    #[error("already signed in as {0}")]
    AlreadyAuthenticated(String),

    /// The startup session restore has not run yet.
    #[error("session is not ready: bootstrap has not completed")]
    NotReady,

    /// The operation requires a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// The token store failed.
    #[error("token storage error: {0}")]
    Storage(#[from] TokenStoreError),
}

impl SessionError {
    /// Returns the auth service error, if that is what failed.
    #[must_use]
    pub const fn auth_error(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
