//! Auth service port
//!
//! The remote account service the session controller talks to. The
//! transport is left to adapters; this trait only fixes the operations
//! and their failure categories.

use async_trait::async_trait;

use clubhub_domain::{AuthError, AuthSession, Credentials, Registration, TokenPair, User};

/// Remote authentication service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Signs in with email and password.
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` when the service rejects the pair.
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// `AuthError::ValidationFailed` or `AuthError::EmailTaken` on rejection.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError>;

    /// Ends the session server-side. Best effort.
    ///
    /// # Errors
    /// Any transport or authorization failure.
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;

    /// Fetches the user owning `access_token`.
    ///
    /// # Errors
    /// `AuthError::Unauthorized` when the token is invalid or expired.
    async fn me(&self, access_token: &str) -> Result<User, AuthError>;

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    /// `AuthError::Unauthorized` when the refresh token is no longer valid.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}

#[async_trait]
impl<T: AuthApi + ?Sized> AuthApi for std::sync::Arc<T> {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        (**self).login(credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
        (**self).register(registration).await
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        (**self).logout(access_token).await
    }

    async fn me(&self, access_token: &str) -> Result<User, AuthError> {
        (**self).me(access_token).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        (**self).refresh(refresh_token).await
    }
}
