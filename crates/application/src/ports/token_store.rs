//! Token store port
//!
//! Defines the interface for durable storage of the session's token pair.

use async_trait::async_trait;

use clubhub_domain::TokenPair;

/// Errors that can occur during token storage operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing storage cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for the access/refresh token pair.
///
/// Both tokens are written and removed together; a store never holds
/// only one of them.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists both tokens, replacing any previous pair.
    ///
    /// # Errors
    /// Returns an error if the pair cannot be persisted.
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError>;

    /// Returns the persisted pair, or `None` if nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    async fn tokens(&self) -> Result<Option<TokenPair>, TokenStoreError>;

    /// Removes both tokens. Clearing an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be modified.
    async fn clear_tokens(&self) -> Result<(), TokenStoreError>;

    /// Returns the persisted access token.
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.tokens().await?.map(|pair| pair.access_token))
    }

    /// Returns the persisted refresh token.
    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.tokens().await?.map(|pair| pair.refresh_token))
    }
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        (**self).set_tokens(tokens).await
    }

    async fn tokens(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        (**self).tokens().await
    }

    async fn clear_tokens(&self) -> Result<(), TokenStoreError> {
        (**self).clear_tokens().await
    }
}
