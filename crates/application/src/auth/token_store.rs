//! In-memory token storage.
//!
//! Backs the `TokenStore` port with a shared cell. Used in tests and for
//! sessions that must not outlive the process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clubhub_domain::TokenPair;

use crate::ports::{TokenStore, TokenStoreError};

/// Thread-safe in-memory token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<Option<TokenPair>>>,
}

impl MemoryTokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a pair.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(Some(tokens))),
        }
    }

    /// Returns true if a pair is stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_none()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        let mut slot = self.tokens.write().await;
        *slot = Some(tokens.clone());
        Ok(())
    }

    async fn tokens(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        Ok(self.tokens.read().await.clone())
    }

    async fn clear_tokens(&self) -> Result<(), TokenStoreError> {
        self.tokens.write().await.take();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_and_get_tokens() {
        let store = MemoryTokenStore::new();
        assert!(store.access_token().await.unwrap().is_none());

        store
            .set_tokens(&TokenPair::new("access123", "refresh123"))
            .await
            .unwrap();

        assert_eq!(
            store.access_token().await.unwrap().as_deref(),
            Some("access123")
        );
        assert_eq!(
            store.refresh_token().await.unwrap().as_deref(),
            Some("refresh123")
        );
    }

    #[tokio::test]
    async fn test_set_tokens_overwrites_pair() {
        let store = MemoryTokenStore::with_tokens(TokenPair::new("old-a", "old-r"));
        store
            .set_tokens(&TokenPair::new("new-a", "new-r"))
            .await
            .unwrap();
        assert_eq!(
            store.tokens().await.unwrap(),
            Some(TokenPair::new("new-a", "new-r"))
        );
    }

    #[tokio::test]
    async fn test_clear_tokens_is_idempotent() {
        let store = MemoryTokenStore::with_tokens(TokenPair::new("a", "r"));

        store.clear_tokens().await.unwrap();
        assert!(store.is_empty().await);

        store.clear_tokens().await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = MemoryTokenStore::new();
        let handle = store.clone();
        store.set_tokens(&TokenPair::new("a", "r")).await.unwrap();
        assert!(!handle.is_empty().await);
    }
}
