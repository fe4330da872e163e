//! File-based token store.
//!
//! The token pair lives in a single JSON document, by default
//! `<config dir>/clubhub/tokens.json`:
//! ```json
//! {
//!   "schema_version": 1,
//!   "access_token": "eyJhbGciOi...",
//!   "refresh_token": "eyJhbGciOi...",
//!   "saved_at": "2026-10-17T09:30:00Z"
//! }
//! ```
//! Both tokens are written in one file so they can never diverge.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use clubhub_application::ports::{Clock, FileSystem, FileSystemError, TokenStore, TokenStoreError};
use clubhub_domain::TokenPair;

/// Current token file layout version.
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    schema_version: u32,
    access_token: String,
    refresh_token: String,
    saved_at: DateTime<Utc>,
}

/// Token store persisting the pair to a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore<F, C> {
    fs: F,
    clock: C,
    path: PathBuf,
}

impl<F: FileSystem, C: Clock> FileTokenStore<F, C> {
    /// Creates a store writing to `path`.
    pub fn new(fs: F, clock: C, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            clock,
            path: path.into(),
        }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp of the last write, if a valid file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub async fn saved_at(&self) -> Result<Option<DateTime<Utc>>, TokenStoreError> {
        Ok(self.load().await?.map(|file| file.saved_at))
    }

    async fn load(&self) -> Result<Option<TokenFile>, TokenStoreError> {
        if !self.fs.exists(&self.path).await {
            return Ok(None);
        }

        let content = match self.fs.read_file(&self.path).await {
            Ok(content) => content,
            Err(FileSystemError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(TokenStoreError::Io(e.into())),
        };

        match serde_json::from_slice::<TokenFile>(&content) {
            Ok(file) if file.schema_version == SCHEMA_VERSION => Ok(Some(file)),
            Ok(file) => {
                warn!(
                    path = %self.path.display(),
                    schema_version = file.schema_version,
                    "ignoring token file with unsupported schema"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable token file");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<F: FileSystem, C: Clock> TokenStore for FileTokenStore<F, C> {
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        let file = TokenFile {
            schema_version: SCHEMA_VERSION,
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            saved_at: self.clock.now(),
        };

        let mut content = serde_json::to_vec_pretty(&file)
            .map_err(|e| TokenStoreError::Serialization(e.to_string()))?;
        content.push(b'\n');

        self.fs
            .write_file(&self.path, &content)
            .await
            .map_err(|e| TokenStoreError::Io(e.into()))?;

        debug!(path = %self.path.display(), "tokens saved");
        Ok(())
    }

    async fn tokens(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        Ok(self
            .load()
            .await?
            .map(|file| TokenPair::new(file.access_token, file.refresh_token)))
    }

    async fn clear_tokens(&self) -> Result<(), TokenStoreError> {
        match self.fs.remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "tokens cleared");
                Ok(())
            }
            Err(FileSystemError::NotFound(_)) => Ok(()),
            Err(e) => Err(TokenStoreError::Io(e.into())),
        }
    }
}
