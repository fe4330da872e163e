//! ClubHub Application - Session core and ports
//!
//! This crate defines the application layer with:
//! - Port traits (auth service, token store, file system, clock)
//! - The session controller and in-memory token store
//! - Caller-owned page navigation
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod navigation;
pub mod ports;

pub use auth::{MemoryTokenStore, SessionController};
pub use error::{SessionError, SessionResult};
pub use navigation::Navigator;
pub use ports::{AuthApi, Clock, FileSystem, FileSystemError, FixedClock, TokenStore, TokenStoreError};
