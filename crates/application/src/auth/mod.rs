//! Authentication module for the ClubHub client.
//!
//! This module provides:
//! - In-memory token storage
//! - The session controller driving login, logout and session restore

mod session;
mod token_store;

pub use session::SessionController;
pub use token_store::MemoryTokenStore;
