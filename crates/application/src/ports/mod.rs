//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod auth_api;
mod clock;
mod file_system;
mod token_store;

pub use auth_api::AuthApi;
pub use clock::{Clock, FixedClock};
pub use file_system::{FileSystem, FileSystemError};
pub use token_store::{TokenStore, TokenStoreError};
