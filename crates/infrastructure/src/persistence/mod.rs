//! Persistence implementations for file-based storage.

mod file_system;
mod token_repository;

pub use file_system::TokioFileSystem;
pub use token_repository::FileTokenStore;
