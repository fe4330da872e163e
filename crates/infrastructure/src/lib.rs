//! ClubHub Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus environment configuration.

pub mod adapters;
pub mod config;
pub mod persistence;

pub use adapters::{ReqwestAuthApi, SystemClock};
pub use config::{ClientConfig, ConfigError};
pub use persistence::{FileTokenStore, TokioFileSystem};
