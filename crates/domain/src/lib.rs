//! ClubHub Domain - Core business types
//!
//! This crate defines the domain model for the ClubHub client:
//! users and roles, auth tokens, the session lifecycle, and
//! role-aware page routing. All types here are pure Rust with no I/O.

pub mod auth;
pub mod error;
pub mod navigation;
pub mod state;
pub mod user;

pub use auth::{AuthSession, Credentials, Registration, TokenPair};
pub use error::AuthError;
pub use navigation::{Page, UnknownPage, ViewId, dashboard_for, menu, resolve, resolve_id};
pub use state::{SessionPhase, SessionState};
pub use user::{Role, User};
