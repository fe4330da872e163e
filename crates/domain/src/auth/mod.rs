//! Authentication domain types

mod types;

pub use types::{AuthSession, Credentials, MIN_PASSWORD_LEN, Registration, TokenPair};
