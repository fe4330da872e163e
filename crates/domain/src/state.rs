//! Session state types for UI binding.
//!
//! This module defines the client-side session lifecycle so the
//! presentation layer can show a splash screen, a login form, or the
//! signed-in shell:
//! - `Bootstrapping`: restoring a persisted session, show a spinner
//! - `Anonymous`: nobody is signed in, show the login form
//! - `Authenticated`: a user is attached, show the dashboard

use serde::{Deserialize, Serialize};

use crate::user::{Role, User};

/// Observable session state.
///
/// Starts as `{ user: None, is_loading: true }`. `is_loading` drops to
/// `false` once the startup bootstrap has resolved and never rises again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// True until the bootstrap attempt resolves.
    pub is_loading: bool,
}

impl SessionState {
    /// State at process start, before bootstrap.
    #[must_use]
    pub const fn bootstrapping() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    /// Returns true if a user is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// Derives the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.is_loading) {
            (Some(user), _) => SessionPhase::Authenticated(user.clone()),
            (None, true) => SessionPhase::Bootstrapping,
            (None, false) => SessionPhase::Anonymous,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::bootstrapping()
    }
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// The startup restore attempt has not resolved yet.
    Bootstrapping,
    /// No user is signed in.
    Anonymous,
    /// A user is signed in.
    Authenticated(User),
}

impl SessionPhase {
    /// Short label for logs and status lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bootstrapping => "bootstrapping",
            Self::Anonymous => "anonymous",
            Self::Authenticated(_) => "authenticated",
        }
    }
}
