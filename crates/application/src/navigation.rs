//! Caller-owned navigation state.

use clubhub_domain::{Page, Role, SessionState, ViewId, resolve};
use tracing::debug;

/// Tracks the selected page and resolves it against the session's role.
///
/// The page only changes through explicit navigation and is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    current: Page,
}

impl Navigator {
    /// Starts on the dashboard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Page::Dashboard,
        }
    }

    /// The selected page.
    #[must_use]
    pub const fn current(&self) -> Page {
        self.current
    }

    /// Selects a page.
    pub fn navigate(&mut self, page: Page) {
        debug!(from = %self.current, to = %page, "navigate");
        self.current = page;
    }

    /// Selects a page by identifier. Unknown identifiers select the dashboard.
    pub fn navigate_to(&mut self, id: &str) -> Page {
        let page = id.parse::<Page>().unwrap_or_default();
        self.navigate(page);
        page
    }

    /// Returns to the dashboard, e.g. after sign-out.
    pub fn reset(&mut self) {
        self.current = Page::Dashboard;
    }

    /// View for the selected page as seen by `role`.
    #[must_use]
    pub const fn view_for(&self, role: Role) -> ViewId {
        resolve(self.current, role)
    }

    /// View for the selected page, or `None` when nobody is signed in.
    #[must_use]
    pub fn view(&self, session: &SessionState) -> Option<ViewId> {
        session.role().map(|role| self.view_for(role))
    }
}
