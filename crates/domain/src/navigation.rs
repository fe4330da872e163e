//! Page selection and role-aware view routing.
//!
//! Routing is a pure mapping from `(page, role)` to a [`ViewId`]. The
//! router re-checks the role itself instead of trusting the menu, so a
//! hand-typed `admin` page never reaches the admin panel for other roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::user::Role;

/// A navigable page of the club application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Role-specific landing page.
    #[default]
    Dashboard,
    /// Attendance records.
    Attendance,
    /// Upcoming meetings and events.
    Agenda,
    /// Learning resources.
    Learning,
    /// Assignments and submissions.
    Assignments,
    /// Club announcements.
    Announcements,
    /// Member directory.
    Members,
    /// Recorded sessions.
    Videos,
    /// Administration panel.
    Admin,
    /// Own profile.
    Profile,
    /// Account settings.
    Settings,
}

impl Page {
    /// Every page, in sidebar order.
    pub const ALL: [Self; 11] = [
        Self::Dashboard,
        Self::Attendance,
        Self::Agenda,
        Self::Learning,
        Self::Assignments,
        Self::Announcements,
        Self::Members,
        Self::Videos,
        Self::Admin,
        Self::Profile,
        Self::Settings,
    ];

    /// Returns the page identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Attendance => "attendance",
            Self::Agenda => "agenda",
            Self::Learning => "learning",
            Self::Assignments => "assignments",
            Self::Announcements => "announcements",
            Self::Members => "members",
            Self::Videos => "videos",
            Self::Admin => "admin",
            Self::Profile => "profile",
            Self::Settings => "settings",
        }
    }

    /// Returns the sidebar label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Attendance => "Attendance",
            Self::Agenda => "Agenda",
            Self::Learning => "Learning Hub",
            Self::Assignments => "Assignments",
            Self::Announcements => "Announcements",
            Self::Members => "Members",
            Self::Videos => "Videos",
            Self::Admin => "Admin Panel",
            Self::Profile => "Profile",
            Self::Settings => "Settings",
        }
    }

    /// Returns true if the page appears in the menu for `role`.
    #[must_use]
    pub const fn visible_to(self, role: Role) -> bool {
        match self {
            Self::Admin => matches!(role, Role::Admin),
            Self::Members => matches!(role, Role::Teacher | Role::Admin),
            _ => true,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a page identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|page| page.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Identifier of a renderable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// Dashboard for students.
    StudentDashboard,
    /// Dashboard for teachers; also the default variant.
    TeacherDashboard,
    /// Dashboard for administrators.
    AdminDashboard,
    /// Attendance view.
    Attendance,
    /// Agenda view.
    Agenda,
    /// Learning hub view.
    Learning,
    /// Assignments view.
    Assignments,
    /// Announcements view.
    Announcements,
    /// Member directory view.
    Members,
    /// Video library view.
    Videos,
    /// Administration panel.
    AdminPanel,
    /// Profile view.
    Profile,
    /// Settings view.
    Settings,
}

impl ViewId {
    /// Returns the view identifier string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StudentDashboard => "student_dashboard",
            Self::TeacherDashboard => "teacher_dashboard",
            Self::AdminDashboard => "admin_dashboard",
            Self::Attendance => "attendance",
            Self::Agenda => "agenda",
            Self::Learning => "learning",
            Self::Assignments => "assignments",
            Self::Announcements => "announcements",
            Self::Members => "members",
            Self::Videos => "videos",
            Self::AdminPanel => "admin_panel",
            Self::Profile => "profile",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the dashboard variant for a role.
#[must_use]
pub const fn dashboard_for(role: Role) -> ViewId {
    match role {
        Role::Student => ViewId::StudentDashboard,
        Role::Admin => ViewId::AdminDashboard,
        Role::Teacher => ViewId::TeacherDashboard,
    }
}

/// Maps a page to the view rendered for `role`.
///
/// The admin page falls back to the role's dashboard unless `role` is admin.
#[must_use]
pub const fn resolve(page: Page, role: Role) -> ViewId {
    match page {
        Page::Dashboard => dashboard_for(role),
        Page::Admin if role.is_admin() => ViewId::AdminPanel,
        Page::Admin => dashboard_for(role),
        Page::Attendance => ViewId::Attendance,
        Page::Agenda => ViewId::Agenda,
        Page::Learning => ViewId::Learning,
        Page::Assignments => ViewId::Assignments,
        Page::Announcements => ViewId::Announcements,
        Page::Members => ViewId::Members,
        Page::Videos => ViewId::Videos,
        Page::Profile => ViewId::Profile,
        Page::Settings => ViewId::Settings,
    }
}

/// Maps a raw page identifier to a view; unknown identifiers land on the dashboard.
#[must_use]
pub fn resolve_id(page: &str, role: Role) -> ViewId {
    page.parse::<Page>()
        .map_or_else(|_| dashboard_for(role), |page| resolve(page, role))
}

/// Sidebar entries for a role, in display order.
#[must_use]
pub fn menu(role: Role) -> Vec<Page> {
    Page::ALL
        .into_iter()
        .filter(|page| page.visible_to(role))
        .collect()
}
