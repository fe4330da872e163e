//! Console front end over the session controller.
//!
//! Each input line parses into a [`Command`]; executing it drives the
//! session or the navigator and yields text to print.

use chrono::Duration;
use clubhub_application::{AuthApi, Navigator, SessionController, SessionError, TokenStore};
use clubhub_domain::{Credentials, Registration, Role, SessionPhase, User, menu};
use tracing::warn;

/// Access tokens expiring sooner than this are refreshed before a command runs.
const REFRESH_BUFFER_SECS: i64 = 60;

const HELP: &str = "\
commands:
  login <email> <password>
  register <email> <password> <role> <name...>
  logout
  whoami
  menu
  go <page>
  view
  refresh
  help
  quit";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Credentials),
    Register(Registration),
    Logout,
    WhoAmI,
    Menu,
    Go(String),
    View,
    Refresh,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Returns a usage hint on malformed input.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(HELP.to_string());
        };
        let args: Vec<&str> = words.collect();

        match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("login", [email, password]) => Ok(Self::Login(Credentials::new(*email, *password))),
            ("login", _) => Err("usage: login <email> <password>".to_string()),
            ("register", [email, password, role, name @ ..]) if !name.is_empty() => {
                let role = role.parse::<Role>().map_err(|e| e.to_string())?;
                Ok(Self::Register(Registration::new(
                    name.join(" "),
                    *email,
                    *password,
                    role,
                )))
            }
            ("register", _) => {
                Err("usage: register <email> <password> <student|teacher|admin> <name...>".to_string())
            }
            ("logout", []) => Ok(Self::Logout),
            ("whoami", []) => Ok(Self::WhoAmI),
            ("menu", []) => Ok(Self::Menu),
            ("go", [page]) => Ok(Self::Go((*page).to_string())),
            ("go", _) => Err("usage: go <page>".to_string()),
            ("view", []) => Ok(Self::View),
            ("refresh", []) => Ok(Self::Refresh),
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit", _) => Ok(Self::Quit),
            (other, _) => Err(format!("unknown command: {other}\n{HELP}")),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Session shell state: the controller plus the selected page.
pub struct Shell<A, S> {
    session: SessionController<A, S>,
    navigator: Navigator,
}

impl<A: AuthApi, S: TokenStore> Shell<A, S> {
    pub const fn new(session: SessionController<A, S>) -> Self {
        Self {
            session,
            navigator: Navigator::new(),
        }
    }

    /// Restores the persisted session and describes the result.
    pub async fn start(&mut self) -> String {
        let state = self.session.bootstrap().await;
        match state.user {
            Some(user) => format!("welcome back, {}\n{}", describe(&user), self.render_view()),
            None => "not signed in; type `login <email> <password>` or `help`".to_string(),
        }
    }

    pub fn prompt(&self) -> String {
        match self.session.phase() {
            SessionPhase::Authenticated(user) => {
                format!("{}@{}> ", user.initials(), self.navigator.current())
            }
            SessionPhase::Bootstrapping | SessionPhase::Anonymous => "clubhub> ".to_string(),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        if self.session.user().is_some() && !matches!(command, Command::Refresh | Command::Logout) {
            self.refresh_if_expiring().await;
        }

        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Quit => return Reply::Quit,
            Command::Login(credentials) => match self.session.login(&credentials).await {
                Ok(user) => self.signed_in(&user),
                Err(e) => render_error(&e),
            },
            Command::Register(registration) => {
                match self.session.register(&registration).await {
                    Ok(user) => self.signed_in(&user),
                    Err(e) => render_error(&e),
                }
            }
            Command::Logout => {
                self.session.logout().await;
                self.navigator.reset();
                "signed out".to_string()
            }
            Command::WhoAmI => self
                .session
                .require_user()
                .map_or_else(|e| render_error(&e), |user| describe(&user)),
            Command::Menu => match self.session.require_user() {
                Ok(user) => menu(user.role)
                    .into_iter()
                    .map(|page| {
                        let marker = if page == self.navigator.current() { '*' } else { ' ' };
                        format!("{marker} {:<14} {}", page.as_str(), page.label())
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                Err(e) => render_error(&e),
            },
            Command::Go(page) => match self.session.require_user() {
                Ok(_) => {
                    self.navigator.navigate_to(&page);
                    self.render_view()
                }
                Err(e) => render_error(&e),
            },
            Command::View => self.render_view(),
            Command::Refresh => match self.session.refresh_tokens().await {
                Ok(_) => "tokens refreshed".to_string(),
                Err(e) => render_error(&e),
            },
        };
        Reply::Text(text)
    }

    fn signed_in(&mut self, user: &User) -> String {
        self.navigator.reset();
        format!("signed in as {}\n{}", describe(user), self.render_view())
    }

    fn render_view(&self) -> String {
        let state = self.session.state();
        match self.navigator.view(&state) {
            Some(view) => format!("[view: {view}]"),
            None => render_error(&SessionError::NotAuthenticated),
        }
    }

    async fn refresh_if_expiring(&self) {
        let buffer = Duration::seconds(REFRESH_BUFFER_SECS);
        if let Err(e) = self.session.refresh_if_expiring(buffer).await {
            warn!(error = %e, "token refresh failed");
        }
    }

    /// Selected page, for tests.
    #[cfg(test)]
    const fn current_page(&self) -> clubhub_domain::Page {
        self.navigator.current()
    }
}

fn describe(user: &User) -> String {
    let mut text = format!("{} <{}> ({})", user.name, user.email, user.role);
    if let Some(batch) = &user.batch {
        text.push_str(&format!(" batch {batch}"));
    }
    if !user.skills.is_empty() {
        text.push_str(&format!(" skills: {}", user.skills.join(", ")));
    }
    text
}

fn render_error(error: &SessionError) -> String {
    format!("error: {error}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clubhub_application::{FixedClock, MemoryTokenStore};
    use clubhub_domain::{AuthError, AuthSession, Page, TokenPair};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct StubApi;

    #[async_trait]
    impl AuthApi for StubApi {
        async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
            let role = match credentials.email.split('@').next() {
                Some("admin") => Role::Admin,
                Some("teacher") => Role::Teacher,
                _ => Role::Student,
            };
            if credentials.password != "password123" {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(AuthSession {
                user: User::new("u-1", "Asha Rao", &credentials.email, role),
                tokens: TokenPair::new("a", "r"),
            })
        }

        async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
            Ok(AuthSession {
                user: User::new("u-2", &registration.name, &registration.email, registration.role),
                tokens: TokenPair::new("a", "r"),
            })
        }

        async fn logout(&self, _access_token: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn me(&self, _access_token: &str) -> Result<User, AuthError> {
            Err(AuthError::Unauthorized)
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, AuthError> {
            Ok(TokenPair::new("a-2", "r-2"))
        }
    }

    async fn shell() -> Shell<StubApi, MemoryTokenStore> {
        let clock = Arc::new(FixedClock(chrono::DateTime::from_timestamp(0, 0).unwrap()));
        let mut shell = Shell::new(SessionController::new(
            StubApi,
            MemoryTokenStore::new(),
            clock,
        ));
        shell.start().await;
        shell
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("login student@college.edu password123"),
            Ok(Command::Login(Credentials::new(
                "student@college.edu",
                "password123"
            )))
        );
        assert_eq!(
            Command::parse("register ravi@college.edu secret123 teacher Ravi Kumar"),
            Ok(Command::Register(Registration::new(
                "Ravi Kumar",
                "ravi@college.edu",
                "secret123",
                Role::Teacher
            )))
        );
        assert_eq!(Command::parse("GO agenda"), Ok(Command::Go("agenda".to_string())));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
        assert!(Command::parse("login only-email").is_err());
        assert!(Command::parse("register a@b.c pw wizard Name").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_login_then_navigate() {
        let mut shell = shell().await;

        let reply = text(
            shell
                .execute(Command::parse("login student@college.edu password123").unwrap())
                .await,
        );
        assert!(reply.contains("[view: student_dashboard]"));

        let reply = text(shell.execute(Command::Go("admin".to_string())).await);
        assert_eq!(reply, "[view: student_dashboard]");
        assert_eq!(shell.current_page(), Page::Admin);

        let reply = text(shell.execute(Command::Go("agenda".to_string())).await);
        assert_eq!(reply, "[view: agenda]");
    }

    #[tokio::test]
    async fn test_admin_sees_admin_panel() {
        let mut shell = shell().await;
        shell
            .execute(Command::Login(Credentials::new("admin@college.edu", "password123")))
            .await;

        let menu = text(shell.execute(Command::Menu).await);
        assert!(menu.contains("admin"));

        let reply = text(shell.execute(Command::Go("admin".to_string())).await);
        assert_eq!(reply, "[view: admin_panel]");
    }

    #[tokio::test]
    async fn test_commands_require_session() {
        let mut shell = shell().await;
        assert_eq!(shell.prompt(), "clubhub> ");

        let reply = text(shell.execute(Command::WhoAmI).await);
        assert!(reply.starts_with("error: not signed in"));

        let reply = text(shell.execute(Command::Go("agenda".to_string())).await);
        assert!(reply.starts_with("error:"));
    }

    #[tokio::test]
    async fn test_bad_password_is_reported() {
        let mut shell = shell().await;
        let reply = text(
            shell
                .execute(Command::Login(Credentials::new("student@college.edu", "nope")))
                .await,
        );
        assert_eq!(reply, "error: invalid email or password");
    }

    #[tokio::test]
    async fn test_logout_resets_navigation() {
        let mut shell = shell().await;
        shell
            .execute(Command::Login(Credentials::new("teacher@college.edu", "password123")))
            .await;
        shell.execute(Command::Go("members".to_string())).await;
        assert_eq!(shell.prompt(), "AR@members> ");

        let reply = text(shell.execute(Command::Logout).await);

        assert_eq!(reply, "signed out");
        assert_eq!(shell.current_page(), Page::Dashboard);
        assert_eq!(shell.prompt(), "clubhub> ");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut shell = shell().await;
        assert_eq!(shell.execute(Command::Quit).await, Reply::Quit);
    }
}
