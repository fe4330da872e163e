//! Session controller.
//!
//! Owns the client-side `SessionState` and drives it through the
//! bootstrap, login, register, refresh and logout flows against the
//! `AuthApi` and `TokenStore` ports. Every change is published on a
//! `watch` channel so any number of views can follow the session.
//!
//! Failure handling:
//! - login/register rejections are returned to the caller unchanged
//! - bootstrap and logout failures are logged and always end `Anonymous`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use clubhub_domain::{
    AuthSession, Credentials, Registration, SessionPhase, SessionState, TokenPair, User,
};

use crate::error::{SessionError, SessionResult};
use crate::ports::{AuthApi, Clock, TokenStore};

/// Controller for the signed-in user of this process.
pub struct SessionController<A, S> {
    api: A,
    store: S,
    clock: Arc<dyn Clock>,
    state: watch::Sender<SessionState>,
    /// Serialises auth operations; overlapping calls run one after another.
    ops: Mutex<()>,
    bootstrap_started: AtomicBool,
}

impl<A: AuthApi, S: TokenStore> SessionController<A, S> {
    /// Creates a controller in the `Bootstrapping` phase.
    pub fn new(api: A, store: S, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(SessionState::bootstrapping());
        Self {
            api,
            store,
            clock,
            state,
            ops: Mutex::new(()),
            bootstrap_started: AtomicBool::new(false),
        }
    }

    /// Subscribes to session state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// True until the bootstrap attempt has resolved.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Returns the signed-in user.
    ///
    /// # Errors
    /// `SessionError::NotAuthenticated` when nobody is signed in.
    pub fn require_user(&self) -> SessionResult<User> {
        self.user().ok_or(SessionError::NotAuthenticated)
    }

    /// The token store backing this session.
    pub const fn token_store(&self) -> &S {
        &self.store
    }

    /// Restores a persisted session. Runs at most once per controller.
    ///
    /// Without a stored token the session becomes `Anonymous` without
    /// contacting the service. A token the service rejects is cleared.
    /// Later calls wait for the first one and return its outcome.
    ///
    /// If the first call is cancelled before it resolves, the session
    /// settles `Anonymous` and any stored token is kept for the next launch.
    pub async fn bootstrap(&self) -> SessionState {
        if self.bootstrap_started.swap(true, Ordering::SeqCst) {
            let mut rx = self.state.subscribe();
            let _ = rx.wait_for(|state| !state.is_loading).await;
            return self.state();
        }

        let _settle = SettleOnDrop(&self.state);
        let _guard = self.ops.lock().await;
        let user = self.restore().await;
        self.state.send_replace(SessionState {
            user,
            is_loading: false,
        });

        let state = self.state();
        info!(phase = state.phase().label(), "session bootstrap complete");
        state
    }

    async fn restore(&self) -> Option<User> {
        let token = match self.store.access_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored access token");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "could not read stored tokens, starting anonymous");
                return None;
            }
        };

        match self.api.me(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "restored session");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "stored session rejected");
                self.discard_tokens().await;
                None
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// - `SessionError::Auth` with the service's rejection, unchanged
    /// - `SessionError::AlreadyAuthenticated` if a user is signed in
    /// - `SessionError::NotReady` before bootstrap has run
    /// - `SessionError::Storage` if the issued tokens cannot be persisted
    pub async fn login(&self, credentials: &Credentials) -> SessionResult<User> {
        let _guard = self.ops.lock().await;
        self.ensure_anonymous()?;

        debug!(email = %credentials.email, "logging in");
        let session = self.api.login(credentials).await?;
        self.establish(session).await
    }

    /// Creates an account and signs it in.
    ///
    /// The form is validated locally first; invalid input never reaches
    /// the service.
    ///
    /// # Errors
    /// Same as [`Self::login`], plus `AuthError::ValidationFailed` from
    /// local validation.
    pub async fn register(&self, registration: &Registration) -> SessionResult<User> {
        let _guard = self.ops.lock().await;
        self.ensure_anonymous()?;
        registration.validate()?;

        debug!(email = %registration.email, role = %registration.role, "registering");
        let session = self.api.register(registration).await?;
        self.establish(session).await
    }

    /// Signs out. Always ends `Anonymous` with tokens cleared, whatever
    /// the service answers.
    pub async fn logout(&self) {
        let _guard = self.ops.lock().await;

        match self.store.access_token().await {
            Ok(Some(token)) => {
                if let Err(e) = self.api.logout(&token).await {
                    warn!(error = %e, "remote logout failed, clearing local session anyway");
                }
            }
            Ok(None) => debug!("no stored token to revoke"),
            Err(e) => warn!(error = %e, "could not read stored tokens during logout"),
        }

        self.discard_tokens().await;
        self.publish(None);
        info!("signed out");
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// A refresh token the service rejects ends the session. So does a new
    /// pair that cannot be persisted.
    ///
    /// # Errors
    /// - `SessionError::NotAuthenticated` when nobody is signed in
    /// - `SessionError::Auth` with the service's rejection
    /// - `SessionError::Storage` if the new pair cannot be persisted
    pub async fn refresh_tokens(&self) -> SessionResult<TokenPair> {
        let _guard = self.ops.lock().await;
        self.refresh_locked().await
    }

    /// Refreshes the pair if the access token expires within `buffer`.
    ///
    /// Returns whether a refresh happened. Opaque tokens are left alone.
    /// Expiry is checked under the operation lock, so overlapping calls
    /// refresh once.
    ///
    /// # Errors
    /// Same as [`Self::refresh_tokens`].
    pub async fn refresh_if_expiring(&self, buffer: Duration) -> SessionResult<bool> {
        let _guard = self.ops.lock().await;
        let Some(tokens) = self.store.tokens().await? else {
            return Ok(false);
        };
        if !tokens.is_access_expiring(self.clock.now(), buffer) {
            return Ok(false);
        }
        self.refresh_locked().await?;
        Ok(true)
    }

    /// Caller holds `ops`.
    async fn refresh_locked(&self) -> SessionResult<TokenPair> {
        if !self.state.borrow().is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        let Some(refresh_token) = self.store.refresh_token().await? else {
            warn!("signed in without a refresh token, ending session");
            self.teardown().await;
            return Err(clubhub_domain::AuthError::Unauthorized.into());
        };

        match self.api.refresh(&refresh_token).await {
            Ok(tokens) => {
                if let Err(e) = self.store.set_tokens(&tokens).await {
                    warn!(error = %e, "could not persist refreshed tokens, ending session");
                    self.teardown().await;
                    return Err(e.into());
                }
                info!(
                    access_token = %TokenPair::preview(&tokens.access_token),
                    "tokens refreshed"
                );
                Ok(tokens)
            }
            Err(e) if e.is_unauthorized() => {
                warn!("refresh token rejected, ending session");
                self.teardown().await;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_anonymous(&self) -> SessionResult<()> {
        let state = self.state.borrow();
        if let Some(user) = &state.user {
            return Err(SessionError::AlreadyAuthenticated(user.email.clone()));
        }
        if state.is_loading {
            return Err(SessionError::NotReady);
        }
        Ok(())
    }

    /// Persists the issued tokens, then exposes the user.
    async fn establish(&self, session: AuthSession) -> SessionResult<User> {
        if let Err(e) = self.store.set_tokens(&session.tokens).await {
            warn!(error = %e, "could not persist tokens, staying signed out");
            self.discard_tokens().await;
            return Err(e.into());
        }

        let user = session.user;
        info!(user_id = %user.id, role = %user.role, "signed in");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn teardown(&self) {
        self.discard_tokens().await;
        self.publish(None);
    }

    async fn discard_tokens(&self) {
        if let Err(e) = self.store.clear_tokens().await {
            warn!(error = %e, "could not clear stored tokens");
        }
    }

    /// Replaces the user; `is_loading` is owned by bootstrap alone.
    fn publish(&self, user: Option<User>) {
        self.state.send_modify(|state| state.user = user);
    }
}

/// Ends an interrupted bootstrap as `Anonymous` so waiters are released.
struct SettleOnDrop<'a>(&'a watch::Sender<SessionState>);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if !state.is_loading {
                return false;
            }
            warn!("session bootstrap interrupted, starting anonymous");
            *state = SessionState {
                user: None,
                is_loading: false,
            };
            true
        });
    }
}
