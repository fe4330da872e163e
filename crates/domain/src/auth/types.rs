//! Credential and token types exchanged with the auth service.

use std::fmt;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::user::{Role, User};

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Access and refresh token issued together by the auth service.
///
/// The pair is always stored and cleared as a unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token used to obtain a new pair.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Reads the `exp` claim of the access token without verifying it.
    ///
    /// Returns `None` for opaque tokens or tokens without an expiry.
    #[must_use]
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        #[derive(Deserialize)]
        struct Claims {
            exp: Option<i64>,
        }

        let payload = self.access_token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: Claims = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(claims.exp?, 0)
    }

    /// Returns true if the access token expires within `buffer` of `now`.
    ///
    /// Tokens without a readable expiry are never considered expiring.
    #[must_use]
    pub fn is_access_expiring(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        self.access_expires_at()
            .is_some_and(|expires_at| expires_at <= now + buffer)
    }

    /// Get a preview of a token (first 8 chars + ...).
    #[must_use]
    pub fn preview(token: &str) -> String {
        if token.len() > 12 {
            format!("{}...", token.chars().take(8).collect::<String>())
        } else {
            token.to_string()
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &Self::preview(&self.access_token))
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// A signed-in user together with the tokens issued for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// The authenticated user.
    pub user: User,
    /// Tokens for subsequent requests.
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Login form input.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Plain-text password, sent over TLS only.
    pub password: String,
}

impl Credentials {
    /// Creates login credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form input.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

impl Registration {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    /// Checks the form before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ValidationFailed` naming the first offending field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::ValidationFailed("name is required".to_string()));
        }
        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            return Err(AuthError::ValidationFailed(format!(
                "invalid email: {}",
                self.email
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::ValidationFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jwt_with_payload(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_access_expires_at_reads_exp_claim() {
        let tokens = TokenPair::new(jwt_with_payload(r#"{"id":"1","exp":1700000000}"#), "r");
        let expires_at = tokens.access_expires_at().unwrap();
        assert_eq!(expires_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_access_expires_at_opaque_token() {
        assert!(TokenPair::new("opaque", "r").access_expires_at().is_none());
        let no_exp = TokenPair::new(jwt_with_payload(r#"{"id":"1"}"#), "r");
        assert!(no_exp.access_expires_at().is_none());
    }

    #[test]
    fn test_is_access_expiring() {
        let tokens = TokenPair::new(jwt_with_payload(r#"{"exp":1700000000}"#), "r");
        let now = DateTime::from_timestamp(1_700_000_000 - 30, 0).unwrap();
        assert!(tokens.is_access_expiring(now, Duration::seconds(60)));
        assert!(!tokens.is_access_expiring(now, Duration::seconds(10)));
        assert!(!TokenPair::new("opaque", "r").is_access_expiring(now, Duration::seconds(60)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let tokens = TokenPair::new("abcdefghijklmnop", "very-secret-refresh");
        let rendered = format!("{tokens:?}");
        assert!(rendered.contains("abcdefgh..."));
        assert!(!rendered.contains("very-secret-refresh"));

        let credentials = Credentials::new("a@b.c", "hunter22");
        assert!(!format!("{credentials:?}").contains("hunter22"));
    }

    #[test]
    fn test_auth_session_flattens_tokens() {
        let json = r#"{
            "user": {"id":"1","name":"Asha","email":"student@college.edu","role":"student"},
            "accessToken": "a",
            "refreshToken": "r"
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.tokens, TokenPair::new("a", "r"));
        assert_eq!(session.user.role, Role::Student);
    }

    #[test]
    fn test_registration_validate() {
        let ok = Registration::new("Asha", "asha@college.edu", "secret1", Role::Student);
        assert!(ok.validate().is_ok());

        let cases = [
            Registration::new(" ", "asha@college.edu", "secret1", Role::Student),
            Registration::new("Asha", "not-an-email", "secret1", Role::Student),
            Registration::new("Asha", "asha@college.edu", "12345", Role::Student),
        ];
        for case in cases {
            assert!(matches!(
                case.validate(),
                Err(AuthError::ValidationFailed(_))
            ));
        }
    }

    #[test]
    fn test_email_shape_is_enforced() {
        for email in ["asha rao@college.edu", "asha@college", "@college.edu", ""] {
            let form = Registration::new("Asha", email, "secret1", Role::Student);
            assert!(form.validate().is_err(), "{email:?} should be rejected");
        }
        let form = Registration::new("Asha", " asha@college.edu ", "secret1", Role::Student);
        assert!(form.validate().is_ok());
    }
}
