//! Auth service client implementation using reqwest.
//!
//! This adapter implements the `AuthApi` port against the club backend's
//! REST endpoints:
//! - `POST {base}/auth/login`
//! - `POST {base}/auth/register`
//! - `POST {base}/auth/logout` (bearer)
//! - `GET  {base}/auth/me` (bearer)
//! - `POST {base}/auth/refresh`
//!
//! Response bodies may be bare or wrapped in a `{ "data": ... }` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use clubhub_application::ports::AuthApi;
use clubhub_domain::{AuthError, AuthSession, Credentials, Registration, TokenPair, User};

/// Auth endpoints, used to pick the error category for a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Login,
    Register,
    Logout,
    Me,
    Refresh,
}

impl Endpoint {
    const fn path(self) -> &'static str {
        match self {
            Self::Login => "auth/login",
            Self::Register => "auth/register",
            Self::Logout => "auth/logout",
            Self::Me => "auth/me",
            Self::Refresh => "auth/refresh",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeBody {
    Wrapped { user: User },
    Bare(User),
}

/// Error payload returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the club auth service.
pub struct ReqwestAuthApi {
    client: Client,
    base_url: Url,
}

impl ReqwestAuthApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(concat!("ClubHub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::NetworkFailure(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Creates an auth client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, endpoint: Endpoint) -> Result<Url, AuthError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AuthError::NetworkFailure(format!("unusable API base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(endpoint.path().split('/'));
        Ok(url)
    }

    /// Sends a request and returns the body of a successful response.
    async fn dispatch(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, AuthError> {
        debug!(endpoint = endpoint.path(), "auth request");
        let response = request.send().await.map_err(map_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_error)?.to_vec();

        if status.is_success() {
            Ok(body)
        } else {
            debug!(endpoint = endpoint.path(), status = status.as_u16(), "auth request rejected");
            Err(classify(endpoint, status.as_u16(), error_message(&body)))
        }
    }
}

/// Maps a rejected response onto the auth error taxonomy.
fn classify(endpoint: Endpoint, status: u16, message: Option<String>) -> AuthError {
    let detail = || message.clone().unwrap_or_else(|| format!("HTTP {status}"));
    match (endpoint, status) {
        (Endpoint::Login, 400 | 401 | 403 | 404) => AuthError::InvalidCredentials,
        (Endpoint::Register, 409) => AuthError::EmailTaken,
        (Endpoint::Register, 400 | 422) => {
            let text = detail();
            if text.to_lowercase().contains("already") {
                AuthError::EmailTaken
            } else {
                AuthError::ValidationFailed(text)
            }
        }
        (Endpoint::Me | Endpoint::Logout | Endpoint::Refresh, 401 | 403) => {
            AuthError::Unauthorized
        }
        _ => AuthError::NetworkFailure(format!("{} returned {status}: {}", endpoint.path(), detail())),
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.message.or(parsed.error).filter(|m| !m.trim().is_empty())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AuthError> {
    serde_json::from_slice::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| AuthError::NetworkFailure(format!("unexpected response body: {e}")))
}

fn map_error(error: reqwest::Error) -> AuthError {
    if error.is_timeout() {
        return AuthError::NetworkFailure("request timed out".to_string());
    }
    if error.is_connect() {
        return AuthError::NetworkFailure(format!("connection failed: {error}"));
    }
    AuthError::NetworkFailure(error.to_string())
}

#[async_trait]
impl AuthApi for ReqwestAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let url = self.endpoint(Endpoint::Login)?;
        let body = self
            .dispatch(Endpoint::Login, self.client.post(url).json(credentials))
            .await?;
        decode(&body)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
        let url = self.endpoint(Endpoint::Register)?;
        let body = self
            .dispatch(Endpoint::Register, self.client.post(url).json(registration))
            .await?;
        decode(&body)
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint(Endpoint::Logout)?;
        self.dispatch(Endpoint::Logout, self.client.post(url).bearer_auth(access_token))
            .await?;
        Ok(())
    }

    async fn me(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.endpoint(Endpoint::Me)?;
        let body = self
            .dispatch(Endpoint::Me, self.client.get(url).bearer_auth(access_token))
            .await?;
        let me: MeBody = decode(&body)?;
        Ok(match me {
            MeBody::Wrapped { user } | MeBody::Bare(user) => user,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let url = self.endpoint(Endpoint::Refresh)?;
        let payload = serde_json::json!({ "refreshToken": refresh_token });
        let body = self
            .dispatch(Endpoint::Refresh, self.client.post(url).json(&payload))
            .await?;
        decode(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use clubhub_domain::Role;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned HTTP response and returns the raw request it saw.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}/api")).unwrap();
        (url, handle)
    }

    fn api(base_url: Url) -> ReqwestAuthApi {
        ReqwestAuthApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = api(Url::parse("http://localhost:5000/api").unwrap());
        assert_eq!(
            api.endpoint(Endpoint::Login).unwrap().as_str(),
            "http://localhost:5000/api/auth/login"
        );

        let api = ReqwestAuthApi::with_client(
            Client::new(),
            Url::parse("http://localhost:5000/api/").unwrap(),
        );
        assert_eq!(
            api.endpoint(Endpoint::Me).unwrap().as_str(),
            "http://localhost:5000/api/auth/me"
        );
    }

    #[test]
    fn test_classify_statuses() {
        assert_eq!(classify(Endpoint::Login, 401, None), AuthError::InvalidCredentials);
        assert_eq!(classify(Endpoint::Login, 400, None), AuthError::InvalidCredentials);
        assert_eq!(classify(Endpoint::Register, 409, None), AuthError::EmailTaken);
        assert_eq!(
            classify(Endpoint::Register, 400, Some("User already exists".to_string())),
            AuthError::EmailTaken
        );
        assert_eq!(
            classify(Endpoint::Register, 422, Some("Password too short".to_string())),
            AuthError::ValidationFailed("Password too short".to_string())
        );
        assert_eq!(classify(Endpoint::Me, 401, None), AuthError::Unauthorized);
        assert_eq!(classify(Endpoint::Refresh, 403, None), AuthError::Unauthorized);
        assert!(matches!(
            classify(Endpoint::Login, 500, None),
            AuthError::NetworkFailure(_)
        ));
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        assert_eq!(
            error_message(br#"{"message":"Invalid credentials","error":"x"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(error_message(br#"{"error":"Bad"}"#).as_deref(), Some("Bad"));
        assert_eq!(error_message(b"<html>"), None);
    }

    #[test]
    fn test_decode_accepts_envelope() {
        let bare = br#"{"accessToken":"a","refreshToken":"r"}"#;
        let wrapped = br#"{"success":true,"data":{"accessToken":"a","refreshToken":"r"}}"#;
        assert_eq!(decode::<TokenPair>(bare).unwrap(), TokenPair::new("a", "r"));
        assert_eq!(decode::<TokenPair>(wrapped).unwrap(), TokenPair::new("a", "r"));
        assert!(matches!(
            decode::<TokenPair>(b"{}"),
            Err(AuthError::NetworkFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"user":{"_id":"u-1","name":"Asha","email":"student@college.edu","role":"student"},"accessToken":"a-1","refreshToken":"r-1"}"#,
        )
        .await;

        let session = api(url)
            .login(&Credentials::new("student@college.edu", "password123"))
            .await
            .unwrap();

        assert_eq!(session.user.role, Role::Student);
        assert_eq!(session.tokens, TokenPair::new("a-1", "r-1"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/login "));
        assert!(request.contains(r#""email":"student@college.edu""#));
    }

    #[tokio::test]
    async fn test_me_sends_bearer_token() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"user":{"id":"u-1","name":"Asha","email":"a@b.c","role":"admin"}}"#,
        )
        .await;

        let user = api(url).me("token-123").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/auth/me "));
        assert!(request.contains("authorization: bearer token-123"));
    }

    #[tokio::test]
    async fn test_me_rejected_token_is_unauthorized() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"message":"jwt expired"}"#).await;

        let err = api(url).me("stale").await.unwrap_err();

        assert_eq!(err, AuthError::Unauthorized);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_register_conflict_is_email_taken() {
        let (url, server) = serve_once("409 Conflict", r#"{"message":"Email already registered"}"#).await;

        let err = api(url)
            .register(&Registration::new(
                "Ravi",
                "ravi@college.edu",
                "secret123",
                Role::Teacher,
            ))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::EmailTaken);
        let request = server.await.unwrap();
        assert!(request.contains(r#""role":"teacher""#));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/api")).unwrap();

        let err = api(url).me("token").await.unwrap_err();

        assert!(matches!(err, AuthError::NetworkFailure(_)));
    }
}
