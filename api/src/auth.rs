//! OAuth2 client-credentials token, fetched once and reused for the lifetime
//! of the owning [`CredentialManager`].
use crate::blizzard::TokenResponse;
use crate::client::{ApiError, ApiResult};
use crate::http::{self, HttpRequest};
use reqwest::{Client, Method};
use std::fmt;
use tokio::sync::OnceCell;

pub const TOKEN_PATH: &str = "/oauth/token";

#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Owns the cached token. Only the first call performs a grant; concurrent
/// first callers share that one in-flight request. A failed grant leaves the
/// cache empty so a later call would try again.
#[derive(Debug)]
pub struct CredentialManager {
    client: Client,
    credentials: ClientCredentials,
    oauth_host: String,
    token: OnceCell<AccessToken>,
}

impl CredentialManager {
    pub fn new(client: Client, credentials: ClientCredentials, oauth_host: impl Into<String>) -> Self {
        Self {
            client,
            credentials,
            oauth_host: oauth_host.into(),
            token: OnceCell::new(),
        }
    }

    pub async fn obtain_access_token(&self) -> ApiResult<AccessToken> {
        self.token
            .get_or_try_init(|| self.grant())
            .await
            .cloned()
    }

    pub fn has_token(&self) -> bool {
        self.token.initialized()
    }

    async fn grant(&self) -> ApiResult<AccessToken> {
        log::info!("requesting access token from {}", self.oauth_host);

        let request = HttpRequest::new(Method::POST, self.oauth_host.as_str(), TOKEN_PATH)
            .header("content-type", "application/x-www-form-urlencoded")
            .basic_auth(
                self.credentials.client_id.as_str(),
                self.credentials.client_secret.as_str(),
            )
            .body("grant_type=client_credentials");
        let url = request.url();

        let response = http::execute(&self.client, request)
            .await
            .map_err(|e| auth_error(format!("token grant at {url} failed"), Some(Box::new(e))))?;

        if !response.status.is_success() {
            return Err(auth_error(
                format!("token grant at {url} returned {}: {}", response.status, response.body),
                None,
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            auth_error(format!("invalid token response from {url}"), Some(Box::new(e)))
        })?;
        let token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| auth_error(format!("no access_token in response from {url}"), None))?;

        match parsed.expires_in {
            Some(secs) => log::debug!("access token acquired, expires in {secs}s"),
            None => log::debug!("access token acquired"),
        }
        Ok(AccessToken(token))
    }
}

fn auth_error(
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
) -> ApiError {
    ApiError::Auth { message, source }
}
