use crate::auth::{AccessToken, ClientCredentials, CredentialManager};
use crate::blizzard::LeaderboardResponse;
use crate::http::{self, HttpRequest};
use reqwest::{Client, Method, StatusCode};
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_REGION: &str = "eu";
pub const DEFAULT_SEASON: u32 = 16;

/// Battle.net client for the Diablo III season leaderboards.
#[derive(Debug)]
pub struct BattlenetApi {
    client: Client,
    api_host: String,
    credentials: CredentialManager,
}

#[derive(Debug)]
pub enum ApiError {
    /// Connection could not be made or the response stream broke.
    Transport(reqwest::Error, String),
    /// The token grant failed or returned something unusable.
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// The HTTP client itself could not be configured.
    Client(reqwest::Error),
    /// Leaderboard endpoint answered with something other than 200.
    Api { status: StatusCode, body: String, url: String },
    Parsing(serde_json::Error, String),
    /// A leaderboard row did not have the expected shape.
    Schema(String),
    /// The webhook did not answer 204.
    Delivery { status: StatusCode, body: String },
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Auth { message, .. } => write!(f, "Auth error: {message}"),
            ApiError::Client(e) => write!(f, "Could not build HTTP client: {e}"),
            ApiError::Api { status, body, url } => {
                write!(f, "API error for {url} (status {status}): {body}")
            }
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Schema(msg) => write!(f, "Unexpected leaderboard shape: {msg}"),
            ApiError::Delivery { status, body } => {
                write!(f, "Could not send message to webhook (status {status}): {body}")
            }
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e, _) => Some(e),
            ApiError::Parsing(e, _) => Some(e),
            ApiError::Client(e) => Some(e),
            ApiError::Auth { source, .. } => source
                .as_deref()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

pub fn oauth_host(region: &str) -> String {
    format!("https://{region}.battle.net")
}

pub fn api_host(region: &str) -> String {
    format!("https://{region}.api.blizzard.com")
}

pub fn leaderboard_path(season: u32, category: &str) -> String {
    format!("/data/d3/season/{season}/leaderboard/rift-{category}")
}

impl BattlenetApi {
    pub fn new(credentials: ClientCredentials, region: &str) -> ApiResult<Self> {
        Self::with_hosts(credentials, oauth_host(region), api_host(region))
    }

    /// Point the client at explicit hosts instead of the region-derived ones.
    pub fn with_hosts(
        credentials: ClientCredentials,
        oauth_host: impl Into<String>,
        api_host: impl Into<String>,
    ) -> ApiResult<Self> {
        let client = http::build_client()?;
        Ok(Self {
            credentials: CredentialManager::new(client.clone(), credentials, oauth_host),
            client,
            api_host: api_host.into(),
        })
    }

    pub async fn access_token(&self) -> ApiResult<AccessToken> {
        self.credentials.obtain_access_token().await
    }

    /// Fetch one season leaderboard, e.g. `rift-barbarian` or `rift-team-4`.
    ///
    /// The token is obtained first, so an auth failure means no GET is sent.
    /// Anything but 200 is an [`ApiError::Api`] and the body is not parsed.
    pub async fn fetch_leaderboard(
        &self,
        season: u32,
        category: &str,
    ) -> ApiResult<LeaderboardResponse> {
        let token = self.access_token().await?;

        let request = HttpRequest::new(
            Method::GET,
            self.api_host.as_str(),
            leaderboard_path(season, category),
        )
        .header("authorization", format!("Bearer {}", token.as_str()));
        let url = request.url();

        let response = http::execute(&self.client, request).await?;
        if response.status != StatusCode::OK {
            return Err(ApiError::Api {
                status: response.status,
                body: response.body,
                url,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::Parsing(e, url))
    }
}
