//! Single-shot HTTP plumbing shared by the token grant, the leaderboard
//! fetch and the webhook notifier.
//!
//! One call, one outbound request: no retries, no redirects, no timeout.
use crate::client::{ApiError, ApiResult};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};

/// Build the client every executor call goes through. It never follows
/// redirects, so a builder failure is an error rather than `Client::default()`.
pub fn build_client() -> ApiResult<Client> {
    Client::builder()
        .user_agent("rift-tracker/0.1 (leaderboard job)")
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(ApiError::Client)
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Scheme + authority, e.g. `https://eu.battle.net`.
    pub host: String,
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
    pub basic_auth: Option<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            headers: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), self.path)
    }
}

/// Status, headers and the fully-read body of one response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Perform `request` once and read the whole body.
///
/// Non-2xx statuses are not errors here; callers decide what they accept.
pub async fn execute(client: &Client, request: HttpRequest) -> ApiResult<RawResponse> {
    let url = request.url();
    log::debug!("{} {url}", request.method);

    let mut builder = client.request(request.method, &url);
    for (name, value) in request.headers {
        builder = builder.header(name, value);
    }
    if let Some((user, password)) = request.basic_auth {
        builder = builder.basic_auth(user, Some(password));
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e, url.clone()))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e, url.clone()))?;

    log::debug!("{url} responded {status} ({} bytes)", body.len());
    Ok(RawResponse { status, headers, body })
}
