//! Discord webhook sink for the assembled summary.
use crate::client::{ApiError, ApiResult};
use crate::http::{self, HttpRequest};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;

pub const DEFAULT_BOT_NAME: &str = "Leaderboard BOT";

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    username: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: Client,
    name: String,
    url: Url,
}

impl DiscordWebhook {
    /// `url` is the full webhook URL, e.g.
    /// `https://discord.com/api/webhooks/<id>/<token>`. It is validated here,
    /// before any leaderboard is fetched.
    pub fn new(name: impl Into<String>, url: &str) -> ApiResult<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| ApiError::Other(format!("invalid webhook url {url:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Other(format!(
                "webhook url must be http(s), got {:?}",
                url.scheme()
            )));
        }

        Ok(Self {
            client: http::build_client()?,
            name: name.into(),
            url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path plus query, as the executor wants it.
    fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_owned(),
        }
    }

    /// Post `content` as the bot. Only 204 counts as delivered.
    pub async fn send_message(&self, content: &str) -> ApiResult<()> {
        let payload = serde_json::to_string(&WebhookMessage { username: &self.name, content })
            .map_err(|e| ApiError::Parsing(e, self.url.to_string()))?;

        let origin = self.url.origin().ascii_serialization();
        let request = HttpRequest::new(Method::POST, origin, self.path_and_query())
            .header("content-type", "application/json")
            .body(payload);

        let response = http::execute(&self.client, request).await?;
        if response.status != StatusCode::NO_CONTENT {
            return Err(ApiError::Delivery {
                status: response.status,
                body: response.body,
            });
        }

        log::info!("summary delivered as {}", self.name);
        Ok(())
    }
}
