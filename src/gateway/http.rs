//! HTTP gateway backed by reqwest.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::{Gateway, ITEMS_ENDPOINT, VOTE_EVENTS_ENDPOINT};
use crate::model::{Item, PageId, ScoredItem, VoteEvent};

/// Largest error body kept in a `GatewayError::Status`.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Talks to a live ranking service.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway for the configured service.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Polls the service root until it answers or `timeout` elapses.
    ///
    /// Any HTTP response counts as ready; only transport failures are
    /// retried.
    pub async fn wait_until_ready(
        &self,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), GatewayError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.client.get(self.url("/")).send().await {
                Ok(response) => {
                    info!(base_url = %self.base_url, status = response.status().as_u16(), "Ranking service is reachable");
                    return Ok(());
                }
                Err(e) => {
                    if tokio::time::Instant::now() + poll_interval > deadline {
                        return Err(GatewayError::Transport {
                            message: format!(
                                "{} not reachable after {}s: {e}",
                                self.base_url,
                                timeout.as_secs()
                            ),
                        });
                    }
                    debug!(error = %e, "Ranking service not reachable yet");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(response).await.map(drop)
    }
}

impl Gateway for HttpGateway {
    async fn post_item(&self, item: &Item) -> Result<(), GatewayError> {
        self.post_json(ITEMS_ENDPOINT, item).await
    }

    async fn post_vote_event(&self, vote_event: &VoteEvent) -> Result<(), GatewayError> {
        self.post_json(VOTE_EVENTS_ENDPOINT, vote_event).await
    }

    async fn get_ranking(&self, page: PageId) -> Result<Vec<ScoredItem>, GatewayError> {
        let response = self
            .client
            .get(self.url(page.endpoint()))
            .send()
            .await
            .map_err(request_error)?;
        let response = ensure_success(response).await?;

        let body: serde_json::Value = response.json().await.map_err(|e| {
            GatewayError::MalformedRanking {
                reason: format!("body is not JSON: {e}"),
            }
        })?;
        parse_ranking(body)
    }
}

fn request_error(e: reqwest::Error) -> GatewayError {
    if e.is_builder() {
        GatewayError::Encoding {
            message: e.to_string(),
        }
    } else {
        GatewayError::Transport {
            message: e.to_string(),
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut cut = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(GatewayError::Status {
        code: status.as_u16(),
        body,
    })
}

/// Interprets a ranking body, which must be a JSON array of scored items.
pub(crate) fn parse_ranking(body: serde_json::Value) -> Result<Vec<ScoredItem>, GatewayError> {
    if !body.is_array() {
        let kind = match &body {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Object(_) => "an object",
            serde_json::Value::Array(_) => "an array",
        };
        return Err(GatewayError::MalformedRanking {
            reason: format!("expected a JSON array, got {kind}"),
        });
    }
    serde_json::from_value(body).map_err(|e| GatewayError::MalformedRanking {
        reason: e.to_string(),
    })
}
