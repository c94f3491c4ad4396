//! HTTP client for the panel application API.

use crate::core::domain::{
    error::{CapacityError, CapacityResult, ValidationError},
    model::{
        application_node::{NodeObject, Pagination},
        monitor_config::MonitorConfig,
        panel_connection::PanelConnection,
    },
};
use crate::core::infrastructure::usage_source::UsageSource;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for the panel application API.
///
/// Sends the application key as a bearer token on every request, applies a
/// bounded timeout and optional client-side rate limiting, and retries a
/// failed transport exactly once before reporting the panel unreachable.
#[derive(Debug)]
pub struct PanelClient {
    http_client: Client,
    connection: Arc<PanelConnection>,
    config: Arc<MonitorConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl PanelClient {
    /// Creates a new `PanelClient`.
    ///
    /// # Errors
    /// Returns `CapacityError::Connection` if the HTTP client cannot be
    /// built, or `CapacityError::Validation` for an unusable rate limit.
    pub fn new(connection: PanelConnection, config: MonitorConfig) -> CapacityResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CapacityError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::ConstraintViolation(
                        "Rate limit requests_per_second cannot be 0".to_string(),
                    )
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    ValidationError::ConstraintViolation(
                        "Rate limit burst_size cannot be 0".to_string(),
                    )
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &PanelConnection {
        &self.connection
    }

    /// Fetches one page of the node listing with servers included.
    ///
    /// Node entries that fail to deserialize are skipped individually so a
    /// single malformed record cannot take down the whole inventory.
    async fn fetch_nodes_page(&self, page: u32) -> CapacityResult<(Vec<NodeObject>, u32)> {
        let path = format!(
            "api/application/nodes?include=servers&per_page={}&page={}",
            self.config.page_size, page
        );
        let body = self.get_json(&path).await?;

        let mut nodes = Vec::new();
        match body.get("data").and_then(|d| d.as_array()) {
            Some(entries) => {
                for entry in entries {
                    match serde_json::from_value::<NodeObject>(entry.clone()) {
                        Ok(node) => nodes.push(node),
                        Err(e) => {
                            warn!(error = %e, "skipping malformed node entry in panel response");
                        }
                    }
                }
            }
            None => {
                return Err(CapacityError::Connection(
                    "Panel response is missing the data list".to_string(),
                ));
            }
        }

        let pagination = body
            .pointer("/meta/pagination")
            .and_then(|meta| serde_json::from_value::<Pagination>(meta.clone()).ok())
            .unwrap_or_default();
        let total_pages = pagination.total_pages.max(1);

        Ok((nodes, total_pages))
    }

    /// Performs an authenticated GET and parses the body as JSON.
    async fn get_json(&self, path: &str) -> CapacityResult<serde_json::Value> {
        // Apply rate limiting if enabled
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.panel_url().join(path);
        let response = self.send_with_retry(&url).await?;

        match response.status() {
            status if status.is_success() => response.json::<serde_json::Value>().await.map_err(
                |e| CapacityError::Connection(format!("Failed to parse panel response: {}", e)),
            ),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                CapacityError::Authentication("Panel rejected the application API key".to_string()),
            ),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                Err(CapacityError::Connection(format!(
                    "API error ({}): {}",
                    status, error_text
                )))
            }
        }
    }

    /// Sends a GET request, retrying exactly once on a transport failure.
    async fn send_with_retry(&self, url: &str) -> CapacityResult<reqwest::Response> {
        match self.send_once(url).await {
            Ok(response) => Ok(response),
            Err(first) => {
                debug!(error = %first, "panel request failed, retrying once");
                self.send_once(url).await.map_err(|e| {
                    CapacityError::Connection(format!("HTTP request failed after retry: {}", e))
                })
            }
        }
    }

    async fn send_once(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.http_client
            .get(url)
            .header("Accept", "Application/vnd.pterodactyl.v1+json")
            .header("Content-Type", "application/json")
            .bearer_auth(self.connection.api_key().as_str())
            .send()
            .await
    }
}

#[async_trait]
impl UsageSource for PanelClient {
    async fn fetch_nodes(&self) -> CapacityResult<Vec<NodeObject>> {
        let (mut nodes, total_pages) = self.fetch_nodes_page(1).await?;

        let mut page = 2;
        while page <= total_pages {
            let (more, _) = self.fetch_nodes_page(page).await?;
            nodes.extend(more);
            page += 1;
        }

        debug!(count = nodes.len(), pages = total_pages, "fetched panel node inventory");
        Ok(nodes)
    }
}
