//! Link Preview Fetcher for LinkStash.
//!
//! Calls a third-party preview API once per URL. Failures never propagate:
//! the caller always gets a preview, degraded to the hostname when the API
//! could not be reached or answered badly.

use std::future::Future;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::PreviewConfig;
use crate::services::link_detector;
use crate::types::errors::PreviewError;
use crate::types::preview::LinkPreview;

/// Trait defining how the bookmark service obtains preview metadata.
pub trait PreviewFetcher {
    /// Fetches metadata for `url`. Never fails; see [`LinkPreviewClient::fallback`].
    fn fetch_preview(&self, url: &str) -> impl Future<Output = LinkPreview> + Send;
}

/// Preview fetcher backed by an HTTP preview API (linkpreview.net compatible).
#[derive(Debug, Clone)]
pub struct LinkPreviewClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LinkPreviewClient {
    /// Builds a client with the configured timeout and user agent.
    pub fn new(config: &PreviewConfig) -> Result<Self, PreviewError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The degraded preview: hostname as title, plus the original URL.
    pub fn fallback(url: &str) -> LinkPreview {
        LinkPreview {
            title: link_detector::hostname(url),
            url: Some(url.to_string()),
            ..LinkPreview::default()
        }
    }

    /// Performs the single request, surfacing every failure.
    pub async fn try_fetch(&self, url: &str) -> Result<LinkPreview, PreviewError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("key", self.api_key.as_str()), ("q", url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PreviewError::Parse(e.to_string()))
    }
}

impl PreviewFetcher for LinkPreviewClient {
    async fn fetch_preview(&self, url: &str) -> LinkPreview {
        match self.try_fetch(url).await {
            Ok(preview) => {
                debug!("Fetched preview for {}", url);
                preview
            }
            Err(e) => {
                warn!("Error fetching link preview for {}: {}", url, e);
                Self::fallback(url)
            }
        }
    }
}
