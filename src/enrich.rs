//! Title and favicon enrichment.
//!
//! Advisory network lookups for link display. Nothing here touches the store:
//! callers apply a title through a normal edit, and a failed or slow lookup
//! leaves whatever they already had.

use crate::config::EnrichmentConfig;
use crate::error::EnrichError;
use crate::import::markup::extract_title;
use async_trait::async_trait;
use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Enricher: Send + Sync {
    /// Page title of `url`
    async fn fetch_title(&self, url: &str) -> Result<String, EnrichError>;

    /// Favicon location for the site hosting `url`
    async fn favicon(&self, url: &str) -> Result<String, EnrichError>;
}

/// [`Enricher`] over HTTP(S) with `reqwest`
pub struct HttpEnricher {
    client: Client,
}

impl HttpEnricher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

fn parse_web_url(url: &str) -> Result<Url, EnrichError> {
    let parsed = Url::parse(url.trim()).map_err(|e| EnrichError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(EnrichError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

/// `<scheme>://<host>[:port]/favicon.ico`
pub fn favicon_url(url: &str) -> Result<String, EnrichError> {
    let parsed = parse_web_url(url)?;
    Ok(format!("{}/favicon.ico", parsed.origin().ascii_serialization()))
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn fetch_title(&self, url: &str) -> Result<String, EnrichError> {
        let parsed = parse_web_url(url)?;
        let body = self
            .client
            .get(parsed)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_title(&body).ok_or_else(|| EnrichError::NoTitle(url.to_string()))
    }

    async fn favicon(&self, url: &str) -> Result<String, EnrichError> {
        let icon = favicon_url(url)?;
        self.client.head(&icon).send().await?.error_for_status()?;
        Ok(icon)
    }
}

/// Title lookups that wait for a quiet period and supersede each other.
///
/// Each [`TitleDebouncer::request`] cancels the one still pending before it,
/// waits `debounce`, then gives the lookup at most `timeout`.
pub struct TitleDebouncer {
    enricher: Arc<dyn Enricher>,
    debounce: Duration,
    timeout: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl TitleDebouncer {
    pub fn new(enricher: Arc<dyn Enricher>, debounce: Duration, timeout: Duration) -> Self {
        Self {
            enricher,
            debounce,
            timeout,
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(enricher: Arc<dyn Enricher>, config: &EnrichmentConfig) -> Self {
        Self::new(enricher, config.debounce(), config.timeout())
    }

    pub async fn request(&self, url: &str) -> Result<String, EnrichError> {
        let (handle, registration) = AbortHandle::new_pair();
        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }

        let enricher = Arc::clone(&self.enricher);
        let (debounce, limit) = (self.debounce, self.timeout);
        let target = url.to_string();
        let lookup = async move {
            tokio::time::sleep(debounce).await;
            match tokio::time::timeout(limit, enricher.fetch_title(&target)).await {
                Ok(result) => result,
                Err(_) => Err(EnrichError::Timeout(limit.as_millis())),
            }
        };

        let result = match Abortable::new(lookup, registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(EnrichError::Cancelled),
        };
        if let Err(e) = &result {
            debug!(url = %url, error = %e, "Title lookup gave no result");
        }
        result
    }
}
