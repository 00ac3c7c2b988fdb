use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::article::{Article, FeedEnvelope};
use crate::config::Config;
use crate::feeds::FeedDescriptor;
use crate::proxy::ProxyChain;

/// Why a single proxy attempt was abandoned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("proxy reported status {0:?}")]
    Status(Option<String>),
    #[error("proxy response has no items")]
    MissingItems,
}

pub struct Fetcher {
    client: Client,
    proxies: ProxyChain,
    items_per_feed: usize,
}

impl Fetcher {
    pub fn new(
        proxies: ProxyChain,
        items_per_feed: usize,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent("ThinkersNews/1.0 (RSS Aggregator)");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            proxies,
            items_per_feed,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            ProxyChain::new(config.proxies.clone()),
            config.items_per_feed,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn proxies(&self) -> &ProxyChain {
        &self.proxies
    }

    /// Fetch a feed starting from the first proxy.
    pub async fn fetch(&self, feed: &FeedDescriptor) -> Vec<Article> {
        self.fetch_from(feed, 0).await
    }

    /// Try each proxy from `proxy_index` onwards, once each, and return the
    /// articles from the first one that answers with an "ok" envelope. An
    /// exhausted chain yields an empty list.
    pub async fn fetch_from(&self, feed: &FeedDescriptor, proxy_index: usize) -> Vec<Article> {
        let mut index = proxy_index;

        while let Some(request_url) = self.proxies.request_url(index, &feed.url) {
            match self.fetch_through(&request_url, feed).await {
                Ok(articles) => {
                    info!(
                        source = %feed.source,
                        proxy = index,
                        count = articles.len(),
                        "Fetched feed"
                    );
                    return articles;
                }
                Err(e) => {
                    warn!(
                        source = %feed.source,
                        proxy = index,
                        last = self.proxies.is_last(index),
                        error = %e,
                        "Error fetching feed"
                    );
                }
            }
            index += 1;
        }

        error!(source = %feed.source, url = %feed.url, "All proxies failed, feed skipped");
        Vec::new()
    }

    async fn fetch_through(
        &self,
        request_url: &str,
        feed: &FeedDescriptor,
    ) -> Result<Vec<Article>, FetchError> {
        let response = self.client.get(request_url).send().await?;
        let bytes = response.bytes().await?;
        let envelope: FeedEnvelope = serde_json::from_slice(&bytes)?;

        if !envelope.is_ok() {
            return Err(FetchError::Status(envelope.status));
        }

        let items = envelope.items.ok_or(FetchError::MissingItems)?;

        Ok(items
            .into_iter()
            .take(self.items_per_feed)
            .map(|item| Article::from_raw(item, feed))
            .collect())
    }
}
