use serde::Deserialize;
use std::path::Path;

use crate::feeds::{default_feeds, FeedDescriptor};
use crate::proxy::default_proxies;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address the web server binds to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// How many items each feed contributes per load
    #[serde(default = "default_items_per_feed")]
    pub items_per_feed: usize,
    /// Client-wide request timeout; unset leaves the HTTP stack's default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Bridging endpoints, tried in order
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedDescriptor>,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_items_per_feed() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            items_per_feed: default_items_per_feed(),
            request_timeout_secs: None,
            proxies: default_proxies(),
            feeds: default_feeds(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.proxies.is_empty() {
            anyhow::bail!("at least one proxy must be configured");
        }
        Ok(config)
    }
}
