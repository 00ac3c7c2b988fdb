use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` gets escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Public bridging services that turn an RSS URL into a JSON envelope.
pub fn default_proxies() -> Vec<String> {
    vec![
        "https://api.rss2json.com/v1/api.json?rss_url=".to_string(),
        "https://api.allorigins.win/get?url=".to_string(),
        "https://corsproxy.io/?".to_string(),
    ]
}

/// Ordered list of proxy prefixes. A feed is requested through the first
/// one and falls through to the next on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyChain {
    proxies: Vec<String>,
}

impl ProxyChain {
    pub fn new(proxies: Vec<String>) -> Self {
        Self { proxies }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.proxies.len()
    }

    /// Request URL for `feed_url` through the proxy at `index`, or `None`
    /// once the chain is exhausted.
    pub fn request_url(&self, index: usize, feed_url: &str) -> Option<String> {
        let proxy = self.proxies.get(index)?;
        Some(format!("{}{}", proxy, encode_component(feed_url)))
    }
}

impl Default for ProxyChain {
    fn default() -> Self {
        Self::new(default_proxies())
    }
}

/// Percent-encode a single URL component with the same unreserved set as
/// `encodeURIComponent`.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
