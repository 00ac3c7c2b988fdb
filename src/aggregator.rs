use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::article::Article;
use crate::feeds::FeedDescriptor;
use crate::fetcher::Fetcher;

/// Fans a fetch out to every registered feed and merges what comes back.
pub struct Aggregator {
    fetcher: Arc<Fetcher>,
    feeds: Arc<[FeedDescriptor]>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<Fetcher>, feeds: Vec<FeedDescriptor>) -> Self {
        Self {
            fetcher,
            feeds: feeds.into(),
        }
    }

    pub fn feeds(&self) -> &[FeedDescriptor] {
        &self.feeds
    }

    /// Fetch every feed concurrently and wait for all of them to settle.
    ///
    /// Results are concatenated in completion order. A feed that fails, or a
    /// fetch task that dies, contributes nothing; articles without a title
    /// are dropped. Dropping the returned future aborts fetches still in
    /// flight.
    pub async fn load_all(&self) -> Vec<Article> {
        let mut tasks = JoinSet::new();
        for feed in self.feeds.iter().cloned() {
            let fetcher = self.fetcher.clone();
            tasks.spawn(async move { fetcher.fetch(&feed).await });
        }

        let mut articles = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(batch) => articles.extend(batch),
                Err(e) => warn!(error = %e, "Feed task did not complete"),
            }
        }

        articles.retain(|article| !article.title.is_empty());

        info!(
            feeds = self.feeds.len(),
            articles = articles.len(),
            "Aggregation pass complete"
        );
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::Section;
    use crate::proxy::ProxyChain;
    use serde_json::json;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aggregator(server: &MockServer, feeds: Vec<FeedDescriptor>) -> Aggregator {
        let proxies = ProxyChain::new(vec![
            format!("{}/primary?url=", server.uri()),
            format!("{}/secondary?url=", server.uri()),
        ]);
        let fetcher = Fetcher::new(proxies, 10, None).unwrap();
        Aggregator::new(Arc::new(fetcher), feeds)
    }

    async fn respond(server: &MockServer, proxy: &str, feed_url: &str, body: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", proxy)))
            .and(query_param("url", feed_url))
            .respond_with(body)
            .mount(server)
            .await;
    }

    fn items(titles: &[&str]) -> ResponseTemplate {
        let items: Vec<_> = titles.iter().map(|t| json!({ "title": t })).collect();
        ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "items": items }))
    }

    #[tokio::test]
    async fn test_merges_primary_and_fallback_results() {
        let server = MockServer::start().await;
        let a = FeedDescriptor::new("https://a.example/rss", Section::TopStories, "A");
        let b = FeedDescriptor::new("https://b.example/rss", Section::Sports, "B");

        respond(&server, "primary", &a.url, items(&["X"])).await;
        respond(&server, "primary", &b.url, ResponseTemplate::new(502)).await;
        respond(&server, "secondary", &b.url, items(&["Y"])).await;

        let articles = aggregator(&server, vec![a, b]).load_all().await;

        assert_eq!(articles.len(), 2);
        let titles: HashSet<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, HashSet::from(["X", "Y"]));

        let y = articles.iter().find(|a| a.title == "Y").unwrap();
        assert_eq!(y.section, Section::Sports);
        assert_eq!(y.source, "B");
    }

    #[tokio::test]
    async fn test_all_feeds_failing_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let feeds = vec![
            FeedDescriptor::new("https://a.example/rss", Section::TopStories, "A"),
            FeedDescriptor::new("https://b.example/rss", Section::Economy, "B"),
        ];

        let articles = aggregator(&server, feeds).load_all().await;
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_drops_untitled_articles() {
        let server = MockServer::start().await;
        let a = FeedDescriptor::new("https://a.example/rss", Section::Technology, "A");
        respond(
            &server,
            "primary",
            &a.url,
            ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "items": [
                    { "title": "Kept" },
                    { "title": "" },
                    { "link": "https://a.example/untitled" }
                ]
            })),
        )
        .await;

        let articles = aggregator(&server, vec![a]).load_all().await;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
    }

    #[tokio::test]
    async fn test_failing_feed_does_not_affect_others() {
        let server = MockServer::start().await;
        let good = FeedDescriptor::new("https://good.example/rss", Section::WorldNews, "Good");
        let bad = FeedDescriptor::new("https://bad.example/rss", Section::WorldNews, "Bad");

        respond(&server, "primary", &good.url, items(&["One", "Two", "Three"])).await;
        respond(&server, "primary", &bad.url, ResponseTemplate::new(404)).await;
        respond(&server, "secondary", &bad.url, ResponseTemplate::new(404)).await;

        let articles = aggregator(&server, vec![bad, good]).load_all().await;

        assert_eq!(articles.len(), 3);
        assert!(articles.iter().all(|a| a.source == "Good"));
    }

    #[test]
    fn test_keeps_registry_order() {
        let feeds = vec![
            FeedDescriptor::new("https://a.example/rss", Section::WorldNews, "A"),
            FeedDescriptor::new("https://b.example/rss", Section::Sports, "B"),
        ];
        let proxies = ProxyChain::new(vec!["http://127.0.0.1:9/?url=".to_string()]);
        let fetcher = Arc::new(Fetcher::new(proxies, 10, None).unwrap());
        let aggregator = Aggregator::new(fetcher, feeds.clone());

        assert_eq!(aggregator.feeds(), feeds.as_slice());
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let server = MockServer::start().await;
        let aggregator = aggregator(&server, Vec::new());
        assert!(aggregator.feeds().is_empty());
        let articles = aggregator.load_all().await;

        assert!(articles.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
