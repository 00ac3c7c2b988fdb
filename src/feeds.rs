use std::fmt;

use serde::{Deserialize, Serialize};

/// Section a feed (and every article it yields) is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "TOP STORIES")]
    TopStories,
    #[serde(rename = "WORLD NEWS")]
    WorldNews,
    #[serde(rename = "TECHNOLOGY")]
    Technology,
    #[serde(rename = "SPORTS")]
    Sports,
    #[serde(rename = "ECONOMY")]
    Economy,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::TopStories => "TOP STORIES",
            Section::WorldNews => "WORLD NEWS",
            Section::Technology => "TECHNOLOGY",
            Section::Sports => "SPORTS",
            Section::Economy => "ECONOMY",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub url: String,
    pub section: Section,
    pub source: String,
}

impl FeedDescriptor {
    pub fn new(url: &str, section: Section, source: &str) -> Self {
        Self {
            url: url.to_string(),
            section,
            source: source.to_string(),
        }
    }
}

/// Built-in registry used when the config file lists no feeds.
pub fn default_feeds() -> Vec<FeedDescriptor> {
    use Section::*;

    vec![
        FeedDescriptor::new("https://rss.cnn.com/rss/edition.rss", TopStories, "CNN"),
        FeedDescriptor::new("https://feeds.bbci.co.uk/news/rss.xml", TopStories, "BBC News"),
        FeedDescriptor::new(
            "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
            TopStories,
            "NY Times",
        ),
        FeedDescriptor::new("https://feeds.reuters.com/reuters/topNews", TopStories, "Reuters"),
        FeedDescriptor::new("https://feeds.bbci.co.uk/news/world/rss.xml", WorldNews, "BBC World"),
        FeedDescriptor::new("https://rss.cnn.com/rss/edition_world.rss", WorldNews, "CNN World"),
        FeedDescriptor::new("https://feeds.feedburner.com/techcrunch", Technology, "TechCrunch"),
        FeedDescriptor::new(
            "https://rss.cnn.com/rss/edition_technology.rss",
            Technology,
            "CNN Tech",
        ),
        FeedDescriptor::new("https://rss.cnn.com/rss/edition_sport.rss", Sports, "CNN Sports"),
        FeedDescriptor::new("https://feeds.bbci.co.uk/sport/rss.xml", Sports, "BBC Sport"),
        FeedDescriptor::new("https://rss.cnn.com/rss/money_latest.rss", Economy, "CNN Business"),
        FeedDescriptor::new(
            "https://feeds.bbci.co.uk/news/business/rss.xml",
            Economy,
            "BBC Business",
        ),
    ]
}
