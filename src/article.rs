//! Normalization of proxy feed items into [`Article`]s.

use serde::{Deserialize, Serialize};

use crate::feeds::{FeedDescriptor, Section};
use crate::proxy::encode_component;

const EXCERPT_CHARS: usize = 200;
const CHARS_PER_MINUTE: usize = 1000;

/// JSON envelope returned by a bridging proxy.
#[derive(Debug, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RawItem>>,
}

impl FeedEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// One feed item as the proxy reports it. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Proxies disagree on the shape here (`{}`, `[]`, an object with a
    /// `link`), so it is kept untyped.
    #[serde(default)]
    pub enclosure: Option<serde_json::Value>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
}

impl RawItem {
    fn enclosure_link(&self) -> Option<&str> {
        self.enclosure
            .as_ref()
            .and_then(|e| e.get("link"))
            .and_then(|l| l.as_str())
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub section: Section,
    pub source: String,
    pub minutes: u32,
    pub image: String,
    pub excerpt: String,
    pub body: String,
    pub date: Option<String>,
}

impl Article {
    pub fn from_raw(item: RawItem, feed: &FeedDescriptor) -> Self {
        let description = item.description.as_deref().unwrap_or("");
        let title = item.title.clone().unwrap_or_default();

        let id = first_non_empty(&[item.guid.as_deref(), item.link.as_deref()])
            .map(str::to_string)
            .unwrap_or_else(random_token);

        let image = first_non_empty(&[item.enclosure_link(), item.thumbnail.as_deref()])
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_image(&title));

        let body_source =
            first_non_empty(&[item.content.as_deref(), item.description.as_deref()]).unwrap_or("");

        Self {
            id,
            section: feed.section,
            source: feed.source.clone(),
            minutes: reading_minutes(description),
            image,
            excerpt: excerpt(description),
            body: strip_html(body_source),
            date: item.pub_date,
            title,
        }
    }
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().flatten().copied().find(|s| !s.is_empty())
}

fn random_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Deterministic stock image seeded by the article title.
pub fn placeholder_image(title: &str) -> String {
    format!(
        "https://picsum.photos/seed/{}/1280/720",
        encode_component(title)
    )
}

/// One minute per thousand characters of description, never less than one.
pub fn reading_minutes(description: &str) -> u32 {
    let len = description.chars().count();
    let minutes = len.div_ceil(CHARS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

pub fn excerpt(description: &str) -> String {
    let mut text: String = strip_html(description).chars().take(EXCERPT_CHARS).collect();
    text.push_str("...");
    text
}

/// Drop `<...>` tags, then replace `&...;` entities with a space, then trim.
pub fn strip_html(html: &str) -> String {
    let without_tags = remove_delimited(html, '<', '>', "", false);
    remove_delimited(&without_tags, '&', ';', " ", true)
        .trim()
        .to_string()
}

/// Replace every `open ... close` run with `replacement`. An `open` with no
/// matching `close` after it is kept as plain text. With `non_empty`, a run
/// needs at least one character between the delimiters.
fn remove_delimited(
    input: &str,
    open: char,
    close: char,
    replacement: &str,
    non_empty: bool,
) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len_utf8()..];

        match after_open.find(close) {
            Some(end) if !(non_empty && end == 0) => {
                out.push_str(replacement);
                rest = &after_open[end + close.len_utf8()..];
            }
            _ => {
                out.push(open);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
