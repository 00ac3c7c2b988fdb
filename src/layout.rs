//! Front page composition: which articles go where for a given tab.

use crate::article::Article;
use crate::feeds::Section;

const TRENDING: std::ops::Range<usize> = 1..4;
const LATEST: std::ops::Range<usize> = 4..16;

/// Navigation tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Today,
    TopStories,
    World,
    Business,
    Technology,
    Sports,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Today,
        Tab::TopStories,
        Tab::World,
        Tab::Business,
        Tab::Technology,
        Tab::Sports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::TopStories => "Top Stories",
            Tab::World => "World",
            Tab::Business => "Business",
            Tab::Technology => "Technology",
            Tab::Sports => "Sports",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Tab::Today | Tab::TopStories => Section::TopStories,
            Tab::World => Section::WorldNews,
            Tab::Business => Section::Economy,
            Tab::Technology => Section::Technology,
            Tab::Sports => Section::Sports,
        }
    }

    pub fn from_label(label: &str) -> Option<Tab> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(label.trim()))
    }

    /// The landing tab shows everything, unfiltered.
    pub fn shows_everything(self) -> bool {
        self == Tab::Today
    }
}

/// Articles visible under `tab`.
pub fn filter_for_tab(articles: &[Article], tab: Tab) -> Vec<&Article> {
    if tab.shows_everything() {
        return articles.iter().collect();
    }
    let section = tab.section();
    articles.iter().filter(|a| a.section == section).collect()
}

/// First article with the given id. Ids are best-effort, so duplicates
/// resolve to the earliest.
pub fn find_article<'a>(articles: &'a [Article], id: &str) -> Option<&'a Article> {
    articles.iter().find(|a| a.id == id)
}

fn window(articles: &[Article], range: std::ops::Range<usize>) -> &[Article] {
    let len = articles.len();
    &articles[range.start.min(len)..range.end.min(len)]
}

pub struct FrontPage<'a> {
    pub featured: Option<&'a Article>,
    pub trending: &'a [Article],
    pub latest: &'a [Article],
    pub grid: Vec<&'a Article>,
}

impl<'a> FrontPage<'a> {
    pub fn build(articles: &'a [Article], tab: Tab) -> Self {
        let section = tab.section();
        let featured = articles
            .iter()
            .find(|a| a.section == section)
            .or_else(|| articles.first());

        Self {
            featured,
            trending: window(articles, TRENDING),
            latest: window(articles, LATEST),
            grid: filter_for_tab(articles, tab),
        }
    }
}
