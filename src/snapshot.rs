use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::aggregator::Aggregator;
use crate::article::Article;

/// What the front page currently has to show.
#[derive(Debug, Clone)]
pub enum Snapshot {
    /// No load has finished yet.
    Loading,
    Loaded {
        articles: Arc<Vec<Article>>,
        loaded_at: DateTime<Utc>,
    },
    /// The aggregation pass itself died.
    Failed { message: String },
}

impl Snapshot {
    pub fn loaded(articles: Vec<Article>) -> Self {
        Snapshot::Loaded {
            articles: Arc::new(articles),
            loaded_at: Utc::now(),
        }
    }
}

/// In-memory holder of the latest aggregation result. Each reload replaces
/// the previous snapshot wholesale.
pub struct NewsStore {
    aggregator: Arc<Aggregator>,
    snapshot: RwLock<Snapshot>,
    refreshing: RwLock<bool>,
}

impl NewsStore {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self::with_snapshot(aggregator, Snapshot::Loading)
    }

    pub fn with_snapshot(aggregator: Arc<Aggregator>, snapshot: Snapshot) -> Self {
        Self {
            aggregator,
            snapshot: RwLock::new(snapshot),
            refreshing: RwLock::new(false),
        }
    }

    pub async fn current(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn is_refreshing(&self) -> bool {
        *self.refreshing.read().await
    }

    /// Run one aggregation pass and publish its result. Returns `false`
    /// without doing anything when a reload is already running.
    pub async fn reload(&self) -> bool {
        if !self.begin_reload().await {
            return false;
        }
        self.finish_reload().await;
        true
    }

    /// Claim the reload slot and put the page back into its loading view
    /// unless there are stories to keep showing. Returns `false` when a
    /// reload is already running. A `true` must be followed by
    /// [`NewsStore::finish_reload`].
    pub async fn begin_reload(&self) -> bool {
        {
            let mut refreshing = self.refreshing.write().await;
            if *refreshing {
                info!("Reload already in progress, skipping");
                return false;
            }
            *refreshing = true;
        }

        let mut snapshot = self.snapshot.write().await;
        let has_stories =
            matches!(&*snapshot, Snapshot::Loaded { articles, .. } if !articles.is_empty());
        if !has_stories {
            *snapshot = Snapshot::Loading;
        }
        true
    }

    /// Run the aggregation pass for a reload claimed by
    /// [`NewsStore::begin_reload`].
    pub async fn finish_reload(&self) {
        let aggregator = self.aggregator.clone();
        self.publish(async move { aggregator.load_all().await }).await;
    }

    async fn publish<F>(&self, pass: F)
    where
        F: Future<Output = Vec<Article>> + Send + 'static,
    {
        let next = load_snapshot(pass).await;
        *self.snapshot.write().await = next;
        *self.refreshing.write().await = false;
    }
}

/// Run `pass` on its own task. A panic inside it becomes a failed snapshot.
async fn load_snapshot<F>(pass: F) -> Snapshot
where
    F: Future<Output = Vec<Article>> + Send + 'static,
{
    match tokio::spawn(pass).await {
        Ok(articles) => {
            info!(articles = articles.len(), "Stories reloaded");
            Snapshot::loaded(articles)
        }
        Err(e) => {
            error!(error = %e, "Failed to load RSS feeds");
            Snapshot::Failed {
                message: e.to_string(),
            }
        }
    }
}
