use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thinkers_news::aggregator::Aggregator;
use thinkers_news::config::Config;
use thinkers_news::fetcher::Fetcher;
use thinkers_news::routes::{self, AppState};
use thinkers_news::snapshot::NewsStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thinkers_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("THINKERS_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;

    let fetcher = Arc::new(Fetcher::from_config(&config)?);
    let proxies = fetcher.proxies().len();
    let aggregator = Arc::new(Aggregator::new(fetcher, config.feeds.clone()));
    info!(
        "Loaded {} feeds and {} proxies from {}",
        aggregator.feeds().len(),
        proxies,
        config_path
    );
    let store = Arc::new(NewsStore::new(aggregator));

    // Initial load; the page shows its loading state until this lands
    let initial = store.clone();
    tokio::spawn(async move {
        initial.reload().await;
    });

    let app = routes::router(Arc::new(AppState { store }));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Server starting on http://{}", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
