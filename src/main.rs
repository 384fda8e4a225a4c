use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinerec_api::{
    config::Config,
    routes::{create_router, AppState},
    services::{
        providers::{TmdbClient, TmdbPosterResolver},
        Recommender,
    },
    store::{load_dataset, PosterCache},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinerec_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    anyhow::ensure!(
        config.recommendation_count > 0,
        "RECOMMENDATION_COUNT must be at least 1"
    );

    // Refuse to serve anything if the data cannot be loaded
    let dataset = load_dataset(&config.data_dir).map_err(|e| {
        tracing::error!(error = %e, data_dir = %config.data_dir.display(), "Failed loading data");
        e
    })?;

    let poster_cache = PosterCache::new(&config.poster_cache_dir);
    poster_cache.ensure_dir().await.with_context(|| {
        format!(
            "Failed to create poster cache directory {}",
            config.poster_cache_dir.display()
        )
    })?;

    let tmdb = Arc::new(TmdbClient::from_config(&config));
    let recommender = Recommender::new(
        Arc::new(dataset.catalog),
        Arc::new(dataset.matrix),
        Arc::new(TmdbPosterResolver::new(tmdb.clone(), poster_cache)),
    )?;

    let state = Arc::new(AppState {
        recommender,
        tmdb,
        recommendation_count: config.recommendation_count,
        static_dir: config.static_dir.clone(),
        poster_dir: config.poster_cache_dir.clone(),
    });

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
