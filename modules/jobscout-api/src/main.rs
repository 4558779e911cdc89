use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobscout_api::{routes, store::PgResultStore, AppState};
use jobscout_common::Config;
use jobscout_engine::ScrapeEngine;
use webdriver_client::WebDriverClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = PgResultStore::new(pool);
    store.migrate().await?;

    let engine = ScrapeEngine::new(Arc::new(WebDriverClient::new(&config.webdriver_url)));

    let state = Arc::new(AppState {
        scraper: Arc::new(engine),
        store: Arc::new(store),
        budget: Duration::from_secs(config.scrape_budget_secs),
    });

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "jobscout API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
