//! News Gateway — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_gateway::api::{self, AppState};
use news_gateway::config::UpstreamConfig;
use news_gateway::metrics::Metrics;
use news_gateway::upstream::HttpFeedStore;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWS_GATEWAY_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("NEWS_GATEWAY_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_gateway=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables UPSTREAM_BASE_URL / UPSTREAM_TIMEOUT_SECS from .env
    // so config.rs can pick them up.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = UpstreamConfig::resolve();
    let store = HttpFeedStore::new(&cfg).expect("Failed to build upstream client");

    let metrics = Metrics::init();

    let state = AppState {
        store: Arc::new(store),
    };
    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
