//! estate-content — Binary Entrypoint
//! Boots the Axum HTTP server over the configured source chain.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use estate_content::{api, config};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("estate_content=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let sources = config::load_sources_default().context("loading source chain")?;
    tracing::info!(sources = sources.len(), "source chain loaded");

    let state = api::AppState::from_configs(&sources)?;
    let router = api::create_router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "estate-content listening");

    axum::serve(listener, router).await.context("serving http")?;
    Ok(())
}
