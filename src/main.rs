//! News Sentiment Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_sentiment_analyzer::api;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Analyzer construction happens here so a broken lexicon is a startup
    // error, not a first-request surprise.
    let state = api::default_state()?;
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let router = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
