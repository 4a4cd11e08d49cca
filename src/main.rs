//! Bookshelf - multi-tenant book catalog service
//!
//! Loads configuration, builds the in-memory store and serves the API.

use anyhow::{Context, Result};
use bookshelf_backend::{
    auth::{user_agent::WootheeParser, TokenCodec},
    create_router, AppState, Config, Store,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookshelf", about = "Multi-tenant book catalog service")]
struct Cli {
    /// Address to bind (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    init_tracing();

    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!("🚀 Bookshelf starting");

    let store = Arc::new(Store::new(config.password_cost));
    let codec = Arc::new(TokenCodec::new(&config.token_secret));
    let state = AppState::new(store, codec, Arc::new(WootheeParser::new()));

    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Bookshelf stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_backend=debug,bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
