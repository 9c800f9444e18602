mod assist;
mod config;
mod document;
mod errors;
mod export;
mod llm_client;
mod models;
mod notices;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assist::agent::LlmAssistAgent;
use crate::config::Config;
use crate::document::store::FileStorage;
use crate::export::raster::PreviewCapture;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; every variable has a default
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Forge API v{}", env!("CARGO_PKG_VERSION"));

    // Open the document record
    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    info!("Document storage at {}", config.data_dir.display());

    // Initialize LLM client (optional; assist is disabled without a key)
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.assist_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => None,
    };
    let assist = Arc::new(LlmAssistAgent::new(llm));

    let capture = preview_capture();

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(storage), assist, capture);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "browser")]
fn preview_capture() -> Arc<dyn PreviewCapture> {
    info!("Raster export enabled (headless browser capture)");
    Arc::new(export::capture::BrowserCapture)
}

#[cfg(not(feature = "browser"))]
fn preview_capture() -> Arc<dyn PreviewCapture> {
    info!("Raster export disabled; build with --features browser to enable");
    Arc::new(export::capture::UnavailableCapture)
}
