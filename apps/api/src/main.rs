mod answer;
mod config;
mod errors;
mod feedback;
mod llm_client;
mod reference;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::answer::AnswerEngine;
use crate::config::Config;
use crate::feedback::FeedbackLog;
use crate::llm_client::VertexClient;
use crate::reference::ReferenceCache;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Guard must live for the process lifetime or file logging stops.
    let _log_guard = setup_logging(&config);

    info!("Starting USA Living Guide API v{}", env!("CARGO_PKG_VERSION"));
    match &config.project {
        Some(project) => info!(
            "Vertex AI configured: project={project}, location={}, model={}",
            config.location, config.model
        ),
        None => info!("No GCP project configured; all answers will use the local fallback"),
    }

    // Single slot shared between the refresh task and the answer engine.
    let reference = Arc::new(ReferenceCache::new());
    tokio::spawn(reference::refresh_loop(reference.clone()));

    let vertex = VertexClient::new(&config);
    let engine = Arc::new(AnswerEngine::new(vertex, reference));
    let feedback = Arc::new(FeedbackLog::new());

    let state = AppState { engine, feedback };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initializes tracing with a stdout layer and a daily-rolling file layer
/// under `config.log_dir`. Falls back to stdout-only if the directory
/// cannot be created — never panics over a bad log path.
fn setup_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone()));

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!(
            "warn: could not create log directory '{}': {e} - falling back to stdout",
            config.log_dir.display()
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Some(guard)
}
