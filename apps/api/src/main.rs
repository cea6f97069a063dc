mod backend;
mod config;
mod curation;
mod errors;
mod generation;
mod loading;
mod models;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::{CandidateClient, PanelServiceClient, QuestionBankClient};
use crate::config::{Config, CurationStoreBackend};
use crate::curation::durable::{DurableStore, FileStore, MemoryStore, RedisStore};
use crate::generation::rate_limiter::COOLDOWN_PERIOD_SECS;
use crate::routes::build_router;
use crate::session::PanelSession;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting panel console v{}", env!("CARGO_PKG_VERSION"));

    let durable = build_durable_store(&config)?;

    let generator = Arc::new(PanelServiceClient::new(
        config.panel_service_url.clone(),
        config.http_timeout,
    )?);
    let question_bank = Arc::new(QuestionBankClient::new(
        config.question_bank_url.clone(),
        config.http_timeout,
    )?);
    let candidates =
        CandidateClient::new(config.candidate_service_url.clone(), config.http_timeout)?;
    info!(
        panel_service = %config.panel_service_url,
        question_bank = %config.question_bank_url,
        candidate_service = %config.candidate_service_url,
        "backend clients initialized"
    );

    let session = Arc::new(
        PanelSession::new(
            generator,
            question_bank.clone(),
            durable,
            COOLDOWN_PERIOD_SECS,
        )
        .await,
    );

    let state = AppState {
        session,
        candidates,
        question_bank,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    // The router and its session go out of scope here, which aborts any
    // running cooldown ticker.
    info!("panel console stopped");
    Ok(())
}

fn build_durable_store(config: &Config) -> Result<Arc<dyn DurableStore>> {
    let store: Arc<dyn DurableStore> = match config.curation_store {
        CurationStoreBackend::File => {
            info!(dir = %config.curation_store_dir.display(), "curation store: file");
            Arc::new(FileStore::new(config.curation_store_dir.clone()))
        }
        CurationStoreBackend::Redis => {
            let url = config
                .redis_url
                .clone()
                .context("REDIS_URL is required for the redis curation store")?;
            let client = redis::Client::open(url)?;
            info!("curation store: redis");
            Arc::new(RedisStore::new(client))
        }
        CurationStoreBackend::Memory => {
            info!("curation store: memory (selections are lost on exit)");
            Arc::new(MemoryStore::default())
        }
    };
    Ok(store)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
