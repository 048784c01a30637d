//! aurora-emotion - Multimodal Emotion Analysis Service
//!
//! Serves POST /analyze, POST /analyze/batch, GET /status and GET /health.
//! Default bind: 127.0.0.1:8000

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aurora_common::config::{load_module_config, RootFolderInitializer};
use aurora_emotion::analyzers::AnalyzerSet;
use aurora_emotion::config::{Cli, ServiceConfig};
use aurora_emotion::fusion::WeightedFusionEngine;
use aurora_emotion::services::{EmotionAnalyzer, ResultRecorder, SqliteResultSink};
use aurora_emotion::{AppState, MODULE_NAME};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml_config = load_module_config(MODULE_NAME, cli.config.as_deref());
    let config = ServiceConfig::resolve(&cli, &toml_config)
        .context("Invalid configuration")?;

    // RUST_LOG takes precedence over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("aurora_emotion={0},aurora_common={0},tower_http=info", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} (Emotion Analysis) service", MODULE_NAME);
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        root_folder = %config.root_folder.display(),
        bind = %config.bind_addr(),
        model_version = %config.model_version,
        "Configuration resolved"
    );

    // Root folder and database
    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = aurora_emotion::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Analyzers and fusion engine
    let analyzer = EmotionAnalyzer::new(
        AnalyzerSet::standard(),
        Arc::new(WeightedFusionEngine::new(config.fusion)),
    )
    .with_model_version(config.model_version.clone());
    analyzer
        .initialize()
        .await
        .context("Failed to initialize emotion analyzer")?;

    let (recorder, recorder_task) = ResultRecorder::spawn(
        Arc::new(SqliteResultSink::new(db_pool.clone())),
        config.recorder_queue_capacity,
    );

    let state = AppState::new(Arc::new(analyzer), recorder, db_pool);
    let app = aurora_emotion::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!("Listening on http://{}", config.bind_addr());
    info!("Health check: http://{}/health", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Router (and its recorder handle) dropped; let the worker drain the queue
    if let Err(e) = recorder_task.await {
        tracing::error!(error = %e, "Result recorder task failed");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
