//! aurora-emotion library interface
//!
//! Multimodal emotion analysis: per-modality analyzers, weighted fusion,
//! an orchestrator with fault isolation, and the HTTP surface around it.

pub mod analyzers;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod fusion;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{EmotionAnalyzer, ResultRecorder};

/// Module name used for config lookup and health reporting
pub const MODULE_NAME: &str = "aurora-emotion";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<EmotionAnalyzer>,
    /// Background persistence for identified callers
    pub recorder: ResultRecorder,
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(analyzer: Arc<EmotionAnalyzer>, recorder: ResultRecorder, db: SqlitePool) -> Self {
        Self {
            analyzer,
            recorder,
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::status_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
