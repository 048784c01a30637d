//! Background persistence of analysis results
//!
//! Request handlers hand results to a [`ResultRecorder`], which queues them on
//! a bounded channel. A single worker task drains the queue into a
//! [`ResultSink`]. Enqueueing never blocks: a full queue drops the result with
//! a warning, and a sink failure is logged and discarded.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::types::EmotionResult;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Destination for recorded results
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(
        &self,
        caller_id: &str,
        result: &EmotionResult,
        client_timestamp: Option<&str>,
    ) -> aurora_common::Result<()>;
}

/// Persists results to the `emotion_analyses` table
#[derive(Clone)]
pub struct SqliteResultSink {
    db: SqlitePool,
}

impl SqliteResultSink {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResultSink for SqliteResultSink {
    async fn record(
        &self,
        caller_id: &str,
        result: &EmotionResult,
        client_timestamp: Option<&str>,
    ) -> aurora_common::Result<()> {
        crate::db::analyses::save_analysis(&self.db, caller_id, result, client_timestamp).await?;
        Ok(())
    }
}

#[derive(Debug)]
struct RecordJob {
    caller_id: String,
    result: EmotionResult,
    client_timestamp: Option<String>,
}

/// Handle for queueing results; cheap to clone
///
/// The worker exits once every handle has been dropped and the queue drained.
#[derive(Clone)]
pub struct ResultRecorder {
    tx: mpsc::Sender<RecordJob>,
}

impl ResultRecorder {
    /// Start the worker task
    pub fn spawn(sink: Arc<dyn ResultSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<RecordJob>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match sink
                    .record(&job.caller_id, &job.result, job.client_timestamp.as_deref())
                    .await
                {
                    Ok(()) => debug!(caller_id = %job.caller_id, "Analysis result recorded"),
                    Err(e) => error!(
                        caller_id = %job.caller_id,
                        error = %e,
                        "Failed to record analysis result"
                    ),
                }
            }
            debug!("Result recorder stopped");
        });

        (Self { tx }, handle)
    }

    /// Queue a result; returns false if it was dropped
    pub fn record(
        &self,
        caller_id: impl Into<String>,
        result: EmotionResult,
        client_timestamp: Option<String>,
    ) -> bool {
        let job = RecordJob {
            caller_id: caller_id.into(),
            result,
            client_timestamp,
        };

        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(caller_id = %job.caller_id, "Result recorder queue full, dropping result");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                error!(caller_id = %job.caller_id, "Result recorder stopped, dropping result");
                false
            }
        }
    }
}
