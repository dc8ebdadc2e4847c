// src/lambda/mod.rs

//! AWS Lambda handler for the stock monitor.
//!
//! Each invocation runs one monitoring cycle:
//! 1. Loads `config.toml` from S3 (defaults when absent)
//! 2. Reads run settings from the function environment
//! 3. Compares against the snapshot stored in S3 and notifies Telegram

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::LambdaConfigLoader;
use crate::error::Result;
use crate::models::RunConfig;
use crate::pipeline::{self, RunOutcome};
use crate::services::{ConsoleNotifier, TelegramNotifier};
use crate::storage::ReadOnlyStore;
use crate::storage::s3::S3SnapshotStore;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct MonitorRequest {
    /// Log the message instead of sending it, and keep the stored snapshot
    #[serde(default)]
    pub dry_run: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct MonitorResponse {
    /// Whether the run completed
    pub success: bool,

    /// Outcome label (`changed`, `unchanged`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    /// Number of monitored items observed
    pub item_count: usize,

    /// Number of items that changed since the last run
    pub change_count: usize,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl From<&RunOutcome> for MonitorResponse {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            success: true,
            outcome: Some(outcome.label().to_string()),
            item_count: outcome.item_count(),
            change_count: outcome.change_count(),
            error: match outcome {
                RunOutcome::FetchFailed { reason } => Some(reason.clone()),
                _ => None,
            },
            execution_time_ms: 0,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<MonitorRequest>,
) -> std::result::Result<MonitorResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting monitor run: dry_run={}", request.dry_run);

    match run_once(&request).await {
        Ok(outcome) => {
            let mut response = MonitorResponse::from(&outcome);
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Run completed: {} ({} items, {} changes) in {}ms",
                outcome.label(),
                response.item_count,
                response.change_count,
                response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Ok(MonitorResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal run logic.
async fn run_once(request: &MonitorRequest) -> Result<RunOutcome> {
    let store = S3SnapshotStore::from_env().await?;

    let prefix = std::env::var("CONFIG_S3_PREFIX").unwrap_or_else(|_| "config".to_string());
    let config = LambdaConfigLoader::new(store.clone(), &prefix)
        .load_config()
        .await?;
    config.validate()?;

    let run = RunConfig::from_env()?;

    if request.dry_run {
        let store = ReadOnlyStore::new(store);
        pipeline::run_monitor(&config, &run, &store, &ConsoleNotifier).await
    } else {
        let notifier = TelegramNotifier::from_config(&config.notifier, &run)?;
        pipeline::run_monitor(&config, &run, &store, &notifier).await
    }
}
