// src/pipeline/monitor.rs

//! Stock monitoring run.
//!
//! One run reads the monitored pages, compares them with the recorded
//! snapshot, records the new observation and notifies according to the
//! run policy:
//!
//! ```text
//! FETCH ──fail/empty──▶ FAILED (diagnostic message, store untouched)
//!   │
//!   ▼
//! COMPARE ──no previous──▶ save + full message (first collection)
//!   │
//!   ▼
//! PERSIST (always) ──▶ NOTIFY ──▶ DONE
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{ChangeSet, Config, ItemsConfig, RunConfig, RunPolicy, StockSnapshot};
use crate::pipeline::diff::{DiffOutcome, calculate_diff};
use crate::services::{
    HtmlPageReader, MessageFormatter, Notifier, PageReader, StockSelectors, read_all,
};
use crate::storage::SnapshotStore;
use crate::utils::http;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Current stock could not be read; a diagnostic was sent
    FetchFailed { reason: String },
    /// No previous snapshot; the full list was sent
    FirstObservation { items: usize },
    /// Nothing changed since the previous run
    Unchanged { items: usize, notified: bool },
    /// At least one item changed
    Changed {
        items: usize,
        changes: usize,
        notified: bool,
    },
}

impl RunOutcome {
    /// Short machine-friendly name.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::FetchFailed { .. } => "fetch_failed",
            RunOutcome::FirstObservation { .. } => "first_observation",
            RunOutcome::Unchanged { .. } => "unchanged",
            RunOutcome::Changed { .. } => "changed",
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            RunOutcome::FetchFailed { .. } => 0,
            RunOutcome::FirstObservation { items }
            | RunOutcome::Unchanged { items, .. }
            | RunOutcome::Changed { items, .. } => *items,
        }
    }

    pub fn change_count(&self) -> usize {
        match self {
            RunOutcome::Changed { changes, .. } => *changes,
            _ => 0,
        }
    }
}

/// Which message a compared run sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Nothing,
    FullSnapshot,
    ChangesOnly,
}

/// Notification decision for a run that had a previous snapshot.
pub fn decide(changes: &ChangeSet, policy: &RunPolicy) -> Notification {
    match (changes.has_changes(), policy.only_on_change) {
        (false, true) => Notification::Nothing,
        (true, true) => Notification::ChangesOnly,
        (_, false) => Notification::FullSnapshot,
    }
}

/// Runs one fetch → compare → persist → notify cycle.
pub struct Monitor<'a> {
    reader: &'a dyn PageReader,
    store: &'a dyn SnapshotStore,
    notifier: &'a dyn Notifier,
    formatter: &'a MessageFormatter,
    items: &'a ItemsConfig,
}

impl<'a> Monitor<'a> {
    pub fn new(
        reader: &'a dyn PageReader,
        store: &'a dyn SnapshotStore,
        notifier: &'a dyn Notifier,
        formatter: &'a MessageFormatter,
        items: &'a ItemsConfig,
    ) -> Self {
        Self {
            reader,
            store,
            notifier,
            formatter,
            items,
        }
    }

    /// Run once with the settings from the environment.
    pub async fn run(&self, run: &RunConfig) -> Result<RunOutcome> {
        self.run_at(&run.urls, &run.cookies, &run.policy, Utc::now())
            .await
    }

    /// Run once, stamping messages with `now`.
    ///
    /// Only notification and store-write failures are returned as errors.
    pub async fn run_at(
        &self,
        urls: &[String],
        cookies: &BTreeMap<String, String>,
        policy: &RunPolicy,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome> {
        let current = match self.fetch(urls, cookies).await {
            Ok(current) => current,
            Err(e) if e.is_fetch_failure() => {
                log::error!("Stock fetch failed: {}", e);
                self.notifier
                    .send(&self.formatter.failure_message(&e))
                    .await?;
                return Ok(RunOutcome::FetchFailed {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        let items = current.len();

        let previous = self.store.load().await;
        let changes = match calculate_diff(previous.as_ref(), &current) {
            DiffOutcome::FirstObservation => {
                self.store.save(&current).await?;
                log::info!("First run, sending full stock ({} items)", items);
                let text = self.formatter.first_run_message(&current, policy.mode, now);
                self.notifier.send(&text).await?;
                return Ok(RunOutcome::FirstObservation { items });
            }
            DiffOutcome::Compared(changes) => changes,
        };

        // Recorded before notifying so the baseline never depends on delivery.
        self.store.save(&current).await?;

        let decision = decide(&changes, policy);
        if changes.has_changes() {
            log::info!(
                "Stock changed: {} added, {} updated, {} removed",
                changes.added().len(),
                changes.updated().len(),
                changes.removed().len()
            );
        } else {
            log::info!("No stock changes");
        }

        let text = match decision {
            Notification::Nothing => None,
            Notification::FullSnapshot => {
                Some(self.formatter.full_message(&current, policy.mode, now))
            }
            Notification::ChangesOnly => {
                Some(self.formatter.change_message(&changes, policy.mode, now))
            }
        };
        let notified = match text {
            Some(text) => {
                self.notifier.send(&text).await?;
                true
            }
            None => false,
        };

        Ok(if changes.has_changes() {
            RunOutcome::Changed {
                items,
                changes: changes.change_count(),
                notified,
            }
        } else {
            RunOutcome::Unchanged { items, notified }
        })
    }

    /// Read and merge all pages, keeping only monitored items.
    async fn fetch(
        &self,
        urls: &[String],
        cookies: &BTreeMap<String, String>,
    ) -> Result<StockSnapshot> {
        let mut current = read_all(self.reader, urls, cookies).await?;
        let total = current.len();
        current.retain(|name| self.items.is_monitored(name));
        if current.len() < total {
            log::debug!("Filtered out {} items", total - current.len());
        }

        if current.is_empty() {
            return Err(AppError::EmptyResult);
        }
        log::info!(
            "Fetched {} items ({} in stock)",
            current.len(),
            current.available_count()
        );
        Ok(current)
    }
}

/// Run one monitoring cycle against the configured pages.
pub async fn run_monitor(
    config: &Config,
    run: &RunConfig,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
) -> Result<RunOutcome> {
    log::info!(
        "Monitoring {} page(s), mode={}, only_on_change={}",
        run.urls.len(),
        run.policy.mode,
        run.policy.only_on_change
    );

    let client = http::create_page_client(&config.crawler)?;
    let reader = HtmlPageReader::new(client, StockSelectors::from_config(&config.page)?);
    let formatter = MessageFormatter::from_config(config);

    let outcome = Monitor::new(&reader, store, notifier, &formatter, &config.items)
        .run(run)
        .await?;
    log::info!("Run finished: {}", outcome.label());
    Ok(outcome)
}
