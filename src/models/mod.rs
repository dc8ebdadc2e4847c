// src/models/mod.rs

//! Domain models for the stock monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod run;
mod snapshot;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, Escaping, ItemsConfig, MessageConfig, NotifierConfig, PageConfig,
    StorageConfig,
};
pub use run::{Mode, RunConfig, RunPolicy};
pub use snapshot::{Change, ChangeKind, ChangeSet, Direction, StockSnapshot};
