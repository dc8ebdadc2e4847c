//! Pipeline entry points for monitoring runs.
//!
//! - `calculate_diff`: Compare the current snapshot with the recorded one
//! - `Monitor`: Fetch, compare, persist and notify in one run

pub mod diff;
pub mod monitor;

pub use diff::{DiffOutcome, calculate_diff, compare};
pub use monitor::{Monitor, Notification, RunOutcome, decide, run_monitor};
