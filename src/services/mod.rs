//! Service layer for the stock monitor.
//!
//! This module contains the collaborators of a monitoring run:
//! - Page reading (`PageReader`, `HtmlPageReader`)
//! - Message formatting (`MessageFormatter`)
//! - Notification delivery (`Notifier`, `TelegramNotifier`)

mod formatter;
mod notifier;
mod reader;

pub use formatter::{Category, MessageFormatter, category};
pub use notifier::{ConsoleNotifier, Notifier, TelegramNotifier};
pub use reader::{HtmlPageReader, PageReader, StockSelectors, read_all};
