//! Application configuration structures.
//!
//! Everything here is optional in `monitor.toml`; missing sections and
//! fields fall back to the defaults in the `defaults` module, which match
//! the shop pages the monitor was first written for.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior for page fetches
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// How stock cards are located on a listing page
    #[serde(default)]
    pub page: PageConfig,

    /// Item grouping and filtering
    #[serde(default)]
    pub items: ItemsConfig,

    /// Telegram endpoint settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Display strings of outgoing messages
    #[serde(default)]
    pub message: MessageConfig,

    /// Snapshot persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        for (field, selector) in [
            ("page.card_selector", &self.page.card_selector),
            ("page.name_selector", &self.page.name_selector),
            ("page.stock_selector", &self.page.stock_selector),
        ] {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::validation(format!("{field}: {e:?}")))?;
        }
        if self.page.stock_keyword.trim().is_empty() {
            return Err(AppError::validation("page.stock_keyword is empty"));
        }
        if self.items.primary_prefix.is_empty() {
            return Err(AppError::validation("items.primary_prefix is empty"));
        }
        url::Url::parse(&self.notifier.api_base)?;
        if self.storage.state_file.as_os_str().is_empty() {
            return Err(AppError::validation("storage.state_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings for page fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request deadline in seconds
    #[serde(default = "defaults::fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::fetch_timeout(),
        }
    }
}

/// CSS selectors and markers for stock cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Selector for one product card
    #[serde(default = "defaults::card_selector")]
    pub card_selector: String,

    /// Selector (within a card) for the item name
    #[serde(default = "defaults::name_selector")]
    pub name_selector: String,

    /// Selector (within a card) for candidate stock lines
    #[serde(default = "defaults::stock_selector")]
    pub stock_selector: String,

    /// Text a stock line must contain
    #[serde(default = "defaults::stock_keyword")]
    pub stock_keyword: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            card_selector: defaults::card_selector(),
            name_selector: defaults::name_selector(),
            stock_selector: defaults::stock_selector(),
            stock_keyword: defaults::stock_keyword(),
        }
    }
}

/// Item grouping and filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    /// Names starting with this prefix form the primary group
    #[serde(default = "defaults::primary_prefix")]
    pub primary_prefix: String,

    /// Only monitor names with one of these prefixes (empty = all)
    #[serde(default)]
    pub include_prefixes: Vec<String>,

    /// Never monitor names with one of these prefixes
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
}

impl ItemsConfig {
    /// Whether an item name passes the allow-list and deny-list.
    pub fn is_monitored(&self, name: &str) -> bool {
        let included = self.include_prefixes.is_empty()
            || self.include_prefixes.iter().any(|p| name.starts_with(p.as_str()));
        let excluded = self
            .exclude_prefixes
            .iter()
            .any(|p| name.starts_with(p.as_str()));
        included && !excluded
    }
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            primary_prefix: defaults::primary_prefix(),
            include_prefixes: Vec::new(),
            exclude_prefixes: Vec::new(),
        }
    }
}

/// Text escaping applied to outgoing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// Plain text, sent without a parse mode
    #[default]
    Plain,
    /// Telegram MarkdownV2
    MarkdownV2,
    /// Telegram HTML
    Html,
}

/// Telegram endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Bot API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,

    /// Escaping strategy and matching parse mode
    #[serde(default)]
    pub escaping: Escaping,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            timeout_secs: defaults::notify_timeout(),
            escaping: Escaping::default(),
        }
    }
}

/// Display strings used by the message formatter.
///
/// Failure templates support the `{error}` placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    #[serde(default = "defaults::title_realtime")]
    pub title_realtime: String,
    #[serde(default = "defaults::title_daily")]
    pub title_daily: String,
    #[serde(default = "defaults::title_changes_realtime")]
    pub title_changes_realtime: String,
    #[serde(default = "defaults::title_changes_daily")]
    pub title_changes_daily: String,
    #[serde(default = "defaults::primary_label")]
    pub primary_label: String,
    #[serde(default = "defaults::other_label")]
    pub other_label: String,
    #[serde(default = "defaults::available")]
    pub available: String,
    #[serde(default = "defaults::unavailable")]
    pub unavailable: String,
    #[serde(default = "defaults::increased")]
    pub increased: String,
    #[serde(default = "defaults::decreased")]
    pub decreased: String,
    #[serde(default = "defaults::absent")]
    pub absent: String,
    #[serde(default = "defaults::updated_at")]
    pub updated_at: String,
    #[serde(default = "defaults::first_run_note")]
    pub first_run_note: String,
    #[serde(default = "defaults::fetch_failed")]
    pub fetch_failed: String,
    #[serde(default = "defaults::empty_result")]
    pub empty_result: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            title_realtime: defaults::title_realtime(),
            title_daily: defaults::title_daily(),
            title_changes_realtime: defaults::title_changes_realtime(),
            title_changes_daily: defaults::title_changes_daily(),
            primary_label: defaults::primary_label(),
            other_label: defaults::other_label(),
            available: defaults::available(),
            unavailable: defaults::unavailable(),
            increased: defaults::increased(),
            decreased: defaults::decreased(),
            absent: defaults::absent(),
            updated_at: defaults::updated_at(),
            first_run_note: defaults::first_run_note(),
            fetch_failed: defaults::fetch_failed(),
            empty_result: defaults::empty_result(),
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the last observed snapshot
    #[serde(default = "defaults::state_file")]
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: defaults::state_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0".into()
    }
    pub fn fetch_timeout() -> u64 {
        20
    }

    // Page defaults
    pub fn card_selector() -> String {
        "div.card.cartitem".into()
    }
    pub fn name_selector() -> String {
        "h4".into()
    }
    pub fn stock_selector() -> String {
        "p.card-text".into()
    }
    pub fn stock_keyword() -> String {
        "库存".into()
    }

    // Item defaults
    pub fn primary_prefix() -> String {
        "HK".into()
    }

    // Notifier defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn notify_timeout() -> u64 {
        10
    }

    // Message defaults
    pub fn title_realtime() -> String {
        "⏱ IDC 实时库存".into()
    }
    pub fn title_daily() -> String {
        "📊 IDC 每日库存汇总".into()
    }
    pub fn title_changes_realtime() -> String {
        "🔔 IDC 库存变动提醒".into()
    }
    pub fn title_changes_daily() -> String {
        "📊 IDC 库存变动汇总".into()
    }
    pub fn primary_label() -> String {
        "【HK 区（避孕套）】".into()
    }
    pub fn other_label() -> String {
        "【其他区】".into()
    }
    pub fn available() -> String {
        "有货 ✅".into()
    }
    pub fn unavailable() -> String {
        "售罄 ❌".into()
    }
    pub fn increased() -> String {
        "↗️".into()
    }
    pub fn decreased() -> String {
        "↘️".into()
    }
    pub fn absent() -> String {
        "无".into()
    }
    pub fn updated_at() -> String {
        "更新时间：".into()
    }
    pub fn first_run_note() -> String {
        "(首次采集)".into()
    }
    pub fn fetch_failed() -> String {
        "⚠️ 库存监控抓取失败：{error}".into()
    }
    pub fn empty_result() -> String {
        "⚠️ 库存监控没有解析到任何库存，请检查页面结构或脚本。".into()
    }

    // Storage defaults
    pub fn state_file() -> PathBuf {
        PathBuf::from("last_stock.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.crawler.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.page.card_selector = "[[invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [items]
            exclude_prefixes = ["TEST"]

            [notifier]
            escaping = "markdownv2"
            "#,
        )
        .unwrap();

        assert_eq!(config.items.primary_prefix, "HK");
        assert_eq!(config.items.exclude_prefixes, vec!["TEST".to_string()]);
        assert_eq!(config.notifier.escaping, Escaping::MarkdownV2);
        assert_eq!(config.crawler.timeout_secs, 20);
        assert_eq!(config.page.card_selector, "div.card.cartitem");
        assert_eq!(config.storage.state_file, PathBuf::from("last_stock.json"));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/definitely/not/here/monitor.toml");
        assert_eq!(config.crawler.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn item_filter_allow_and_deny_lists() {
        let items = ItemsConfig {
            include_prefixes: vec!["HK".into(), "FR".into()],
            exclude_prefixes: vec!["HK-TEST".into()],
            ..ItemsConfig::default()
        };

        assert!(items.is_monitored("HK-①"));
        assert!(items.is_monitored("FR-②"));
        assert!(!items.is_monitored("CA"));
        assert!(!items.is_monitored("HK-TEST-1"));
        assert!(ItemsConfig::default().is_monitored("anything"));
    }
}
