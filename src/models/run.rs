//! Per-run settings sourced from the environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::utils::{parse_cookies, split_urls};

/// Title flavour of outgoing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Realtime,
    Daily,
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "realtime" => Ok(Mode::Realtime),
            "daily" => Ok(Mode::Daily),
            other => Err(AppError::config(format!(
                "MODE must be 'realtime' or 'daily', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Realtime => write!(f, "realtime"),
            Mode::Daily => write!(f, "daily"),
        }
    }
}

/// Notification policy for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunPolicy {
    pub mode: Mode,
    /// Send only deltas, and only when something changed
    pub only_on_change: bool,
}

/// Everything a single monitoring run needs from its environment.
#[derive(Clone)]
pub struct RunConfig {
    /// Pages to read, in merge order
    pub urls: Vec<String>,
    pub cookies: BTreeMap<String, String>,
    pub bot_token: String,
    pub chat_id: String,
    pub policy: RunPolicy,
    /// Overrides `storage.state_file` from the config file
    pub state_file: Option<PathBuf>,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("urls", &self.urls)
            .field("cookies", &format_args!("<{} cookies>", self.cookies.len()))
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("policy", &self.policy)
            .field("state_file", &self.state_file)
            .finish()
    }
}

impl RunConfig {
    /// Build the run configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the run configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("{key} is not set")))
        };

        let urls = split_urls(&required("TARGET_URL")?);
        if urls.is_empty() {
            return Err(AppError::config("TARGET_URL contains no URLs"));
        }
        for url in &urls {
            url::Url::parse(url)
                .map_err(|e| AppError::config(format!("TARGET_URL entry '{url}': {e}")))?;
        }

        let cookies = parse_cookies(&lookup("COOKIE").unwrap_or_default());
        let bot_token = required("BOT_TOKEN")?;
        let chat_id = required("CHAT_ID")?;

        let mode = match lookup("MODE") {
            Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|e| {
                log::warn!("{e}; falling back to realtime");
                Mode::Realtime
            }),
            _ => Mode::default(),
        };
        let only_on_change = lookup("ONLY_ON_CHANGE")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let state_file = lookup("STATE_FILE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            urls,
            cookies,
            bot_token,
            chat_id,
            policy: RunPolicy {
                mode,
                only_on_change,
            },
            state_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TARGET_URL", "https://shop.example/a, https://shop.example/b,"),
            ("BOT_TOKEN", "123:abc"),
            ("CHAT_ID", "-1001"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_lookup(lookup_from(&base_vars())).unwrap();

        assert_eq!(
            config.urls,
            vec!["https://shop.example/a", "https://shop.example/b"]
        );
        assert!(config.cookies.is_empty());
        assert_eq!(config.policy.mode, Mode::Realtime);
        assert!(!config.policy.only_on_change);
        assert!(config.state_file.is_none());
    }

    #[test]
    fn test_all_variables() {
        let mut vars = base_vars();
        vars.extend([
            ("COOKIE", "session=xyz; theme = dark"),
            ("MODE", "Daily"),
            ("ONLY_ON_CHANGE", "TRUE"),
            ("STATE_FILE", "state/stock.json"),
        ]);
        let config = RunConfig::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.cookies.get("session").map(String::as_str), Some("xyz"));
        assert_eq!(config.cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(config.policy.mode, Mode::Daily);
        assert!(config.policy.only_on_change);
        assert_eq!(config.state_file, Some(PathBuf::from("state/stock.json")));
    }

    #[test]
    fn test_missing_required_variable() {
        let vars: Vec<_> = base_vars()
            .into_iter()
            .filter(|(k, _)| *k != "BOT_TOKEN")
            .collect();
        let err = RunConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_rejects_blank_url_list() {
        let mut vars = base_vars();
        vars[0] = ("TARGET_URL", " , ,");
        assert!(RunConfig::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_rejects_invalid_url() {
        let mut vars = base_vars();
        vars[0] = ("TARGET_URL", "not a url");
        assert!(RunConfig::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_unknown_mode_falls_back_to_realtime() {
        let mut vars = base_vars();
        vars.push(("MODE", "hourly"));
        let config = RunConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.policy.mode, Mode::Realtime);
    }

    #[test]
    fn test_only_on_change_requires_true() {
        let mut vars = base_vars();
        vars.push(("ONLY_ON_CHANGE", "yes"));
        let config = RunConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert!(!config.policy.only_on_change);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = RunConfig::from_lookup(lookup_from(&base_vars())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("123:abc"));
    }
}
