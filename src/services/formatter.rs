// src/services/formatter.rs

//! Message formatting for stock reports.
//!
//! Renders either a full snapshot or a change set as grouped text. Items
//! are split into the primary group (names with the reserved prefix) and
//! everything else; empty groups are left out.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{
    ChangeSet, Config, Direction, Escaping, MessageConfig, Mode, StockSnapshot,
};

/// Display group of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Primary,
    Other,
}

/// Classify an item name by the reserved prefix.
pub fn category(name: &str, primary_prefix: &str) -> Category {
    if name.starts_with(primary_prefix) {
        Category::Primary
    } else {
        Category::Other
    }
}

impl Escaping {
    /// Telegram `parse_mode` matching this escaping, if any.
    pub fn parse_mode(&self) -> Option<&'static str> {
        match self {
            Escaping::Plain => None,
            Escaping::MarkdownV2 => Some("MarkdownV2"),
            Escaping::Html => Some("HTML"),
        }
    }

    /// Escape literal text for the target parse mode.
    pub fn escape(&self, text: &str) -> String {
        match self {
            Escaping::Plain => text.to_string(),
            Escaping::MarkdownV2 => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    if matches!(
                        c,
                        '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-'
                            | '=' | '|' | '{' | '}' | '.' | '!' | '\\'
                    ) {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            }
            Escaping::Html => text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;"),
        }
    }

    /// Escape text and render it bold where the parse mode allows.
    pub fn bold(&self, text: &str) -> String {
        let escaped = self.escape(text);
        match self {
            Escaping::Plain => escaped,
            Escaping::MarkdownV2 => format!("*{escaped}*"),
            Escaping::Html => format!("<b>{escaped}</b>"),
        }
    }
}

/// Renders snapshots, change sets and failure reports as message text.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    messages: MessageConfig,
    primary_prefix: String,
    escaping: Escaping,
}

impl MessageFormatter {
    pub fn new(messages: MessageConfig, primary_prefix: impl Into<String>, escaping: Escaping) -> Self {
        Self {
            messages,
            primary_prefix: primary_prefix.into(),
            escaping,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.message.clone(),
            config.items.primary_prefix.clone(),
            config.notifier.escaping,
        )
    }

    pub fn category(&self, name: &str) -> Category {
        category(name, &self.primary_prefix)
    }

    /// Full list of current stock.
    pub fn full_message(&self, snapshot: &StockSnapshot, mode: Mode, now: DateTime<Utc>) -> String {
        let title = match mode {
            Mode::Realtime => &self.messages.title_realtime,
            Mode::Daily => &self.messages.title_daily,
        };
        let lines = snapshot.iter().map(|(name, count)| {
            let status = if count == 0 {
                &self.messages.unavailable
            } else {
                &self.messages.available
            };
            (name, format!("{name}: {count}（{status}）"))
        });
        self.render(title, lines, now)
    }

    /// Full list annotated as the first collection.
    pub fn first_run_message(
        &self,
        snapshot: &StockSnapshot,
        mode: Mode,
        now: DateTime<Utc>,
    ) -> String {
        format!(
            "{}\n\n{}",
            self.full_message(snapshot, mode, now),
            self.escaping.escape(&self.messages.first_run_note)
        )
    }

    /// Only the items that changed, as `old -> new` with a direction marker.
    pub fn change_message(&self, changes: &ChangeSet, mode: Mode, now: DateTime<Utc>) -> String {
        let title = match mode {
            Mode::Realtime => &self.messages.title_changes_realtime,
            Mode::Daily => &self.messages.title_changes_daily,
        };
        let lines = changes.iter().map(|(name, change)| {
            let arrow = match change.direction() {
                Direction::Increased => &self.messages.increased,
                Direction::Decreased => &self.messages.decreased,
            };
            let old = self.count_text(change.old);
            let new = self.count_text(change.new);
            (name, format!("{name}: {old} -> {new} {arrow}"))
        });
        self.render(title, lines, now)
    }

    /// Diagnostic message for a run that could not read current stock.
    pub fn failure_message(&self, error: &AppError) -> String {
        let text = match error {
            AppError::EmptyResult => self.messages.empty_result.clone(),
            other => self
                .messages
                .fetch_failed
                .replace("{error}", &other.to_string()),
        };
        self.escaping.escape(&text)
    }

    fn count_text(&self, count: Option<u64>) -> String {
        count.map_or_else(|| self.messages.absent.clone(), |c| c.to_string())
    }

    /// Lay out title, grouped lines and the timestamp footer.
    ///
    /// `lines` must already be ordered by name.
    fn render<'a>(
        &self,
        title: &str,
        lines: impl Iterator<Item = (&'a str, String)>,
        now: DateTime<Utc>,
    ) -> String {
        let (primary, other): (Vec<_>, Vec<_>) =
            lines.partition(|(name, _)| self.category(name) == Category::Primary);

        let mut out = vec![self.escaping.bold(title), String::new()];
        for (label, group) in [
            (&self.messages.primary_label, primary),
            (&self.messages.other_label, other),
        ] {
            if group.is_empty() {
                continue;
            }
            out.push(self.escaping.bold(label));
            out.extend(group.iter().map(|(_, line)| self.escaping.escape(line)));
            out.push(String::new());
        }

        let footer = format!(
            "{}{}",
            self.messages.updated_at,
            now.format("%Y-%m-%d %H:%M:%S UTC")
        );
        out.push(self.escaping.escape(&footer));
        out.join("\n")
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
