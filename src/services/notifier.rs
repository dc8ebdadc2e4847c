// src/services/notifier.rs

//! Notification delivery.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Escaping, NotifierConfig, RunConfig};
use crate::utils::http;

/// Destination for formatted report text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. No retry is attempted.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    escaping: Escaping,
}

impl TelegramNotifier {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        escaping: Escaping,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            escaping,
        }
    }

    /// Build a notifier for the configured endpoint and the run's chat.
    pub fn from_config(config: &NotifierConfig, run: &RunConfig) -> Result<Self> {
        let client = http::create_notify_client(config)?;
        Ok(Self::new(
            client,
            &config.api_base,
            &run.bot_token,
            &run.chat_id,
            config.escaping,
        ))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let mut form = vec![("chat_id", self.chat_id.as_str()), ("text", text)];
        if let Some(mode) = self.escaping.parse_mode() {
            form.push(("parse_mode", mode));
        }

        // Errors are stripped of their URL: it carries the bot token.
        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!(
                "Telegram returned {status}: {}",
                body.trim()
            )));
        }

        log::info!("Message delivered to chat {}", self.chat_id);
        Ok(())
    }
}

/// Prints messages to stdout instead of delivering them.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}
