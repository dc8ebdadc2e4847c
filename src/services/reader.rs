// src/services/reader.rs

//! Page reader service.
//!
//! Fetches product listing pages and extracts stock counts from the
//! configured card markup.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::COOKIE;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{PageConfig, StockSnapshot};
use crate::utils::{cookie_header, extract_stock_count};

/// Source of stock counts for a single page.
#[async_trait]
pub trait PageReader: Send + Sync {
    /// Read one page and return its `item name -> stock count` mapping.
    async fn read(&self, url: &str, cookies: &BTreeMap<String, String>) -> Result<StockSnapshot>;
}

/// Read every page in order and merge the results.
///
/// A later page overrides an earlier one when both list the same item.
pub async fn read_all(
    reader: &dyn PageReader,
    urls: &[String],
    cookies: &BTreeMap<String, String>,
) -> Result<StockSnapshot> {
    let mut total = StockSnapshot::new();
    for url in urls {
        let part = reader.read(url, cookies).await?;
        log::info!("Read {} items from {}", part.len(), url);
        total.merge(part);
    }
    Ok(total)
}

/// Compiled selectors for stock cards.
#[derive(Debug, Clone)]
pub struct StockSelectors {
    card: Selector,
    name: Selector,
    stock: Selector,
    keyword: String,
}

impl StockSelectors {
    pub fn from_config(config: &PageConfig) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&config.card_selector)?,
            name: parse_selector(&config.name_selector)?,
            stock: parse_selector(&config.stock_selector)?,
            keyword: config.stock_keyword.clone(),
        })
    }

    /// Extract all stock items from a parsed document.
    pub fn extract(&self, document: &Html) -> StockSnapshot {
        let mut snapshot = StockSnapshot::new();
        for card in document.select(&self.card) {
            if let Some((name, count)) = self.parse_card(&card) {
                snapshot.insert(name, count);
            }
        }
        snapshot
    }

    fn parse_card(&self, card: &ElementRef) -> Option<(String, u64)> {
        let name = card
            .select(&self.name)
            .next()
            .map(|el| element_text(&el))
            .filter(|name| !name.is_empty())?;

        let Some(stock_text) = card
            .select(&self.stock)
            .map(|el| element_text(&el))
            .find(|text| text.contains(self.keyword.as_str()))
        else {
            log::debug!("Card '{}' has no stock line", name);
            return None;
        };

        let Some(count) = extract_stock_count(&stock_text) else {
            log::debug!("Card '{}' has no count in '{}'", name, stock_text);
            return None;
        };
        Some((name, count))
    }
}

/// Page reader backed by an HTTP client and HTML parsing.
pub struct HtmlPageReader {
    client: Client,
    selectors: StockSelectors,
}

impl HtmlPageReader {
    pub fn new(client: Client, selectors: StockSelectors) -> Self {
        Self { client, selectors }
    }

    async fn fetch_html(&self, url: &str, cookies: &BTreeMap<String, String>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(header) = cookie_header(cookies) {
            request = request.header(COOKIE, header);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageReader for HtmlPageReader {
    async fn read(&self, url: &str, cookies: &BTreeMap<String, String>) -> Result<StockSnapshot> {
        let html = self
            .fetch_html(url, cookies)
            .await
            .map_err(|e| AppError::fetch(url, e))?;
        let document = Html::parse_document(&html);
        Ok(self.selectors.extract(&document))
    }
}

/// Text content of an element with surrounding whitespace removed.
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
