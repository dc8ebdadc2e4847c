//! Utility functions and helpers.

pub mod http;

use std::collections::BTreeMap;

/// Parse a `a=1; b=2` cookie string into a map.
///
/// Segments without `=` are skipped; keys and values are trimmed.
pub fn parse_cookies(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Render cookies as a `Cookie` request header value.
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Split a comma-delimited URL list, dropping blank entries.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract a stock count from text such as `库存：12 件`.
///
/// All decimal digits in the text are concatenated, including full-width
/// ones. Returns `None` when there are no digits or the number does not fit.
pub fn extract_stock_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10),
            _ => None,
        })
        .collect();

    if digits.is_empty() {
        return None;
    }
    match digits.parse() {
        Ok(count) => Some(count),
        Err(e) => {
            log::warn!("Ignoring stock text '{}': {}", text, e);
            None
        }
    }
}
