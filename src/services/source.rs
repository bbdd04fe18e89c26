// src/services/source.rs

//! Page source collaborator.
//!
//! Workers only need "fetch the page and give me the text of its rows", so
//! that is the whole trait. `HttpPageSource` is the real implementation.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ScraperConfig;
use crate::utils::http;

/// Something that can produce the raw row text of the source page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page once and return the concatenated text of its rows.
    async fn fetch_rows(&self) -> Result<String>;
}

/// Fetches the source page over HTTP and extracts row text with a CSS selector.
pub struct HttpPageSource {
    client: Client,
    url: String,
    row_selector: String,
}

impl HttpPageSource {
    /// Build a source from the scraper section of the config.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        // Fail on a bad selector now rather than on every fetch.
        parse_selector(&config.row_selector)?;

        Ok(Self {
            client: http::create_async_client(config)?,
            url: config.source_url.clone(),
            row_selector: config.row_selector.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_rows(&self) -> Result<String> {
        let html = http::fetch_text_async(&self.client, &self.url).await?;
        extract_rows(&html, &self.row_selector)
    }
}

/// Concatenate the text of every element matching `row_selector`.
pub fn extract_rows(html: &str, row_selector: &str) -> Result<String> {
    let selector = parse_selector(row_selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .flat_map(|row| row.text())
        .collect())
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <p>not a row</p>
          <table>
            <tr><td>Автор</td><td>Цитата</td></tr>
            <tr><td>101</td><td>Текст</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_extract_rows_concatenates_row_text() {
        let text = extract_rows(PAGE, "tr").unwrap();
        assert_eq!(text, "АвторЦитата101Текст");
    }

    #[test]
    fn test_extract_rows_no_match_is_empty() {
        assert_eq!(extract_rows(PAGE, "li").unwrap(), "");
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(matches!(
            extract_rows(PAGE, "[[invalid"),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_http_source_rejects_bad_selector() {
        let config = ScraperConfig {
            row_selector: "[[invalid".to_string(),
            ..ScraperConfig::default()
        };
        assert!(HttpPageSource::new(&config).is_err());
    }

    #[test]
    fn test_http_source_uses_configured_url() {
        let config = ScraperConfig {
            source_url: "http://localhost:9/quotes".to_string(),
            ..ScraperConfig::default()
        };
        let source = HttpPageSource::new(&config).unwrap();
        assert_eq!(source.url(), "http://localhost:9/quotes");
    }
}
