// src/parse.rs

use scraper::{Html, Selector};
use thiserror::Error;

/// Selector matching the element that carries the job total.
pub const DEFAULT_COUNT_SELECTOR: &str = "span";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid count selector `{0}`")]
    Selector(String),
    #[error("no element matches `{0}`")]
    NoMatch(String),
    #[error("count element is empty")]
    Empty,
    #[error("count token `{0}` is not a number")]
    NotNumeric(String),
}

/// Extracts the job total from a results page.
///
/// The site renders several elements matching the selector; the total is the
/// last of them, so the parser takes the last match in document order.
#[derive(Debug, Clone)]
pub struct CountParser {
    css: String,
    selector: Selector,
}

impl CountParser {
    pub fn new(css: &str) -> Result<Self, ParseError> {
        let selector = Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn parse(&self, html: &[u8]) -> Result<u64, ParseError> {
        let body = String::from_utf8_lossy(html);
        let doc = Html::parse_document(&body);
        let text: String = doc
            .select(&self.selector)
            .last()
            .ok_or_else(|| ParseError::NoMatch(self.css.clone()))?
            .text()
            .collect();
        parse_count_text(&text)
    }
}

impl Default for CountParser {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT_SELECTOR).expect("default count selector should parse")
    }
}

/// `"1,234 jobs"` → 1234. Only the first whitespace-separated token counts.
pub fn parse_count_text(text: &str) -> Result<u64, ParseError> {
    let token = text.split_whitespace().next().ok_or(ParseError::Empty)?;
    token
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| ParseError::NotNumeric(token.to_string()))
}
