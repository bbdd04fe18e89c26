//! Service layer for the scraper.
//!
//! - Page fetching behind the `PageSource` trait (`HttpPageSource`)
//! - Record boundary reconstruction (`TextSegmenter`)

mod segmenter;
mod source;

pub use segmenter::TextSegmenter;
pub use source::{HttpPageSource, PageSource, extract_rows};
