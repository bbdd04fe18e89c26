// src/utils/text.rs

//! Text cleanup helpers.

/// Collapse every whitespace run into a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
