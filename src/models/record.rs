//! Output records.

use std::fmt;

/// One (label, text) pair recovered from a segmented blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub label: String,
    pub text: String,
}

impl Record {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Pair up tokens at even offsets.
    ///
    /// The last two tokens are never paired: a sequence of `m` tokens yields
    /// `(m - 2) / 2` records.
    pub fn from_tokens(tokens: &[&str]) -> Vec<Self> {
        let usable = tokens.len().saturating_sub(2);
        tokens[..usable]
            .chunks_exact(2)
            .map(|pair| Self::new(pair[0], pair[1]))
            .collect()
    }
}

/// Log line format: `label: text` followed by a blank line.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}\n\n", self.label, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_pair_is_dropped() {
        let records = Record::from_tokens(&["A", "1", "B", "2", "C", "3"]);
        assert_eq!(records, vec![Record::new("A", "1"), Record::new("B", "2")]);
    }

    #[test]
    fn test_record_count_for_odd_lengths() {
        assert_eq!(Record::from_tokens(&["A", "1", "B", "2", "C"]).len(), 1);
        assert_eq!(Record::from_tokens(&["A", "1", "B"]).len(), 0);
        assert_eq!(Record::from_tokens(&["A", "1", "B", "2"]).len(), 1);
    }

    #[test]
    fn test_short_sequences_yield_nothing() {
        assert!(Record::from_tokens(&[]).is_empty());
        assert!(Record::from_tokens(&["only"]).is_empty());
        assert!(Record::from_tokens(&["A", "1"]).is_empty());
    }

    #[test]
    fn test_display_format() {
        let record = Record::new("Title", "body text");
        assert_eq!(record.to_string(), "Title: body text\n\n");
    }
}
