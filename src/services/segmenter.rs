// src/services/segmenter.rs

//! Record boundary reconstruction.
//!
//! The source page renders titles and bodies back to back without any
//! whitespace. Boundaries are recovered from two patterns:
//!
//! - a capital letter outside the exempt set (non-Latin capitals by default)
//!   opens a new title, so a separator goes in front of it;
//! - a run of three digits not preceded by a space within the last three
//!   characters is a numeric code and gets wrapped in separators.
//!
//! The scan stops three characters short of the end and appends the final
//! three characters verbatim, even when the last match already emitted some
//! of them. Downstream consumers depend on this exact output.

use std::collections::HashSet;

use crate::models::{Record, SegmenterConfig};

/// Inserts separators at detected record boundaries.
#[derive(Debug, Clone)]
pub struct TextSegmenter {
    separator: char,
    exempt_capitals: HashSet<char>,
}

impl TextSegmenter {
    /// Create a segmenter with an explicit separator and exempt capital set.
    pub fn new(separator: char, exempt_capitals: impl IntoIterator<Item = char>) -> Self {
        Self {
            separator,
            exempt_capitals: exempt_capitals.into_iter().collect(),
        }
    }

    pub fn from_config(config: &SegmenterConfig) -> Self {
        Self::new(config.separator, config.exempt_capitals.chars())
    }

    /// Insert separators into a cleaned blob.
    pub fn segment(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        if n < 3 {
            return text.to_string();
        }

        let sep = self.separator;
        let mut out = String::with_capacity(text.len() + 8);
        let mut k = 0;
        while k < n - 3 {
            let cur = chars[k];
            let next = chars[k + 1];
            let digit_pair = is_digit(cur) && is_digit(next);

            if self.opens_title(next) || (digit_pair && !spaced_before(&chars, k)) {
                if digit_pair && is_digit(chars[k + 2]) {
                    out.push(sep);
                    out.extend(&chars[k..k + 3]);
                    out.push(sep);
                    k += 3;
                } else {
                    out.push(cur);
                    out.push(sep);
                    out.push(next);
                    k += 2;
                }
            } else {
                out.push(cur);
                k += 1;
            }
        }

        out.extend(&chars[n - 3..]);
        out
    }

    /// Split a segmented blob back into tokens.
    pub fn split<'a>(&self, segmented: &'a str) -> Vec<&'a str> {
        segmented.split(self.separator).collect()
    }

    /// Split a segmented blob and pair its tokens into records.
    pub fn records(&self, segmented: &str) -> Vec<Record> {
        Record::from_tokens(&self.split(segmented))
    }

    fn opens_title(&self, c: char) -> bool {
        is_capital_letter(c) && !self.exempt_capitals.contains(&c)
    }
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self::from_config(&SegmenterConfig::default())
    }
}

/// Uppercase letters only (general category `Lu`). `char::is_uppercase`
/// also accepts the `Other_Uppercase` symbols below, which are not letters.
fn is_capital_letter(c: char) -> bool {
    const OTHER_UPPERCASE: [(char, char); 5] = [
        ('\u{2160}', '\u{216F}'),
        ('\u{24B6}', '\u{24CF}'),
        ('\u{1F130}', '\u{1F149}'),
        ('\u{1F150}', '\u{1F169}'),
        ('\u{1F170}', '\u{1F189}'),
    ];
    c.is_uppercase()
        && !OTHER_UPPERCASE
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether any of the three characters before `k` is a space.
/// Positions before the start of the text do not count as spaces.
fn spaced_before(chars: &[char], k: usize) -> bool {
    (1..=3).any(|back| k >= back && chars[k - back] == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> TextSegmenter {
        TextSegmenter::default()
    }

    #[test]
    fn test_digit_run_is_wrapped() {
        let out = segmenter().segment("ABCTitleOne123Body");
        assert_eq!(out, "ABCTitleOne_123_Body");
        assert_eq!(segmenter().split(&out), vec!["ABCTitleOne", "123", "Body"]);
    }

    #[test]
    fn test_non_exempt_latin_capital_opens_title() {
        let exempt = ('A'..='Z').filter(|&c| c != 'T');
        let s = TextSegmenter::new('_', exempt);
        let out = s.segment("ABCTitleOne123Body");
        assert_eq!(out, "ABC_TitleOne_123_Body");
        assert_eq!(s.split(&out), vec!["ABC", "TitleOne", "123", "Body"]);
    }

    #[test]
    fn test_uppercase_symbols_do_not_open_title() {
        // Roman numeral and circled letters are uppercase but not letters.
        assert_eq!(segmenter().segment("abcdⅠxyzw"), "abcdⅠxyzw");
        assert_eq!(segmenter().segment("abcdⒶxyzw"), "abcdⒶxyzw");
        assert_eq!(segmenter().segment("abcdЖxyzw"), "abcd_Жxyzw");
    }

    #[test]
    fn test_segment_is_deterministic() {
        let s = segmenter();
        let input = "Первыйтекст101ВтораяЦитата202Ещё";
        assert_eq!(s.segment(input), s.segment(input));
    }

    #[test]
    fn test_non_latin_capital_opens_title() {
        let out = segmenter().segment("ABCtitleЦитатаone");
        assert_eq!(out, "ABCtitle_Цитатаone");
    }

    #[test]
    fn test_latin_capitals_are_exempt_by_default() {
        assert_eq!(segmenter().segment("helloWorldAgain"), "helloWorldAgain");
    }

    #[test]
    fn test_custom_exempt_set() {
        let s = TextSegmenter::new('|', "ABC".chars());
        assert_eq!(s.segment("abcDefgh"), "abc|Defgh");
        assert_eq!(s.segment("abcBefgh"), "abcBefgh");
    }

    #[test]
    fn test_digits_after_space_are_left_alone() {
        assert_eq!(segmenter().segment("ab 123xyz"), "ab 123xyz");
        // The lookback only spans three characters.
        assert_eq!(segmenter().segment("a 12345xyz"), "a 1234_5xyz");
    }

    #[test]
    fn test_two_digit_run_is_split_between_digits() {
        // A digit pair not followed by a third digit splits after the first.
        assert_eq!(segmenter().segment("abcd12xyzw"), "abcd1_2xyzw");
    }

    #[test]
    fn test_leading_digits_do_not_look_before_start() {
        assert_eq!(segmenter().segment("123Quote"), "_123_Quote");
    }

    #[test]
    fn test_trailing_three_pass_through_verbatim() {
        // The match ending at n-2 and the verbatim tail overlap.
        assert_eq!(segmenter().segment("abcdef123x"), "abcdef_123_23x");
        // Nothing in the last three characters is inspected.
        assert_eq!(segmenter().segment("abcd999"), "abcd999");
    }

    #[test]
    fn test_short_input_is_unchanged() {
        assert_eq!(segmenter().segment(""), "");
        assert_eq!(segmenter().segment("ab"), "ab");
        assert_eq!(segmenter().segment("abc"), "abc");
    }

    #[test]
    fn test_records_from_segmented_blob() {
        let s = segmenter();
        let out = s.segment("Автор101ЦитатаОдин202Цитата2Два303Хвост");
        assert_eq!(out, "Автор_101_Цитата_Один_202_Цитата2_Два_303_Хвост");

        let records = s.records(&out);
        assert_eq!(
            records,
            vec![
                Record::new("Автор", "101"),
                Record::new("Цитата", "Один"),
                Record::new("202", "Цитата2"),
            ]
        );
    }
}
