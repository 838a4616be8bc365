//! Counting primitives over markup-bearing content.
//!
//! # Invariants
//! - Markup tags are removed before any word or sentence is counted.
//! - Functions here never fail; empty input yields zero counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence break regex"));
static HEADING_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h[2-6][^>]*>").expect("valid heading tag regex"));

/// Word, sentence and character counts of one content string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    /// Characters of the markup-free text, whitespace included.
    pub char_count: usize,
    /// Characters inside words only.
    pub word_chars: usize,
}

impl TextMetrics {
    /// Measures `content` after stripping markup.
    pub fn measure(content: &str) -> Self {
        let text = strip_markup(content);

        let (word_count, word_chars) = text
            .split_whitespace()
            .fold((0, 0), |(words, chars), word| {
                (words + 1, chars + word.chars().count())
            });
        let sentence_count = SENTENCE_BREAK_RE
            .split(&text)
            .filter(|sentence| !sentence.trim().is_empty())
            .count();

        Self {
            word_count,
            sentence_count,
            char_count: text.chars().count(),
            word_chars,
        }
    }
}

/// Removes every `<...>` tag. Tags are deleted, not replaced by whitespace.
pub fn strip_markup(content: &str) -> Cow<'_, str> {
    MARKUP_TAG_RE.replace_all(content, "")
}

/// Counts opening heading tags of levels 2 to 6.
pub fn count_heading_tags(content: &str) -> usize {
    HEADING_TAG_RE.find_iter(content).count()
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
///
/// Both sides are expected to be case-folded already. An empty needle has no
/// occurrences.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
