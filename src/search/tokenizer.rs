//! Text → normalized term stream, shared by indexing and querying.

use compact_str::CompactString;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// A normalized search term. Nearly all fit inline.
pub type Term = CompactString;

/// Tokens shorter than this (in characters) are dropped.
pub const MIN_TERM_LEN: usize = 2;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "this", "that", "these", "those",
];

static STOP_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Split `text` into lowercase alphanumeric terms, dropping stop words and
/// terms shorter than [`MIN_TERM_LEN`]. Order follows the input.
pub fn tokenize(text: &str) -> Vec<Term> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(lowercase)
        .filter(|term| term.chars().count() >= MIN_TERM_LEN && !is_stop_word(term))
        .collect()
}

/// Lowercase without allocating for short words.
fn lowercase(word: &str) -> Term {
    if word.chars().all(|c| !c.is_uppercase()) {
        Term::from(word)
    } else {
        word.chars().flat_map(char::to_lowercase).collect()
    }
}

/// Whether `needle` occurs as a contiguous run inside `haystack`.
pub fn contains_phrase(haystack: &[Term], needle: &[Term]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(Term::as_str).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let terms = tokenize("Hello, World! Rust-lang (2024)");
        assert_eq!(strs(&terms), vec!["hello", "world", "rust", "lang", "2024"]);
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_terms() {
        let terms = tokenize("The state of a Go program is x");
        assert_eq!(strs(&terms), vec!["state", "go", "program"]);
    }

    #[test]
    fn test_tokenize_unicode() {
        let terms = tokenize("Ünïcode Straße");
        assert_eq!(strs(&terms), vec!["ünïcode", "straße"]);
    }

    #[test]
    fn test_tokenize_deterministic() {
        let text = "Same input, same output; always the same.";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ...  ").is_empty());
        assert!(tokenize("the and or").is_empty());
    }

    #[test]
    fn test_contains_phrase() {
        let hay = tokenize("learning rust concurrency patterns");
        assert!(contains_phrase(&hay, &tokenize("rust concurrency")));
        assert!(!contains_phrase(&hay, &tokenize("concurrency rust")));
        assert!(!contains_phrase(&hay, &[]));
    }
}
