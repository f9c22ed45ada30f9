//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "articles".into()
    }

    pub fn extensions() -> Vec<String> {
        ["md", "markdown", "mdown", "mkd"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn thought_word_threshold() -> usize {
        100
    }

    pub fn words_per_minute() -> usize {
        200
    }

    pub fn excerpt_length() -> usize {
        160
    }

    pub fn scan_timeout_ms() -> u64 {
        0
    }
}

// ============================================================================
// [search] Section Defaults
// ============================================================================

pub mod search {
    pub fn default_limit() -> usize {
        20
    }

    pub fn suggestion_limit() -> usize {
        10
    }
}

// ============================================================================
// [cache] Section Defaults
// ============================================================================

pub mod cache {
    pub fn compress_threshold() -> String {
        "1KB".into()
    }

    pub fn html_capacity() -> usize {
        256
    }

    pub fn excerpt_capacity() -> usize {
        512
    }

    pub fn compaction_ratio() -> f64 {
        0.25
    }
}
