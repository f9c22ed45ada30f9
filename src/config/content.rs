//! `[content]` section configuration.
//!
//! Controls where documents are loaded from and how derived fields are computed.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// `[content]` section in folio.toml - content directory and parsing rules.
///
/// # Example
/// ```toml
/// [content]
/// dir = "articles"
/// extensions = ["md", "markdown"]
/// thought_word_threshold = 100
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Directory scanned for documents.
    #[serde(default = "defaults::content::dir")]
    #[educe(Default = defaults::content::dir())]
    pub dir: PathBuf,

    /// Recognized file extensions, without the leading dot.
    #[serde(default = "defaults::content::extensions")]
    #[educe(Default = defaults::content::extensions())]
    pub extensions: Vec<String>,

    /// Untitled bodies shorter than this many words are classified as thoughts.
    #[serde(default = "defaults::content::thought_word_threshold")]
    #[educe(Default = defaults::content::thought_word_threshold())]
    pub thought_word_threshold: usize,

    /// Reading speed used for `reading_time_minutes`.
    #[serde(default = "defaults::content::words_per_minute")]
    #[educe(Default = defaults::content::words_per_minute())]
    pub words_per_minute: usize,

    /// Target excerpt length in characters.
    #[serde(default = "defaults::content::excerpt_length")]
    #[educe(Default = defaults::content::excerpt_length())]
    pub excerpt_length: usize,

    /// Abort a reload scan after this many milliseconds (0 disables the limit).
    #[serde(default = "defaults::content::scan_timeout_ms")]
    #[educe(Default = defaults::content::scan_timeout_ms())]
    pub scan_timeout_ms: u64,
}

impl ContentConfig {
    /// Scan timeout, if one is configured.
    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan_timeout_ms > 0).then(|| Duration::from_millis(self.scan_timeout_ms))
    }

    /// Whether `ext` (without dot) is a recognized content extension.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}
