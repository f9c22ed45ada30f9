//! Engine configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[content]` | Content directory, extensions, derivation rules    |
//! | `[search]`  | Default result and suggestion limits               |
//! | `[cache]`   | Body compression and derived-text cache capacities |
//!
//! # Example
//!
//! ```toml
//! [content]
//! dir = "articles"
//! thought_word_threshold = 100
//!
//! [search]
//! default_limit = 20
//!
//! [cache]
//! compress_threshold = "1KB"
//! html_capacity = 256
//! ```

mod cache;
mod content;
pub mod defaults;
mod error;
mod search;

pub use cache::CacheConfig;
pub use content::ContentConfig;
pub use error::{ConfigError, Section};
pub use search::SearchConfig;

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B (bytes), KB (kilobytes), MB (megabytes).
/// Case-insensitive for the suffix.
///
/// # Examples
/// ```ignore
/// parse_size_string("20KB") // → 20480
/// parse_size_string("5MB")  // → 5242880
/// parse_size_string("100B") // → 100
/// parse_size_string("100")  // → 100 (defaults to bytes)
/// ```
fn parse_size_string(s: &str) -> Option<usize> {
    let s = s.trim().to_uppercase();
    let (multiplier, suffix_len) = if s.ends_with("MB") {
        (1024 * 1024, 2)
    } else if s.ends_with("KB") {
        (1024, 2)
    } else if s.ends_with('B') {
        (1, 1)
    } else {
        (1, 0)
    };
    let value: usize = s[..s.len() - suffix_len].trim().parse().ok()?;
    value.checked_mul(multiplier)
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Path of the file this config was loaded from (empty for defaults)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Content directory and document derivation settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Memory optimizer settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl FolioConfig {
    /// Parse configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: FolioConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    ///
    /// A relative `content.dir` is resolved against the config file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();

        if config.content.dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.content.dir = parent.join(&config.content.dir);
        }

        Ok(config)
    }

    /// Override the content directory (e.g. from a command-line flag)
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content.dir = dir.into();
        self
    }

    /// Compression threshold in bytes.
    ///
    /// Unparseable size strings fall back to the default of 1KB;
    /// `validate()` reports them.
    pub fn compress_threshold(&self) -> usize {
        parse_size_string(&self.cache.compress_threshold).unwrap_or(1024)
    }

    /// Validate value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let content = &self.content;

        if content.extensions.is_empty() {
            return Err(ConfigError::invalid(
                Section::Content,
                "extensions",
                "must list at least one extension",
            ));
        }
        if content.words_per_minute == 0 {
            return Err(ConfigError::invalid(
                Section::Content,
                "words_per_minute",
                "must be greater than 0",
            ));
        }
        if content.excerpt_length < 20 {
            return Err(ConfigError::invalid(
                Section::Content,
                "excerpt_length",
                format!("must be at least 20, got {}", content.excerpt_length),
            ));
        }
        if self.search.suggestion_limit == 0 {
            return Err(ConfigError::invalid(
                Section::Search,
                "suggestion_limit",
                "must be greater than 0",
            ));
        }
        if parse_size_string(&self.cache.compress_threshold).is_none() {
            return Err(ConfigError::invalid(
                Section::Cache,
                "compress_threshold",
                format!("is not a size: `{}`", self.cache.compress_threshold),
            ));
        }
        let ratio = self.cache.compaction_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::invalid(
                Section::Cache,
                "compaction_ratio",
                format!("must be in (0, 1], got {ratio}"),
            ));
        }

        Ok(())
    }
}
