//! `[cache]` section configuration.
//!
//! Tunes the memory optimizer: body compression and derived-text caches.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[cache]` section in folio.toml.
///
/// # Example
/// ```toml
/// [cache]
/// compress_threshold = "4KB"
/// html_capacity = 128
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Disable to always recompute derived text.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = defaults::r#true())]
    pub enabled: bool,

    /// Bodies larger than this are kept gzip-compressed (e.g. "1KB", "512B").
    #[serde(default = "defaults::cache::compress_threshold")]
    #[educe(Default = defaults::cache::compress_threshold())]
    pub compress_threshold: String,

    /// Rendered HTML entries kept resident.
    #[serde(default = "defaults::cache::html_capacity")]
    #[educe(Default = defaults::cache::html_capacity())]
    pub html_capacity: usize,

    /// Excerpt entries kept resident.
    #[serde(default = "defaults::cache::excerpt_capacity")]
    #[educe(Default = defaults::cache::excerpt_capacity())]
    pub excerpt_capacity: usize,

    /// Fraction of least-recently-used entries evicted by `compact()`.
    #[serde(default = "defaults::cache::compaction_ratio")]
    #[educe(Default = defaults::cache::compaction_ratio())]
    pub compaction_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::super::FolioConfig;

    #[test]
    fn test_cache_config_defaults() {
        let config: FolioConfig = toml::from_str("").unwrap();

        assert!(config.cache.enabled);
        assert_eq!(config.cache.compress_threshold, "1KB");
        assert_eq!(config.cache.html_capacity, 256);
        assert_eq!(config.cache.excerpt_capacity, 512);
        assert!((config.cache.compaction_ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cache_config_disabled() {
        let config = r#"
            [cache]
            enabled = false
            compress_threshold = "4kb"
        "#;
        let config: FolioConfig = toml::from_str(config).unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.compress_threshold(), 4096);
    }
}
