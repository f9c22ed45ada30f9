//! `[search]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[search]` section in folio.toml - result limits used when callers pass none.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Result count for searches without an explicit limit.
    #[serde(default = "defaults::search::default_limit")]
    #[educe(Default = defaults::search::default_limit())]
    pub default_limit: usize,

    /// Maximum number of suggestions returned for a prefix.
    #[serde(default = "defaults::search::suggestion_limit")]
    #[educe(Default = defaults::search::suggestion_limit())]
    pub suggestion_limit: usize,
}

#[cfg(test)]
mod tests {
    use super::super::FolioConfig;

    #[test]
    fn test_search_config() {
        let config = r#"
            [search]
            default_limit = 5
        "#;
        let config: FolioConfig = toml::from_str(config).unwrap();

        assert_eq!(config.search.default_limit, 5);
        assert_eq!(config.search.suggestion_limit, 10);
    }
}
