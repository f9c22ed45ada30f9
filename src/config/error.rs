//! Errors raised while loading or validating `folio.toml`.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// A `folio.toml` section, as named in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Content,
    Search,
    Cache,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::Search => "search",
            Self::Cache => "cache",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed config")]
    Toml(#[from] toml::de::Error),

    /// A field deserialized fine but holds an out-of-range value.
    #[error("[{section}].{field} {reason}")]
    Validation {
        section: Section,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(super) fn invalid(section: Section, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            section,
            field,
            reason: reason.into(),
        }
    }

    /// `(section, field)` of a validation failure.
    pub fn field(&self) -> Option<(Section, &'static str)> {
        match self {
            Self::Validation { section, field, .. } => Some((*section, *field)),
            _ => None,
        }
    }
}
