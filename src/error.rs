//! Error types for loading and querying content.
//!
//! Per-file problems are [`ParseError`]s: they are collected during a load and
//! never abort it. Everything a caller of the query or reload API can observe
//! is a [`ContentError`].

use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// A single file that could not be turned into a document.
#[derive(Debug, Error)]
#[error("{}: {kind}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    #[source]
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(path: impl AsRef<Path>, kind: ParseErrorKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
        }
    }

    pub fn invalid_field(path: impl AsRef<Path>, field: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            path,
            ParseErrorKind::InvalidField {
                field,
                message: message.into(),
            },
        )
    }
}

/// What went wrong while parsing a file.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("unreadable file")]
    Io(#[from] std::io::Error),

    #[error("front matter opened with `---` but never closed")]
    UnterminatedFrontMatter,

    #[error("malformed front matter: {0}")]
    FrontMatter(String),

    #[error("invalid `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("no usable slug could be derived")]
    EmptySlug,
}

/// Errors surfaced by the content store and query facade.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("document not found: {slug}")]
    NotFound { slug: String },

    #[error("a reload is already in progress")]
    Busy,

    #[error("content scan exceeded {0:?}")]
    Timeout(Duration),

    #[error("cannot read content directory `{}`", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid slug: `{0}`")]
    InvalidSlug(String),

    #[error("cannot update front matter of `{}`: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },
}

impl ContentError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_parse_error_names_path() {
        let err = ParseError::new(
            "articles/broken.md",
            ParseErrorKind::UnterminatedFrontMatter,
        );
        let display = err.to_string();
        assert!(display.contains("articles/broken.md"));
        assert!(display.contains("never closed"));
    }

    #[test]
    fn test_invalid_field_display() {
        let err = ParseError::invalid_field("a.md", "date", "expected RFC 3339");
        assert_eq!(err.to_string(), "a.md: invalid `date`: expected RFC 3339");
    }

    #[test]
    fn test_io_source_preserved() {
        let err = ParseError::new(
            "gone.md",
            ParseErrorKind::from(Error::new(ErrorKind::NotFound, "missing")),
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "unreadable file");
    }

    #[test]
    fn test_not_found_helper() {
        let err = ContentError::not_found("hello-world");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "document not found: hello-world");
        assert!(!ContentError::Busy.is_not_found());
    }
}
