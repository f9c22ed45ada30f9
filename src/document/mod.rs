//! The document model and its parser.
//!
//! A [`Document`] is immutable once built. Derived text (rendered HTML and
//! excerpts) is not stored on it; ask the memory optimizer instead.

pub mod excerpt;
pub mod frontmatter;
mod parser;
pub mod render;

pub use parser::{DocumentParser, ParseOptions};

use chrono::{DateTime, Utc};
use serde::Serialize;
use smallvec::SmallVec;
use std::{path::PathBuf, sync::Arc};

/// Tag or category list. Most documents carry only a handful.
pub type Labels = SmallVec<[Arc<str>; 4]>;

/// blake3 hash of a document's source bytes.
pub type Fingerprint = blake3::Hash;

/// Maximum length of a title derived from an untitled body.
pub const DISPLAY_TITLE_LENGTH: usize = 60;

/// Kind of document, inferred once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Thought,
    Link,
}

impl ContentType {
    /// Inference rule, first match wins:
    /// link URL → `Link`, title → `Article`, short body → `Thought`, else `Article`.
    pub fn infer(has_link: bool, has_title: bool, word_count: usize, thought_threshold: usize) -> Self {
        if has_link {
            Self::Link
        } else if has_title {
            Self::Article
        } else if word_count < thought_threshold {
            Self::Thought
        } else {
            Self::Article
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Thought => "thought",
            Self::Link => "link",
        }
    }
}

/// Markdown source, either inline or gzip-compressed by the memory optimizer.
#[derive(Debug, Clone)]
pub enum Body {
    Plain(Arc<str>),
    Compressed { bytes: Arc<[u8]>, len: usize },
}

impl Body {
    /// Uncompressed size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(text) => text.len(),
            Self::Compressed { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed { .. })
    }

    /// Bytes actually held in memory.
    pub fn resident_len(&self) -> usize {
        match self {
            Self::Plain(text) => text.len(),
            Self::Compressed { bytes, .. } => bytes.len(),
        }
    }
}

/// One content file, parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    #[serde(skip)]
    pub path: PathBuf,
    pub slug: Arc<str>,
    pub title: Option<Arc<str>>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub tags: Labels,
    pub categories: Labels,
    pub author: Option<Arc<str>>,
    pub draft: bool,
    pub featured: bool,
    pub link_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
    pub(crate) display_title: Arc<str>,
    #[serde(skip)]
    pub(crate) body: Body,
}

impl Document {
    /// The title, or a short label cut from the body for untitled documents.
    pub fn display_title(&self) -> &str {
        &self.display_title
    }

    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Body text if it is held uncompressed.
    pub fn plain_body(&self) -> Option<&str> {
        match &self.body {
            Body::Plain(text) => Some(text),
            Body::Compressed { .. } => None,
        }
    }

    pub const fn is_published(&self) -> bool {
        !self.draft
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| eq_fold(t, tag))
    }

    /// Case-insensitive category membership.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| eq_fold(c, category))
    }
}

/// Compact list view of a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub slug: Arc<str>,
    pub title: Arc<str>,
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub tags: Labels,
    pub reading_time_minutes: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            slug: Arc::clone(&document.slug),
            title: Arc::clone(&document.display_title),
            date: document.date,
            kind: document.kind,
            tags: document.tags.clone(),
            reading_time_minutes: document.reading_time_minutes,
        }
    }
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || (!a.is_ascii() && a.to_lowercase() == b.to_lowercase())
}
