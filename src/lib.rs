//! Folio - an in-memory content engine for Markdown blogs.
//!
//! Turns a directory of Markdown files with YAML front matter into a
//! queryable, searchable document store that can be reloaded while it is
//! being read.
//!
//! ```text
//! filesystem → DocumentParser → MemoryOptimizer → Snapshot (ArcSwap)
//!                                                     │
//!                    ContentService ◀── SearchIndex ◀─┘
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod logger;
pub mod memory;
pub mod search;
pub mod service;
pub mod store;
pub mod utils;

pub use config::FolioConfig;
pub use document::{ContentType, Document, DocumentSummary};
pub use error::{ContentError, ParseError, ParseErrorKind};
pub use search::{Field, SearchFilters, SearchResult};
pub use service::ContentService;
pub use store::{ContentStore, LabelCount, LoadReport, Snapshot, Stats};
