//! Full-text search over a snapshot's published documents.

mod engine;
mod index;
pub mod tokenizer;

pub use engine::{Field, SearchResult};
pub use index::{DocumentTerms, LabelTerms, SearchIndex};

use crate::{document::Document, utils::date::date_to_utc};
use chrono::{Days, NaiveDate};
use serde::Deserialize;

/// Narrowing applied before scoring.
///
/// Empty lists and `None` bounds do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Keep documents carrying any of these tags (case-insensitive)
    pub tags: Vec<String>,
    /// Keep documents in any of these categories (case-insensitive)
    pub categories: Vec<String>,
    /// Earliest publication date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest publication date, inclusive through the end of that day
    pub to: Option<NaiveDate>,
    pub featured_only: bool,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.categories.is_empty()
            && self.from.is_none()
            && self.to.is_none()
            && !self.featured_only
    }

    pub fn matches(&self, document: &Document) -> bool {
        if self.featured_only && !document.featured {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| document.has_tag(t)) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.iter().any(|c| document.has_category(c)) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = document.date else {
                return false;
            };
            if let Some(from) = self.from
                && date < date_to_utc(from)
            {
                return false;
            }
            if let Some(to) = self.to
                && let Some(next_day) = to.checked_add_days(Days::new(1))
                && date >= date_to_utc(next_day)
            {
                return false;
            }
        }
        true
    }
}
