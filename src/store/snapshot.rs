//! Immutable, fully built view of the document collection.

use crate::{
    document::{Document, Fingerprint},
    search::{DocumentTerms, SearchIndex},
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::{cmp::Ordering, sync::Arc};

/// Ordering used for every listing: date descending with undated documents
/// last, then slug ascending.
pub fn newest_first(a: &Document, b: &Document) -> Ordering {
    match (a.date, b.date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
}

/// A tag or category with the number of published documents using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub name: Arc<str>,
    pub count: usize,
}

/// Case-insensitive label → published document positions.
#[derive(Debug, Default)]
struct LabelIndex {
    positions: FxHashMap<String, Vec<usize>>,
    counts: Vec<LabelCount>,
}

impl LabelIndex {
    fn build<'a>(published: impl Iterator<Item = (usize, &'a [Arc<str>])>) -> Self {
        // lowercase → (display name of first sighting, positions)
        let mut groups: FxHashMap<String, (Arc<str>, Vec<usize>)> = FxHashMap::default();

        for (position, labels) in published {
            for label in labels {
                let (_, positions) = groups
                    .entry(label.to_lowercase())
                    .or_insert_with(|| (Arc::clone(label), Vec::new()));
                positions.push(position);
            }
        }

        let mut counts: Vec<LabelCount> = groups
            .values()
            .map(|(name, positions)| LabelCount {
                name: Arc::clone(name),
                count: positions.len(),
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Self {
            positions: groups
                .into_iter()
                .map(|(key, (_, positions))| (key, positions))
                .collect(),
            counts,
        }
    }

    fn positions(&self, label: &str) -> &[usize] {
        self.positions
            .get(&label.trim().to_lowercase())
            .map_or(&[], Vec::as_slice)
    }
}

/// Snapshot of the content directory at one point in time.
///
/// Never mutated after [`Snapshot::build`]; a reload builds a new one.
#[derive(Debug)]
pub struct Snapshot {
    /// All documents, drafts included, in [`newest_first`] order.
    documents: Vec<Arc<Document>>,
    by_slug: FxHashMap<Arc<str>, usize>,
    /// Positions of published documents in `documents`
    published: Vec<usize>,
    tags: LabelIndex,
    categories: LabelIndex,
    index: SearchIndex,
    loaded_at: DateTime<Utc>,
    parse_errors: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::build(Vec::new(), 0)
    }
}

impl Snapshot {
    /// Build from documents with unique slugs, in any order.
    pub fn build(mut entries: Vec<(Arc<Document>, DocumentTerms)>, parse_errors: usize) -> Self {
        entries.sort_by(|a, b| newest_first(&a.0, &b.0));

        let documents: Vec<Arc<Document>> = entries.iter().map(|(d, _)| Arc::clone(d)).collect();
        let by_slug = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (Arc::clone(&d.slug), i))
            .collect();
        let published: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_published())
            .map(|(i, _)| i)
            .collect();

        let tags = LabelIndex::build(published.iter().map(|&i| (i, documents[i].tags.as_slice())));
        let categories = LabelIndex::build(
            published
                .iter()
                .map(|&i| (i, documents[i].categories.as_slice())),
        );

        Self {
            index: SearchIndex::build(entries),
            documents,
            by_slug,
            published,
            tags,
            categories,
            loaded_at: Utc::now(),
            parse_errors,
        }
    }

    // ========================================================================
    // Point lookups
    // ========================================================================

    /// Any document by slug, drafts included.
    pub fn get(&self, slug: &str) -> Option<&Arc<Document>> {
        self.by_slug.get(slug).map(|&i| &self.documents[i])
    }

    /// Whether this snapshot holds exactly this version of `slug`.
    pub fn contains_version(&self, slug: &str, fingerprint: &Fingerprint) -> bool {
        self.get(slug).is_some_and(|d| &d.fingerprint == fingerprint)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Every document, drafts included.
    pub fn all(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// Published documents, newest first.
    pub fn published(&self) -> impl Iterator<Item = &Arc<Document>> + '_ {
        self.published.iter().map(|&i| &self.documents[i])
    }

    /// Draft documents, newest first.
    pub fn drafts(&self) -> impl Iterator<Item = &Arc<Document>> + '_ {
        self.documents.iter().filter(|d| d.draft)
    }

    pub fn by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.collect(self.tags.positions(tag))
    }

    pub fn by_category(&self, category: &str) -> Vec<Arc<Document>> {
        self.collect(self.categories.positions(category))
    }

    fn collect(&self, positions: &[usize]) -> Vec<Arc<Document>> {
        positions
            .iter()
            .map(|&i| Arc::clone(&self.documents[i]))
            .collect()
    }

    /// Up to `n` newest published documents.
    pub fn recent(&self, n: usize) -> Vec<Arc<Document>> {
        self.published().take(n).cloned().collect()
    }

    /// Up to `n` newest published featured documents.
    pub fn featured(&self, n: usize) -> Vec<Arc<Document>> {
        self.published().filter(|d| d.featured).take(n).cloned().collect()
    }

    /// Tags sorted by count descending, then name ascending.
    pub fn tag_counts(&self) -> &[LabelCount] {
        &self.tags.counts
    }

    /// Categories sorted by count descending, then name ascending.
    pub fn category_counts(&self) -> &[LabelCount] {
        &self.categories.counts
    }

    pub const fn search_index(&self) -> &SearchIndex {
        &self.index
    }

    // ========================================================================
    // Counts
    // ========================================================================

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn published_count(&self) -> usize {
        self.published.len()
    }

    pub fn draft_count(&self) -> usize {
        self.documents.len() - self.published.len()
    }

    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Files skipped because they failed to parse.
    pub const fn parse_errors(&self) -> usize {
        self.parse_errors
    }

    /// `(uncompressed, resident, compressed document count)` body sizes.
    pub fn body_footprint(&self) -> (usize, usize, usize) {
        self.documents.iter().fold((0, 0, 0), |(full, resident, compressed), d| {
            (
                full + d.body().len(),
                resident + d.body().resident_len(),
                compressed + usize::from(d.body().is_compressed()),
            )
        })
    }
}
