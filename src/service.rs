//! Read API consumed by request handlers and feed generators.
//!
//! Everything here is a thin view over [`ContentStore`]. Public listings never
//! include drafts; drafts are reachable only through the `*draft*` accessors.

use crate::{
    config::{FolioConfig, SearchConfig},
    document::Document,
    error::ContentError,
    memory::CompactionReport,
    search::{SearchFilters, SearchResult},
    store::{ContentStore, LabelCount, LoadReport, Stats},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug)]
pub struct ContentService {
    store: ContentStore,
    search: SearchConfig,
}

impl ContentService {
    /// Open the configured content directory and publish the first snapshot.
    pub fn open(config: &FolioConfig) -> Result<Self, ContentError> {
        Ok(Self::with_store(ContentStore::open(config)?, config.search.clone()))
    }

    pub fn with_store(store: ContentStore, search: SearchConfig) -> Self {
        Self { store, search }
    }

    pub const fn store(&self) -> &ContentStore {
        &self.store
    }

    pub const fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    // ========================================================================
    // Articles
    // ========================================================================

    /// Published document by slug. Drafts are reported as not found.
    pub fn get_article_by_slug(&self, slug: &str) -> Result<Arc<Document>, ContentError> {
        self.store
            .get(slug)
            .filter(|d| d.is_published())
            .ok_or_else(|| ContentError::not_found(slug))
    }

    /// Published documents, newest first.
    pub fn get_all_articles(&self) -> Vec<Arc<Document>> {
        self.store.all()
    }

    pub fn get_articles_by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.store.by_tag(tag)
    }

    pub fn get_articles_by_category(&self, category: &str) -> Vec<Arc<Document>> {
        self.store.by_category(category)
    }

    pub fn get_featured_articles(&self, n: usize) -> Vec<Arc<Document>> {
        self.store.featured(n)
    }

    pub fn get_recent_articles(&self, n: usize) -> Vec<Arc<Document>> {
        self.store.recent(n)
    }

    /// Documents for RSS/JSON feeds: the `n` newest published.
    pub fn get_articles_for_feed(&self, n: usize) -> Vec<Arc<Document>> {
        self.store.recent(n)
    }

    /// Rendered HTML body, cached per document version.
    pub fn rendered_html(&self, document: &Document) -> Arc<str> {
        self.store.optimizer().rendered_html(document)
    }

    /// Plain-text summary, cached per document version.
    pub fn excerpt(&self, document: &Document) -> Arc<str> {
        self.store.optimizer().excerpt(document)
    }

    // ========================================================================
    // Tags and categories
    // ========================================================================

    /// Distinct tags of published documents, alphabetical.
    pub fn get_all_tags(&self) -> Vec<Arc<str>> {
        alphabetical(self.store.tag_counts())
    }

    /// Distinct categories of published documents, alphabetical.
    pub fn get_all_categories(&self) -> Vec<Arc<str>> {
        alphabetical(self.store.category_counts())
    }

    pub fn get_tag_counts(&self) -> Vec<LabelCount> {
        self.store.tag_counts()
    }

    pub fn get_category_counts(&self) -> Vec<LabelCount> {
        self.store.category_counts()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Ranked full-text search. A `limit` of 0 returns every match.
    pub fn search_articles(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.store.current().search_index().search(query, limit)
    }

    pub fn search_in_title(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.store.current().search_index().search_in_title(query, limit)
    }

    pub fn search_with_filters(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Vec<SearchResult> {
        self.store
            .current()
            .search_index()
            .search_with_filters(query, filters, limit)
    }

    pub fn get_search_suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        self.store.current().search_index().suggestions(prefix, limit)
    }

    // ========================================================================
    // Drafts
    // ========================================================================

    pub fn get_draft_articles(&self) -> Vec<Arc<Document>> {
        self.store.drafts()
    }

    /// Draft by slug. Published documents are reported as not found.
    pub fn get_draft_by_slug(&self, slug: &str) -> Result<Arc<Document>, ContentError> {
        self.store
            .get(slug)
            .filter(|d| d.draft)
            .ok_or_else(|| ContentError::not_found(slug))
    }

    /// Clear the draft flag on disk and reload.
    pub fn publish_draft(&self, slug: &str) -> Result<Arc<Document>, ContentError> {
        self.store.set_draft(slug, false)
    }

    /// Set the draft flag on disk and reload.
    pub fn unpublish_article(&self, slug: &str) -> Result<Arc<Document>, ContentError> {
        self.store.set_draft(slug, true)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    pub fn get_stats(&self) -> Stats {
        self.store.stats()
    }

    pub fn reload_articles(&self) -> Result<LoadReport, ContentError> {
        self.store.reload()
    }

    pub fn get_last_reload_time(&self) -> DateTime<Utc> {
        self.store.last_reload()
    }

    pub fn compact_memory(&self) -> CompactionReport {
        self.store.optimizer().compact()
    }
}

fn alphabetical(counts: Vec<LabelCount>) -> Vec<Arc<str>> {
    let mut names: Vec<Arc<str>> = counts.into_iter().map(|c| c.name).collect();
    names.sort_by_cached_key(|name| name.to_lowercase());
    names
}
