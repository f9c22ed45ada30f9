//! Memory optimizer.
//!
//! Sits between the parser and the store and keeps the resident footprint
//! small without changing any observable query result:
//!
//! - tags, categories and authors are interned ([`Interner`])
//! - bodies above a size threshold are kept gzip-compressed
//! - rendered HTML and excerpts live in bounded LRU caches keyed by
//!   `(slug, fingerprint)`, so an edited document never hits a stale entry
//!
//! Every failure here degrades to recomputation; nothing is propagated to
//! the caller.

mod cache;
mod compress;
mod intern;

pub use cache::BoundedCache;
pub use intern::Interner;

use crate::{
    config::FolioConfig,
    document::{Body, Document, Fingerprint, Labels, excerpt, render},
    log,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::{
    borrow::Cow,
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Derived-text cache key: a document version.
pub type CacheKey = (Arc<str>, Fingerprint);

type TextCache = BoundedCache<CacheKey, Arc<str>>;

/// Counters and sizes reported by [`MemoryOptimizer::stats`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizerStats {
    pub enabled: bool,
    pub interned_strings: usize,
    pub html_entries: usize,
    pub html_capacity: usize,
    pub excerpt_entries: usize,
    pub excerpt_capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub decompress_failures: u64,
    pub last_compaction: Option<DateTime<Utc>>,
}

/// Outcome of one [`MemoryOptimizer::compact`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    pub html_evicted: usize,
    pub excerpts_evicted: usize,
    pub strings_purged: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    decompress_failures: AtomicU64,
}

#[derive(Debug)]
pub struct MemoryOptimizer {
    enabled: bool,
    compress_threshold: usize,
    excerpt_length: usize,
    compaction_ratio: f64,
    interner: Interner,
    html: Option<TextCache>,
    excerpts: Option<TextCache>,
    counters: Counters,
    last_compaction: RwLock<Option<DateTime<Utc>>>,
}

impl Default for MemoryOptimizer {
    fn default() -> Self {
        Self::new(&FolioConfig::default())
    }
}

impl MemoryOptimizer {
    pub fn new(config: &FolioConfig) -> Self {
        let cache = &config.cache;
        let bounded = |capacity: usize| {
            NonZeroUsize::new(capacity)
                .filter(|_| cache.enabled)
                .map(BoundedCache::new)
        };

        Self {
            enabled: cache.enabled,
            compress_threshold: config.compress_threshold(),
            excerpt_length: config.content.excerpt_length,
            compaction_ratio: cache.compaction_ratio,
            interner: Interner::new(),
            html: bounded(cache.html_capacity),
            excerpts: bounded(cache.excerpt_capacity),
            counters: Counters::default(),
            last_compaction: RwLock::new(None),
        }
    }

    // ========================================================================
    // Load-time optimization
    // ========================================================================

    /// Intern labels and compress a large body. Call once per parsed document,
    /// after it has been indexed for search.
    pub fn optimize(&self, mut document: Document) -> Document {
        if !self.enabled {
            return document;
        }

        document.tags = self.intern_labels(&document.tags);
        document.categories = self.intern_labels(&document.categories);
        document.author = document.author.map(|a| self.interner.intern(&a));

        if let Body::Plain(text) = &document.body
            && text.len() > self.compress_threshold
        {
            match compress::compress(text) {
                Ok(Some(bytes)) => {
                    document.body = Body::Compressed {
                        bytes: Arc::from(bytes),
                        len: text.len(),
                    };
                }
                Ok(None) => {}
                Err(err) => log!("cache"; "keeping `{}` uncompressed: {err}", document.slug),
            }
        }

        document
    }

    fn intern_labels(&self, labels: &Labels) -> Labels {
        labels.iter().map(|l| self.interner.intern(l)).collect()
    }

    // ========================================================================
    // Derived text
    // ========================================================================

    /// The document's Markdown source.
    ///
    /// A body that fails to decompress yields empty text and a warning.
    pub fn body<'a>(&self, document: &'a Document) -> Cow<'a, str> {
        self.source(document).unwrap_or(Cow::Borrowed(""))
    }

    fn source<'a>(&self, document: &'a Document) -> Option<Cow<'a, str>> {
        match &document.body {
            Body::Plain(text) => Some(Cow::Borrowed(text)),
            Body::Compressed { bytes, len } => match compress::decompress(bytes, *len) {
                Ok(text) => Some(Cow::Owned(text)),
                Err(err) => {
                    self.counters
                        .decompress_failures
                        .fetch_add(1, Ordering::Relaxed);
                    log!("cache"; "cannot decompress body of `{}`: {err}", document.slug);
                    None
                }
            },
        }
    }

    /// Rendered HTML of the document body.
    pub fn rendered_html(&self, document: &Document) -> Arc<str> {
        self.derived(self.html.as_ref(), document, |body| {
            render::render_html(body, document.title.as_deref())
        })
    }

    /// Plain-text excerpt of the document body.
    pub fn excerpt(&self, document: &Document) -> Arc<str> {
        self.derived(self.excerpts.as_ref(), document, |body| {
            excerpt::generate(body, self.excerpt_length)
        })
    }

    fn derived(
        &self,
        cache: Option<&TextCache>,
        document: &Document,
        compute: impl FnOnce(&str) -> String,
    ) -> Arc<str> {
        let key: CacheKey = (Arc::clone(&document.slug), document.fingerprint);

        if let Some(cache) = cache
            && let Some(hit) = cache.get(&key)
        {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let Some(body) = self.source(document) else {
            // Degraded output is never cached
            return Arc::from(compute(""));
        };
        let value: Arc<str> = Arc::from(compute(&body));
        if let Some(cache) = cache {
            cache.insert(key, Arc::clone(&value));
        }
        value
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Evict the configured fraction of least recently used derived entries
    /// and drop interned strings no document references.
    pub fn compact(&self) -> CompactionReport {
        let ratio = self.compaction_ratio;
        let report = CompactionReport {
            html_evicted: self.html.as_ref().map_or(0, |c| c.compact(ratio)),
            excerpts_evicted: self.excerpts.as_ref().map_or(0, |c| c.compact(ratio)),
            strings_purged: self.interner.purge_unused(),
        };
        *self.last_compaction.write() = Some(Utc::now());

        log!(
            "cache";
            "compacted: {} html, {} excerpts, {} strings",
            report.html_evicted,
            report.excerpts_evicted,
            report.strings_purged
        );
        report
    }

    /// Drop cache entries for document versions `is_live` rejects.
    ///
    /// Called after a new snapshot is published.
    pub fn prune(&self, is_live: impl Fn(&CacheKey) -> bool) -> usize {
        let removed = self.html.as_ref().map_or(0, |c| c.retain(&is_live))
            + self.excerpts.as_ref().map_or(0, |c| c.retain(&is_live));
        self.interner.purge_unused();
        removed
    }

    pub fn stats(&self) -> OptimizerStats {
        OptimizerStats {
            enabled: self.enabled,
            interned_strings: self.interner.len(),
            html_entries: self.html.as_ref().map_or(0, BoundedCache::len),
            html_capacity: self.html.as_ref().map_or(0, BoundedCache::capacity),
            excerpt_entries: self.excerpts.as_ref().map_or(0, BoundedCache::len),
            excerpt_capacity: self.excerpts.as_ref().map_or(0, BoundedCache::capacity),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            decompress_failures: self.counters.decompress_failures.load(Ordering::Relaxed),
            last_compaction: *self.last_compaction.read(),
        }
    }
}
