//! Content store with atomic snapshot reloads.
//!
//! Uses `arc-swap` for lock-free reads and atomic snapshot replacement.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  SNAPSHOT (ArcSwap)                         │
//! │                                                             │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐    │
//! │  │  Reader 1   │     │  Reader 2   │     │   Writer    │    │
//! │  │  (request)  │     │  (request)  │     │  (reload)   │    │
//! │  └──────┬──────┘     └──────┬──────┘     └──────┬──────┘    │
//! │         │                   │                   │           │
//! │         ▼                   ▼                   ▼           │
//! │     current()           current()          reload()         │
//! │    (lock-free)         (lock-free)    (scan, build, swap)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A reader keeps the `Arc<Snapshot>` it loaded for as long as it needs a
//! consistent view. At most one reload runs at a time; a second concurrent
//! request fails fast with [`ContentError::Busy`].

mod draft;
mod loader;
mod snapshot;

pub use loader::LoadOutput;
pub use snapshot::{LabelCount, Snapshot, newest_first};

use crate::{
    config::{ContentConfig, FolioConfig},
    document::{Document, DocumentParser, DocumentSummary},
    error::{ContentError, ParseError},
    log,
    memory::{MemoryOptimizer, OptimizerStats},
};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Tags listed in [`Stats::popular_tags`].
const POPULAR_TAGS: usize = 10;
/// Documents listed in [`Stats::recent_articles`].
const RECENT_ARTICLES: usize = 5;

/// Outcome of a successful reload.
#[derive(Debug)]
pub struct LoadReport {
    pub documents: usize,
    pub published: usize,
    pub drafts: usize,
    /// Content files found, parsed or not
    pub files: usize,
    pub errors: Vec<ParseError>,
    pub elapsed: Duration,
}

/// Aggregate figures over the current snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_articles: usize,
    pub published_count: usize,
    pub draft_count: usize,
    pub total_tags: usize,
    pub total_categories: usize,
    pub popular_tags: Vec<LabelCount>,
    pub recent_articles: Vec<DocumentSummary>,
    pub last_updated: DateTime<Utc>,
    pub parse_errors: usize,
    pub memory: MemoryStats,
}

/// Resident body sizes plus optimizer counters.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub body_bytes: usize,
    pub resident_body_bytes: usize,
    pub compressed_documents: usize,
    pub bytes_saved: usize,
    pub optimizer: OptimizerStats,
}

/// Owns the published [`Snapshot`] of one content directory.
#[derive(Debug)]
pub struct ContentStore {
    dir: PathBuf,
    config: ContentConfig,
    parser: DocumentParser,
    snapshot: ArcSwap<Snapshot>,
    optimizer: MemoryOptimizer,
    /// Serializes reloads and on-disk edits
    reload_lock: Mutex<()>,
}

impl ContentStore {
    /// Store over `config.content.dir` with an empty snapshot. Nothing is read.
    pub fn new(config: &FolioConfig) -> Self {
        Self {
            dir: config.content.dir.clone(),
            config: config.content.clone(),
            parser: DocumentParser::new((&config.content).into()),
            snapshot: ArcSwap::from_pointee(Snapshot::default()),
            optimizer: MemoryOptimizer::new(config),
            reload_lock: Mutex::new(()),
        }
    }

    /// Create a store and publish the initial snapshot.
    pub fn open(config: &FolioConfig) -> Result<Self, ContentError> {
        let store = Self::new(config);
        store.reload()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub const fn optimizer(&self) -> &MemoryOptimizer {
        &self.optimizer
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Scan `dir` and build a snapshot without publishing it.
    pub fn load(&self, dir: &Path) -> Result<(Snapshot, Vec<ParseError>), ContentError> {
        let output = loader::load_dir(dir, &self.config, self.parser, &self.optimizer, None)?;
        Ok((output.snapshot, output.errors))
    }

    /// Rebuild from disk and publish, bounded by the configured scan timeout.
    ///
    /// On failure the previous snapshot stays live.
    pub fn reload(&self) -> Result<LoadReport, ContentError> {
        self.reload_with_timeout(self.config.scan_timeout())
    }

    /// Rebuild from disk and publish, giving up after `timeout`.
    pub fn reload_with_timeout(&self, timeout: Option<Duration>) -> Result<LoadReport, ContentError> {
        let Some(_guard) = self.reload_lock.try_lock() else {
            return Err(ContentError::Busy);
        };
        self.rebuild(timeout)
    }

    /// Caller must hold `reload_lock`.
    fn rebuild(&self, timeout: Option<Duration>) -> Result<LoadReport, ContentError> {
        let output = loader::load_dir(&self.dir, &self.config, self.parser, &self.optimizer, timeout)
            .inspect_err(|err| log!("error"; "reload failed, keeping previous snapshot: {err}"))?;

        let report = LoadReport {
            documents: output.snapshot.len(),
            published: output.snapshot.published_count(),
            drafts: output.snapshot.draft_count(),
            files: output.files,
            errors: output.errors,
            elapsed: output.elapsed,
        };
        self.publish(output.snapshot);

        log!(
            "store";
            "loaded {} documents ({} drafts, {} errors) in {:.1?}",
            report.documents,
            report.drafts,
            report.errors.len(),
            report.elapsed
        );
        Ok(report)
    }

    fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot.store(Arc::clone(&snapshot));

        let pruned = self
            .optimizer
            .prune(|(slug, fingerprint)| snapshot.contains_version(slug, fingerprint));
        if pruned > 0 {
            log!("cache"; "dropped {pruned} stale entries");
        }
    }

    // ========================================================================
    // Queries (all against the current snapshot)
    // ========================================================================

    /// The published snapshot. Hold on to it for a consistent multi-step read.
    #[inline]
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Any document by slug, drafts included.
    pub fn get(&self, slug: &str) -> Option<Arc<Document>> {
        self.snapshot.load().get(slug).cloned()
    }

    pub fn all(&self) -> Vec<Arc<Document>> {
        self.snapshot.load().published().cloned().collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.snapshot.load().by_tag(tag)
    }

    pub fn by_category(&self, category: &str) -> Vec<Arc<Document>> {
        self.snapshot.load().by_category(category)
    }

    pub fn recent(&self, n: usize) -> Vec<Arc<Document>> {
        self.snapshot.load().recent(n)
    }

    pub fn featured(&self, n: usize) -> Vec<Arc<Document>> {
        self.snapshot.load().featured(n)
    }

    pub fn drafts(&self) -> Vec<Arc<Document>> {
        self.snapshot.load().drafts().cloned().collect()
    }

    pub fn tag_counts(&self) -> Vec<LabelCount> {
        self.snapshot.load().tag_counts().to_vec()
    }

    pub fn category_counts(&self) -> Vec<LabelCount> {
        self.snapshot.load().category_counts().to_vec()
    }

    pub fn last_reload(&self) -> DateTime<Utc> {
        self.snapshot.load().loaded_at()
    }

    pub fn stats(&self) -> Stats {
        let snapshot = self.current();
        let (body_bytes, resident_body_bytes, compressed_documents) = snapshot.body_footprint();

        Stats {
            total_articles: snapshot.len(),
            published_count: snapshot.published_count(),
            draft_count: snapshot.draft_count(),
            total_tags: snapshot.tag_counts().len(),
            total_categories: snapshot.category_counts().len(),
            popular_tags: snapshot.tag_counts().iter().take(POPULAR_TAGS).cloned().collect(),
            recent_articles: snapshot
                .published()
                .take(RECENT_ARTICLES)
                .map(|d| DocumentSummary::from(d.as_ref()))
                .collect(),
            last_updated: snapshot.loaded_at(),
            parse_errors: snapshot.parse_errors(),
            memory: MemoryStats {
                body_bytes,
                resident_body_bytes,
                compressed_documents,
                bytes_saved: body_bytes.saturating_sub(resident_body_bytes),
                optimizer: self.optimizer.stats(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn store_in(dir: &Path) -> ContentStore {
        crate::logger::set_quiet(true);
        ContentStore::open(&FolioConfig::default().with_content_dir(dir)).unwrap()
    }

    fn slugs(docs: &[Arc<Document>]) -> Vec<&str> {
        docs.iter().map(|d| &*d.slug).collect()
    }

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "2024-01-15-hello-world.md", "---\ntitle: Hello World\ntags: [go]\n---\nHi.");
        write(dir.path(), "second.md", "---\ntitle: Second\ndate: 2024-02-01\ntags: [Go, rust]\n---\nMore.");
        write(dir.path(), "wip.md", "---\ntitle: WIP\ndate: 2024-03-01\ntags: [go]\ndraft: true\n---\nSoon.");
        dir
    }

    #[test]
    fn test_open_publishes_snapshot() {
        let dir = corpus();
        let store = store_in(dir.path());

        assert_eq!(slugs(&store.all()), vec!["second", "hello-world"]);
        assert!(store.get("hello-world").is_some());
        assert!(store.get("wip").is_some());
        assert_eq!(slugs(&store.drafts()), vec!["wip"]);
    }

    #[test]
    fn test_tag_counts_exclude_drafts() {
        let dir = corpus();
        let store = store_in(dir.path());
        let counts = store.tag_counts();

        // Display spelling comes from the newest document using the tag
        assert_eq!(counts[0].name.as_ref(), "Go");
        assert_eq!(counts[0].count, 2);
        assert_eq!(slugs(&store.by_tag("GO")), vec!["second", "hello-world"]);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = corpus();
        let store = store_in(dir.path());
        let before = store.current();

        fs::remove_dir_all(dir.path()).unwrap();
        let err = store.reload().unwrap_err();

        assert!(matches!(err, ContentError::ReadDir { .. }));
        assert!(Arc::ptr_eq(&before, &store.current()));
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_concurrent_reload_is_busy() {
        let dir = corpus();
        let store = store_in(dir.path());

        let _guard = store.reload_lock.lock();
        assert!(matches!(store.reload(), Err(ContentError::Busy)));
    }

    #[test]
    fn test_timeout_keeps_previous_snapshot() {
        let dir = corpus();
        let store = store_in(dir.path());
        let before = store.current();

        let err = store.reload_with_timeout(Some(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, ContentError::Timeout(_)));
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = corpus();
        let store = store_in(dir.path());
        let first = store.current();
        store.reload().unwrap();
        let second = store.current();

        assert!(!Arc::ptr_eq(&first, &second));
        let view = |s: &Snapshot| {
            s.all()
                .iter()
                .map(|d| (d.slug.to_string(), d.fingerprint, d.draft))
                .collect::<Vec<_>>()
        };
        assert_eq!(view(&first), view(&second));
        assert_eq!(first.tag_counts(), second.tag_counts());
        assert_eq!(first.category_counts(), second.category_counts());
    }

    #[test]
    fn test_reader_keeps_consistent_view_during_reloads() {
        let dir = TempDir::new().unwrap();
        let names = ["a.md", "b.md", "c.md", "d.md"];
        for name in names {
            write(dir.path(), name, "---\ntitle: gen 0\n---\n");
        }
        let store = store_in(dir.path());

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let snapshot = store.current();
                        let titles: Vec<_> = snapshot
                            .all()
                            .iter()
                            .map(|d| d.title.clone())
                            .collect();
                        assert_eq!(titles.len(), names.len());
                        assert!(titles.windows(2).all(|w| w[0] == w[1]));
                    }
                });
            }
            s.spawn(|| {
                for generation in 1..=10 {
                    let _guard = store.reload_lock.lock();
                    for name in names {
                        write(dir.path(), name, &format!("---\ntitle: gen {generation}\n---\n"));
                    }
                    store.rebuild(None).unwrap();
                }
            });
        });

        let last = store.current();
        assert!(last.all().iter().all(|d| d.title.as_deref() == Some("gen 10")));
    }

    #[test]
    fn test_stats() {
        let dir = corpus();
        let store = store_in(dir.path());
        let stats = store.stats();

        assert_eq!(stats.total_articles, 3);
        assert_eq!(stats.published_count, 2);
        assert_eq!(stats.draft_count, 1);
        assert_eq!(stats.total_tags, 2);
        assert_eq!(stats.popular_tags[0].count, 2);
        assert_eq!(stats.recent_articles.len(), 2);
        assert_eq!(stats.recent_articles[0].slug.as_ref(), "second");
        assert_eq!(stats.last_updated, store.last_reload());
    }

    #[test]
    fn test_load_does_not_publish() {
        let dir = corpus();
        let other = TempDir::new().unwrap();
        write(other.path(), "only.md", "---\ntitle: Only\n---\n");
        let store = store_in(dir.path());

        let (snapshot, errors) = store.load(other.path()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(errors.is_empty());
        assert!(store.get("only").is_none());
    }
}
