//! File system watcher for live reload.
//!
//! Monitors the content directory and the config file, and reloads the
//! store once a burst of changes settles.
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────────┐
//! │ notify   │───▶│ Debouncer │───▶│ handle_changes() │──▶ store.reload()
//! │ events   │    │ (300ms)   │    └──────────────────┘
//! └──────────┘    └───────────┘
//! ```
//!
//! Config changes are reported but not applied: restart to pick them up.

use anyhow::{Context, Result};
use folio::{
    ContentError, ContentService, FolioConfig, log,
    logger::WatchStatus,
    utils::fs::{is_content_file, is_temp_file},
};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const RELOAD_COOLDOWN_MS: u64 = 800;

/// Retry delay when a reload finds another one in progress.
const BUSY_RETRY_MS: u64 = 100;

// =============================================================================
// Path Utilities
// =============================================================================

/// Format path as relative to root for log display.
///
/// `/blog/articles/2024/post.md` → `2024/post.md`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and reload cooldown.
///
/// Events arriving during the cooldown are kept and flushed once it ends.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_reload: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_reload: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_reload
            .is_some_and(|t| t.elapsed() < Duration::from_millis(RELOAD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && !self.in_cooldown()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_reload(&mut self) {
        self.last_reload = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Reload if any changed path is content. Returns true if a reload succeeded.
fn handle_changes(
    paths: &[PathBuf],
    service: &ContentService,
    config: &FolioConfig,
    status: &mut WatchStatus,
) -> bool {
    let content = &config.content;

    if paths.iter().any(|p| p == &config.config_path) {
        log!("watch"; "{} changed, restart to apply", config.config_path.display());
    }

    // Path-only check, so deletions count too
    let changed: Vec<&PathBuf> = paths.iter().filter(|p| is_content_file(p, content)).collect();
    let Some(first) = changed.first() else {
        return false;
    };

    let trigger = match changed.len() {
        1 => rel_path(first, &content.dir),
        n => format!("{} and {} more", rel_path(first, &content.dir), n - 1),
    };

    loop {
        match service.reload_articles() {
            Ok(report) => {
                let message = format!(
                    "reloaded {} documents ({} drafts) after {trigger}",
                    report.documents, report.drafts
                );
                if report.errors.is_empty() {
                    status.success(&message);
                } else {
                    let detail: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
                    status.error(&message, &detail.join("\n"));
                }
                return true;
            }
            Err(ContentError::Busy) => std::thread::sleep(Duration::from_millis(BUSY_RETRY_MS)),
            Err(err) => {
                status.error(&format!("reload failed after {trigger}"), &err.to_string());
                return false;
            }
        }
    }
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &FolioConfig) -> Result<()> {
    let dir = &config.content.dir;
    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch content: {}", dir.display()))?;
    log!("watch"; "content: {}/", dir.display());

    if config.config_path.exists() {
        watcher
            .watch(&config.config_path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config: {}", config.config_path.display()))?;
        log!("watch"; "config: {}", config.config_path.display());
    }

    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and live reload.
pub fn watch_for_changes_blocking(service: &ContentService, config: &FolioConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    let mut debouncer = Debouncer::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take(), service, config, &mut status) {
                    debouncer.mark_reload();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // Other cases: irrelevant events, timeout without ready, etc.
            _ => {}
        }
    }

    Ok(())
}
