//! Directory scan → parsed, deduplicated, optimized snapshot.

use super::Snapshot;
use crate::{
    config::ContentConfig,
    document::{Document, DocumentParser},
    error::{ContentError, ParseError},
    log,
    memory::MemoryOptimizer,
    search::DocumentTerms,
    utils::fs::collect_content_files,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Result of a directory scan before publication.
#[derive(Debug)]
pub struct LoadOutput {
    pub snapshot: Snapshot,
    pub errors: Vec<ParseError>,
    /// Number of files scanned, parsed or not
    pub files: usize,
    pub elapsed: Duration,
}

/// Scan `dir` and build a snapshot. Nothing is published here.
///
/// Per-file failures are collected in [`LoadOutput::errors`]. Only an
/// unreadable directory or an exceeded `timeout` fails the whole load.
pub fn load_dir(
    dir: &Path,
    config: &ContentConfig,
    parser: DocumentParser,
    optimizer: &MemoryOptimizer,
    timeout: Option<Duration>,
) -> Result<LoadOutput, ContentError> {
    let started = Instant::now();
    let deadline = timeout.map(|t| (started + t, t));

    let files = collect_content_files(dir, config).map_err(|source| ContentError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    check_deadline(deadline)?;

    // Parse in parallel; abandon remaining work once the deadline passes
    let expired = AtomicBool::new(false);
    let parsed: Vec<Option<Result<Document, ParseError>>> = files
        .par_iter()
        .map(|path| {
            if expired.load(Ordering::Relaxed) {
                return None;
            }
            if deadline.is_some_and(|(at, _)| Instant::now() >= at) {
                expired.store(true, Ordering::Relaxed);
                return None;
            }
            Some(parser.parse_file(path))
        })
        .collect();

    if let Some((_, limit)) = deadline
        && expired.load(Ordering::Relaxed)
    {
        return Err(ContentError::Timeout(limit));
    }

    let mut errors = Vec::new();
    let mut documents = Vec::with_capacity(files.len());
    for result in parsed.into_iter().flatten() {
        match result {
            Ok(document) => documents.push(document),
            Err(err) => {
                log!("parse"; "{err}");
                errors.push(err);
            }
        }
    }

    let documents = dedupe_slugs(documents);

    // Tokenize from the plain body, then let the optimizer compress it
    let entries: Vec<(Arc<Document>, DocumentTerms)> = documents
        .into_par_iter()
        .map(|document| {
            let terms = DocumentTerms::new(&document, document.plain_body().unwrap_or_default());
            (Arc::new(optimizer.optimize(document)), terms)
        })
        .collect();

    if entries.is_empty() && !files.is_empty() {
        log!("error"; "no documents loaded from {} files in {}", files.len(), dir.display());
    }

    Ok(LoadOutput {
        snapshot: Snapshot::build(entries, errors.len()),
        errors,
        files: files.len(),
        elapsed: started.elapsed(),
    })
}

fn check_deadline(deadline: Option<(Instant, Duration)>) -> Result<(), ContentError> {
    match deadline {
        Some((at, limit)) if Instant::now() >= at => Err(ContentError::Timeout(limit)),
        _ => Ok(()),
    }
}

/// Keep one document per slug. Input is in path order, so the later path wins.
fn dedupe_slugs(documents: Vec<Document>) -> Vec<Document> {
    let mut positions: FxHashMap<Arc<str>, usize> = FxHashMap::default();
    let mut kept: Vec<Option<Document>> = Vec::with_capacity(documents.len());

    for document in documents {
        if let Some(&previous) = positions.get(&document.slug) {
            if let Some(old) = kept[previous].take() {
                log!(
                    "store";
                    "duplicate slug `{}`: {} replaces {}",
                    document.slug,
                    document.path.display(),
                    old.path.display()
                );
            }
            kept[previous] = Some(document);
        } else {
            positions.insert(Arc::clone(&document.slug), kept.len());
            kept.push(Some(document));
        }
    }

    kept.into_iter().flatten().collect()
}
