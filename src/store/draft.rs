//! Publishing and unpublishing by rewriting the `draft` front-matter key.

use super::ContentStore;
use crate::{
    document::Document,
    error::ContentError,
    log,
    utils::{
        fs::write_atomically,
        slug::{is_safe_slug, title_from_path},
    },
};
use std::{fs, path::Path, sync::Arc};

impl ContentStore {
    /// Set the draft flag of `slug` on disk, then rebuild the snapshot.
    ///
    /// Waits for any running reload instead of failing with `Busy`.
    /// Returns the document as published by the new snapshot.
    pub fn set_draft(&self, slug: &str, draft: bool) -> Result<Arc<Document>, ContentError> {
        if !is_safe_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }

        let _guard = self.reload_lock.lock();
        let document = self.get(slug).ok_or_else(|| ContentError::not_found(slug))?;
        if document.draft == draft {
            return Ok(document);
        }

        let path = &document.path;
        let text = fs::read_to_string(path).map_err(|source| ContentError::Write {
            path: path.clone(),
            source,
        })?;
        let updated = set_draft_flag(&text, path, draft).map_err(|message| ContentError::FrontMatter {
            path: path.clone(),
            message,
        })?;
        write_atomically(path, updated.as_bytes()).map_err(|source| ContentError::Write {
            path: path.clone(),
            source,
        })?;

        let state = if draft { "unpublished" } else { "published" };
        log!("store"; "{state} `{slug}` ({})", path.display());

        self.rebuild(self.config.scan_timeout())?;
        self.get(slug).ok_or_else(|| ContentError::not_found(slug))
    }
}

/// Rewrite (or add) the top-level `draft:` line of a front-matter block.
///
/// A file without front matter gets a new block carrying the title it was
/// showing, since adding front matter would otherwise drop that title.
fn set_draft_flag(text: &str, path: &Path, draft: bool) -> Result<String, String> {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let draft_line = format!("draft: {draft}");
    let (bom, body) = text
        .strip_prefix('\u{feff}')
        .map_or(("", text), |rest| ("\u{feff}", rest));

    let mut lines = body.split_inclusive('\n');
    let opens = lines
        .next()
        .is_some_and(|first| first.trim_end() == "---");

    if !opens {
        if !draft {
            return Ok(text.to_string());
        }
        let title = serde_json::to_string(&title_from_path(path)).map_err(|e| e.to_string())?;
        return Ok(format!(
            "{bom}---{newline}title: {title}{newline}{draft_line}{newline}---{newline}{body}"
        ));
    }

    let mut out = String::with_capacity(text.len() + draft_line.len() + 2);
    out.push_str(bom);
    out.push_str("---");
    out.push_str(newline);

    let mut replaced = false;
    let mut closed = false;
    for line in lines.by_ref() {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            if !replaced {
                out.push_str(&draft_line);
                out.push_str(newline);
            }
            out.push_str(line);
            closed = true;
            break;
        }
        if !replaced && line.starts_with("draft:") {
            out.push_str(&draft_line);
            out.push_str(newline);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if !closed {
        return Err("front matter opened with `---` but never closed".to_string());
    }
    out.extend(lines);
    Ok(out)
}
