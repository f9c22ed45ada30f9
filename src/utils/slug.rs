//! Slug and filename-derived title utilities.
//!
//! Converts file names and free text to URL-safe identifiers.

use chrono::NaiveDate;
use std::path::Path;

/// Characters that may never appear in a slug used to address a file
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

// ============================================================================
// Slugification
// ============================================================================

/// Convert text to a URL-safe slug.
///
/// Non-ASCII text is transliterated first, then the result is lowercased,
/// every run of non-alphanumeric characters collapses into a single `-`,
/// and leading/trailing hyphens are trimmed.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Split a leading `YYYY-MM-DD-` prefix off a file stem.
///
/// Returns the parsed date (if the prefix is a real calendar date) and the
/// remainder of the stem.
pub fn split_date_prefix(stem: &str) -> (Option<NaiveDate>, &str) {
    let bytes = stem.as_bytes();
    if bytes.len() > 11 && bytes[10] == b'-' && stem.is_char_boundary(10) {
        if let Ok(date) = NaiveDate::parse_from_str(&stem[..10], "%Y-%m-%d") {
            return (Some(date), &stem[11..]);
        }
    }
    (None, stem)
}

/// File stem of `path` with any date prefix removed.
fn undated_stem(path: &Path) -> &str {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    split_date_prefix(stem).1
}

/// Derive a slug from a content file name.
///
/// `articles/2024-01-15-hello-world.md` → `hello-world`
pub fn slug_from_path(path: &Path) -> String {
    slugify(undated_stem(path))
}

/// Derive a human title from a content file name.
///
/// `articles/my_first-post.md` → `My First Post`
pub fn title_from_path(path: &Path) -> String {
    undated_stem(path)
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Whether `slug` can safely be used to address a file inside the content directory.
pub fn is_safe_slug(slug: &str) -> bool {
    let slug = slug.trim();
    !slug.is_empty() && !slug.contains("..") && !slug.contains(FORBIDDEN_CHARS)
}
