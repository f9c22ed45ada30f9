//! Filesystem helpers: content discovery and atomic writes.

use crate::config::ContentConfig;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Check if path is a temp/backup file (editor artifacts).
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Whether `path` names a content file this configuration loads.
pub fn is_content_file(path: &Path, config: &ContentConfig) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    !IGNORED_FILES.contains(&name)
        && !is_temp_file(path)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| config.accepts_extension(ext))
}

/// Collect all content files below `dir`, recursively, in sorted path order.
///
/// An unreadable root is an error. Unreadable subdirectories are skipped.
pub fn collect_content_files(dir: &Path, config: &ContentConfig) -> io::Result<Vec<PathBuf>> {
    let meta = fs::metadata(dir)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(_) => continue,
        };
        if entry.file_type().is_file() && is_content_file(entry.path(), config) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Replace `path` with `content` via a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub fn write_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{name}.tmp"));

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}
