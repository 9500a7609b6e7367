//! Recursive listing of every file under an import root.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Lists every non-directory entry at any depth below `root`.
///
/// Symbolic links are followed: a link to a directory is descended into, any
/// other link is listed as a file. The walk stops at the first error (an
/// unreadable directory, a broken link, a link cycle) and returns it, so a
/// partially listed tree is never imported.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    info!(root = %root.display(), "[IMPORT] Listing files");
    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            error!(error = %e, root = %root.display(), "[IMPORT][ERROR] Directory walk failed");
            e
        })?;
        if entry.file_type().is_dir() {
            debug!(path = %entry.path().display(), "Descending into directory");
            continue;
        }
        files.push(entry.into_path());
    }

    info!(count = files.len(), "[IMPORT] Finished listing files");
    Ok(files)
}
