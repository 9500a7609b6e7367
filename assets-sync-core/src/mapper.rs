//! Maps a discovered file path onto its destination folder path.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("{path} is not inside the import root {base}")]
    OutsideRoot { path: PathBuf, base: PathBuf },
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8(PathBuf),
    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// A file found under the import root, ready to be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Slash-separated directory relative to the root; empty at the top level.
    pub relative_dir: String,
}

impl DiscoveredFile {
    pub fn target_folder_path(&self, import_dir: &str) -> String {
        target_folder_path(import_dir, &self.relative_dir)
    }
}

/// Splits `path` into its file name and its directory relative to `base`.
///
/// The prefix is stripped component by component, so `/data/import-old/x`
/// is rejected against base `/data/import` instead of being mis-mapped.
pub fn map_path(path: &Path, base: &Path) -> Result<DiscoveredFile, MapError> {
    let relative = path.strip_prefix(base).map_err(|_| MapError::OutsideRoot {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| MapError::NonUtf8(path.to_path_buf()))?;
                segments.push(segment.to_string());
            }
            Component::CurDir => {}
            _ => {
                return Err(MapError::OutsideRoot {
                    path: path.to_path_buf(),
                    base: base.to_path_buf(),
                })
            }
        }
    }

    let file_name = segments
        .pop()
        .ok_or_else(|| MapError::NoFileName(path.to_path_buf()))?;

    Ok(DiscoveredFile {
        path: path.to_path_buf(),
        file_name,
        relative_dir: segments.join("/"),
    })
}

/// `import_dir` for top-level files, `import_dir/relative_dir` otherwise.
pub fn target_folder_path(import_dir: &str, relative_dir: &str) -> String {
    if relative_dir.is_empty() {
        import_dir.to_string()
    } else {
        format!("{import_dir}/{relative_dir}")
    }
}
