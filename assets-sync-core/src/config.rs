use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_IMPORT_DIRECTORY: &str = "import";
pub const DEFAULT_STORE_DIR: &str = ".assets-store";

/// Subdirectory of the public folder that holds managed assets.
pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("import directory must name at least one folder")]
    EmptyFolderPath,
    #[error("import directory may not contain '.' or '..' segments: {0}")]
    RelativeSegment(String),
}

/// Settings for a single import run. Passed explicitly into the importer;
/// nothing reads these from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub public_dir: PathBuf,
    pub import_directory: String,
    pub store_dir: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            import_directory: DEFAULT_IMPORT_DIRECTORY.to_string(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl ImportConfig {
    pub fn trace_loaded(&self) {
        info!(
            public_dir = %self.public_dir.display(),
            import_directory = %self.import_directory,
            store_dir = %self.store_dir.display(),
            "Loaded import config"
        );
        debug!(?self, "Import config loaded (full debug)");
    }

    /// Resolves the on-disk source directory and the destination folder name.
    pub fn import_root(&self) -> Result<ImportRoot, ConfigError> {
        let folder_name = normalise_folder_path(self.import_directory.trim())?;
        let base_path = self.public_dir.join(ASSETS_DIR).join(&folder_name);
        Ok(ImportRoot {
            base_path,
            folder_name,
        })
    }
}

/// The directory being imported and the folder it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRoot {
    pub base_path: PathBuf,
    pub folder_name: String,
}

impl ImportRoot {
    pub fn new(base_path: impl Into<PathBuf>, folder_name: &str) -> Result<Self, ConfigError> {
        Ok(ImportRoot {
            base_path: base_path.into(),
            folder_name: normalise_folder_path(folder_name)?,
        })
    }
}

/// Trims surrounding slashes and collapses repeated ones: `"/a//b/"` becomes `"a/b"`.
///
/// Segments are kept byte for byte, so `"a "` and `"a"` stay distinct folders.
pub fn normalise_folder_path(raw: &str) -> Result<String, ConfigError> {
    let mut segments = Vec::new();
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(ConfigError::RelativeSegment(raw.to_string()));
        }
        segments.push(segment);
    }
    if segments.is_empty() {
        return Err(ConfigError::EmptyFolderPath);
    }
    Ok(segments.join("/"))
}
