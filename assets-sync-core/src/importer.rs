//! Import driver: walks the import root and registers each file with an [`AssetStore`].
//!
//! A run has two phases:
//!   - [`Importer::prepare`] checks the source directory, lists every file
//!     beneath it and then resolves the top-level target folder. Failures here
//!     are fatal and happen before any record is created.
//!   - [`Importer::run`] handles the listed files one at a time. Each file
//!     resolves its target folder, is skipped when a record with the same name
//!     already sits in that folder, and is otherwise created, written and
//!     published. A failure only affects the file it happened on.
//!
//! Files are processed strictly in sequence; every store call is awaited before
//! the next one is issued.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::ImportRoot;
use crate::contract::{AssetStore, Folder, StoreError};
use crate::error::ImportError;
use crate::mapper::{map_path, DiscoveredFile};
use crate::report::{FileOutcome, FileReport, ImportReport};
use crate::walker;

/// Result of the fatal-precondition phase.
#[derive(Debug, Clone)]
pub struct PreparedImport {
    /// Canonical source directory; every listed file lives under it.
    pub base_path: PathBuf,
    /// Top-level destination folder.
    pub target: Folder,
    pub files: Vec<PathBuf>,
}

pub struct Importer<'a, S: AssetStore> {
    root: &'a ImportRoot,
    store: &'a S,
}

impl<'a, S: AssetStore> Importer<'a, S> {
    pub fn new(root: &'a ImportRoot, store: &'a S) -> Self {
        Importer { root, store }
    }

    pub async fn prepare(&self) -> Result<PreparedImport, ImportError> {
        let base = &self.root.base_path;
        info!(base = %base.display(), folder = %self.root.folder_name, "[IMPORT] Preparing import");

        if !base.exists() {
            error!(base = %base.display(), "[IMPORT][ERROR] Source directory does not exist");
            return Err(ImportError::SourceMissing(base.clone()));
        }
        if !base.is_dir() {
            error!(base = %base.display(), "[IMPORT][ERROR] Source path is not a directory");
            return Err(ImportError::NotADirectory(base.clone()));
        }

        let base_path = std::fs::canonicalize(base)?;
        let files = walker::list_files(&base_path)?;

        let target = self
            .store
            .find_or_make_folder(&self.root.folder_name)
            .await
            .map_err(|source| {
                error!(error = %source, folder = %self.root.folder_name, "[IMPORT][ERROR] Could not prepare target folder");
                ImportError::TargetFolder {
                    path: self.root.folder_name.clone(),
                    source,
                }
            })?;
        info!(folder_id = target.id, path = %target.path, "[IMPORT] Target folder ready");

        Ok(PreparedImport {
            base_path,
            target,
            files,
        })
    }

    /// Imports every prepared file, calling `on_file` as each one finishes.
    pub async fn run<F>(&self, prepared: &PreparedImport, mut on_file: F) -> ImportReport
    where
        F: FnMut(&FileReport),
    {
        let mut report = ImportReport::default();
        for path in &prepared.files {
            let file_report = self.import_file(&prepared.base_path, path).await;
            on_file(&file_report);
            report.files.push(file_report);
        }

        info!(
            imported = report.imported(),
            skipped = report.skipped(),
            errors = report.errors(),
            "[IMPORT] Import complete"
        );
        report
    }

    /// [`prepare`](Self::prepare) followed by [`run`](Self::run), without progress output.
    pub async fn import_all(&self) -> Result<ImportReport, ImportError> {
        let prepared = self.prepare().await?;
        Ok(self.run(&prepared, |_| {}).await)
    }

    /// Imports a single file found under `base`. Never fails; errors are
    /// reported as [`FileOutcome::Errored`].
    pub async fn import_file(&self, base: &Path, path: &Path) -> FileReport {
        let (file_name, target_folder_path, result) = match map_path(path, base) {
            Ok(file) => {
                let target = file.target_folder_path(&self.root.folder_name);
                let result = self.import_discovered(&file, &target).await;
                (file.file_name, target, result)
            }
            Err(e) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (name, self.root.folder_name.clone(), Err(e.into()))
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(file = %file_name, folder = %target_folder_path, error = %e, "[IMPORT][ERROR] Import failed");
                FileOutcome::Errored {
                    message: e.to_string(),
                }
            }
        };

        FileReport {
            file_name,
            target_folder_path,
            outcome,
        }
    }

    async fn import_discovered(
        &self,
        file: &DiscoveredFile,
        target: &str,
    ) -> Result<FileOutcome, StoreError> {
        let folder = self.store.find_or_make_folder(target).await?;
        debug!(file = %file.file_name, folder_id = folder.id, "Resolved target folder");

        if let Some(existing) = self.store.find_first(&file.file_name, folder.id).await? {
            let existing_id = existing.id.unwrap_or_default();
            info!(file = %file.file_name, folder = %target, existing_id, "[IMPORT] Skipping, already exists");
            return Ok(FileOutcome::Skipped { existing_id });
        }

        let mut record = self
            .store
            .create_from_local_file(&file.path, &file.file_name)
            .await?;
        record.set_parent(&folder);
        let record = self.store.write(record).await?;
        let record = self.store.publish(&record).await?;
        let record_id = record
            .id
            .ok_or("asset store published a record without an id")?;

        info!(file = %file.file_name, folder = %target, record_id, "[IMPORT] Imported and published");
        Ok(FileOutcome::Imported { record_id })
    }
}
