//! Filesystem-backed [`AssetStore`].
//!
//! Layout under the store directory:
//! - `manifest.json`: every folder and record, rewritten atomically after each change
//! - `.protected/<hash prefix>/<name>`: draft content
//! - `public/<folder path>/<name>`: published content

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{normalise_folder_path, ConfigError};
use crate::contract::{AssetRecord, AssetStore, ContentRef, Folder, Stage, StoreError};

const MANIFEST_FILE: &str = "manifest.json";
const PROTECTED_DIR: &str = ".protected";
const PUBLIC_DIR: &str = "public";
const HASH_DIR_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Failed to save manifest: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error(transparent)]
    FolderPath(#[from] ConfigError),
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),
    #[error("Folder {0} does not exist")]
    UnknownFolder(i64),
    #[error("Record {0} does not exist")]
    UnknownRecord(i64),
    #[error("Record {0} has not been written yet")]
    NotWritten(String),
    #[error("Record {0} has no parent folder")]
    NoParent(String),
    #[error("Store state lock poisoned")]
    Poisoned,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> LocalStoreError + '_ {
    move |source| LocalStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<u64, LocalStoreError> {
    fs::copy(from, to).map_err(|source| LocalStoreError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    next_id: i64,
    folders: Vec<Folder>,
    records: Vec<AssetRecord>,
}

impl Manifest {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn folder(&self, id: i64) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }
}

pub struct LocalAssetStore {
    root: PathBuf,
    state: Mutex<Manifest>,
}

impl LocalAssetStore {
    /// Opens the store at `root`, creating the directory if needed and loading
    /// any manifest left by an earlier run.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_err(&root))?;

        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            let raw = fs::read_to_string(&manifest_path).map_err(io_err(&manifest_path))?;
            serde_json::from_str(&raw)?
        } else {
            Manifest::default()
        };
        info!(
            root = %root.display(),
            folders = manifest.folders.len(),
            records = manifest.records.len(),
            "Opened local asset store"
        );

        Ok(LocalAssetStore {
            root,
            state: Mutex::new(manifest),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folders(&self) -> Result<Vec<Folder>, LocalStoreError> {
        Ok(self.lock()?.folders.clone())
    }

    pub fn records(&self) -> Result<Vec<AssetRecord>, LocalStoreError> {
        Ok(self.lock()?.records.clone())
    }

    /// Where a record's published copy lives.
    pub fn live_path(&self, folder: &Folder, name: &str) -> PathBuf {
        self.root.join(PUBLIC_DIR).join(&folder.path).join(name)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Manifest>, LocalStoreError> {
        self.state.lock().map_err(|_| LocalStoreError::Poisoned)
    }

    fn save(&self, manifest: &Manifest) -> Result<(), LocalStoreError> {
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(io_err(&self.root))?;
        serde_json::to_writer_pretty(&mut tmp, manifest)?;
        tmp.flush().map_err(io_err(tmp.path()))?;
        tmp.persist(self.root.join(MANIFEST_FILE))?;
        Ok(())
    }

    fn resolve_folder(&self, path: &str) -> Result<Folder, LocalStoreError> {
        let path = normalise_folder_path(path)?;
        let mut manifest = self.lock()?;

        let mut parent_id = 0;
        let mut current: Option<Folder> = None;
        let mut created = false;
        for segment in path.split('/') {
            let existing = manifest
                .folders
                .iter()
                .find(|f| f.parent_id == parent_id && f.name == segment)
                .cloned();
            let folder = match existing {
                Some(folder) => folder,
                None => {
                    let folder = Folder {
                        id: manifest.allocate_id(),
                        name: segment.to_string(),
                        path: match &current {
                            Some(parent) => format!("{}/{}", parent.path, segment),
                            None => segment.to_string(),
                        },
                        parent_id,
                    };
                    debug!(folder_id = folder.id, path = %folder.path, "Created folder");
                    manifest.folders.push(folder.clone());
                    created = true;
                    folder
                }
            };
            parent_id = folder.id;
            current = Some(folder);
        }

        if created {
            self.save(&manifest)?;
        }
        // normalise_folder_path guarantees at least one segment
        current.ok_or(LocalStoreError::FolderPath(ConfigError::EmptyFolderPath))
    }

    fn lookup(&self, name: &str, parent_id: i64) -> Result<Option<AssetRecord>, LocalStoreError> {
        Ok(self
            .lock()?
            .records
            .iter()
            .find(|r| r.name == name && r.parent_id == Some(parent_id))
            .cloned())
    }

    fn stage_file(&self, local_path: &Path, name: &str) -> Result<AssetRecord, LocalStoreError> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(LocalStoreError::InvalidName(name.to_string()));
        }

        let hash = {
            let mut source = File::open(local_path).map_err(io_err(local_path))?;
            let mut hasher = Sha256::new();
            io::copy(&mut source, &mut hasher).map_err(io_err(local_path))?;
            format!("{:x}", hasher.finalize())
        };

        let location = format!("{}/{}/{}", PROTECTED_DIR, &hash[..HASH_DIR_LEN], name);
        let draft_path = self.root.join(&location);
        if let Some(dir) = draft_path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
        let size = copy_file(local_path, &draft_path)?;
        debug!(name, hash = %hash, size, "Stored draft content");

        let now = Utc::now();
        Ok(AssetRecord {
            id: None,
            name: name.to_string(),
            parent_id: None,
            content: ContentRef {
                hash,
                size,
                location,
            },
            stage: Stage::Draft,
            created: now,
            last_edited: now,
        })
    }

    fn save_record(&self, mut record: AssetRecord) -> Result<AssetRecord, LocalStoreError> {
        let mut manifest = self.lock()?;
        if let Some(parent_id) = record.parent_id {
            if manifest.folder(parent_id).is_none() {
                return Err(LocalStoreError::UnknownFolder(parent_id));
            }
        }

        record.last_edited = Utc::now();
        match record.id {
            None => {
                record.id = Some(manifest.allocate_id());
                manifest.records.push(record.clone());
            }
            Some(id) => {
                let slot = manifest
                    .records
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or(LocalStoreError::UnknownRecord(id))?;
                *slot = record.clone();
            }
        }

        self.save(&manifest)?;
        Ok(record)
    }

    fn publish_record(&self, record: &AssetRecord) -> Result<AssetRecord, LocalStoreError> {
        let id = record
            .id
            .ok_or_else(|| LocalStoreError::NotWritten(record.name.clone()))?;
        let mut manifest = self.lock()?;

        let stored = manifest
            .records
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or(LocalStoreError::UnknownRecord(id))?;
        let parent_id = stored
            .parent_id
            .ok_or_else(|| LocalStoreError::NoParent(stored.name.clone()))?;
        let folder = manifest
            .folder(parent_id)
            .cloned()
            .ok_or(LocalStoreError::UnknownFolder(parent_id))?;

        let draft_path = self.root.join(&stored.content.location);
        let live_path = self.live_path(&folder, &stored.name);
        if let Some(dir) = live_path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
        copy_file(&draft_path, &live_path)?;

        let mut published = stored;
        published.stage = Stage::Live;
        published.last_edited = Utc::now();
        if let Some(slot) = manifest.records.iter_mut().find(|r| r.id == Some(id)) {
            *slot = published.clone();
        }
        self.save(&manifest)?;

        info!(record_id = id, path = %live_path.display(), "Published record");
        Ok(published)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn find_or_make_folder(&self, path: &str) -> Result<Folder, StoreError> {
        Ok(self.resolve_folder(path)?)
    }

    async fn find_first(
        &self,
        name: &str,
        parent_id: i64,
    ) -> Result<Option<AssetRecord>, StoreError> {
        Ok(self.lookup(name, parent_id)?)
    }

    async fn create_from_local_file(
        &self,
        local_path: &Path,
        name: &str,
    ) -> Result<AssetRecord, StoreError> {
        Ok(self.stage_file(local_path, name)?)
    }

    async fn write(&self, record: AssetRecord) -> Result<AssetRecord, StoreError> {
        Ok(self.save_record(record)?)
    }

    async fn publish(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError> {
        Ok(self.publish_record(record)?)
    }
}
