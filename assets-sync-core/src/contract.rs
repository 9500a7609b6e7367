//! # contract: the asset-store seam
//!
//! This module defines the single trait ([`AssetStore`]) through which the
//! importer talks to the system that owns folders and asset records, plus the
//! plain data types that cross that boundary.
//!
//! ## Interface & Extensibility
//! - Implement [`AssetStore`] to target a new backend (a CMS database, a remote
//!   API, the bundled [`crate::local_store::LocalAssetStore`]).
//! - All methods are async and return [`StoreError`], a boxed error, so each
//!   backend keeps its own error types.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockAssetStore` is exported with the
//!   `test-export-mocks` feature (on by default) for downstream tests.
//!
//! ## Record lifecycle
//! `create_from_local_file` yields an unsaved draft, [`AssetRecord::set_parent`]
//! attaches it to a folder, `write` persists it and `publish` makes it live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type returned by every store operation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A node in the destination folder hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    /// Final path segment.
    pub name: String,
    /// Full slash-separated path, e.g. `import/2024`.
    pub path: String,
    /// `0` for top-level folders.
    pub parent_id: i64,
}

/// Whether a record is only stored (draft) or visible (live).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Draft,
    Live,
}

/// Where a record's bytes live inside the store, and what they hash to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// SHA-256 of the content, lowercase hex.
    pub hash: String,
    pub size: u64,
    /// Backend-specific location of the stored bytes.
    pub location: String,
}

/// The persisted representation of an imported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// `None` until the record has been written.
    pub id: Option<i64>,
    pub name: String,
    pub parent_id: Option<i64>,
    pub content: ContentRef,
    pub stage: Stage,
    pub created: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
}

impl AssetRecord {
    pub fn set_parent(&mut self, folder: &Folder) {
        self.parent_id = Some(folder.id);
    }

    pub fn is_published(&self) -> bool {
        self.stage == Stage::Live
    }
}

/// Trait for resolving folders and creating, persisting and publishing asset records.
///
/// The trait is `Send` + `Sync` and intended for async/await usage; the importer
/// awaits each call to completion before issuing the next.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Resolve the folder at `path`, creating it and any missing ancestors.
    ///
    /// Repeated calls with the same path return the same folder.
    async fn find_or_make_folder(&self, path: &str) -> Result<Folder, StoreError>;

    /// First record named `name` directly inside folder `parent_id`, if any.
    async fn find_first(
        &self,
        name: &str,
        parent_id: i64,
    ) -> Result<Option<AssetRecord>, StoreError>;

    /// Build an unsaved draft record from a file on local disk.
    async fn create_from_local_file(
        &self,
        local_path: &Path,
        name: &str,
    ) -> Result<AssetRecord, StoreError>;

    /// Persist `record`, assigning an id on first write.
    async fn write(&self, record: AssetRecord) -> Result<AssetRecord, StoreError>;

    /// Make a written record live.
    async fn publish(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError>;
}
