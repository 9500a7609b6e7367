#![doc = "assets-sync-core: core logic library for assets-sync."]

//! This crate walks an import directory and registers every file it finds as a
//! published asset record, mirroring the on-disk subdirectories as folders.
//!
//! # Usage
//! Build an [`config::ImportRoot`], pick an [`contract::AssetStore`] (for example
//! [`local_store::LocalAssetStore`]) and drive it with [`importer::Importer`].

pub mod config;
pub mod contract;
pub mod error;
pub mod importer;
pub mod local_store;
pub mod mapper;
pub mod report;
pub mod walker;

pub use config::{ImportConfig, ImportRoot};
pub use contract::{AssetRecord, AssetStore, Folder, Stage, StoreError};
pub use error::ImportError;
pub use importer::{Importer, PreparedImport};
pub use local_store::LocalAssetStore;
pub use report::{FileOutcome, FileReport, ImportReport};
