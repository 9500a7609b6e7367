/// CLI glue for assets-sync: command parsing, config loading and the
/// human-readable report printed to stdout.
///
/// All import logic lives in [`assets_sync_core`]; this module wires a
/// [`LocalAssetStore`] to the [`Importer`] and prints what it does.
///
/// - Entry struct [`Cli`] defines the user-facing subcommands.
/// - [`run`] is the async entrypoint used by `main` and by integration tests.
use crate::load_config::load_config;
use anyhow::Result;
use assets_sync_core::{ImportError, ImportRoot, Importer, LocalAssetStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "assets-sync",
    version,
    about = "Import files from public/assets/<dir> as published asset records"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every file under public/assets/<import_directory> and publish it
    ImportFiles {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Directory inside public/assets to import; also the destination folder name
        #[clap(long)]
        import_directory: Option<String>,
    },
}

/// Async CLI entrypoint for main() and integration tests.
///
/// Per-file failures are part of the printed report and still return `Ok`;
/// only fatal problems (bad config, missing source directory, unusable store)
/// return an error.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ImportFiles {
            config,
            import_directory,
        } => {
            tracing::info!(command = "import-files", "Starting file import");
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = import_directory {
                config.import_directory = dir;
            }
            let root = config.import_root()?;

            println!("=== Import Files from Directory Task ===");
            println!("Importing from: {}", root.base_path.display());
            println!("Target folder in Assets: {}\n", root.folder_name);

            let store = LocalAssetStore::open(&config.store_dir)?;
            import_files(&root, &store).await
        }
    }
}

async fn import_files(root: &ImportRoot, store: &LocalAssetStore) -> Result<()> {
    let importer = Importer::new(root, store);
    let prepared = match importer.prepare().await {
        Ok(prepared) => prepared,
        Err(ImportError::SourceMissing(path)) => {
            println!("ERROR: Directory does not exist: {}", path.display());
            println!("Please create the directory and add files to import.");
            tracing::error!(command = "import-files", path = %path.display(), "Import aborted");
            return Err(ImportError::SourceMissing(path).into());
        }
        Err(e) => {
            println!("ERROR: {e}");
            tracing::error!(command = "import-files", error = %e, "Import aborted");
            return Err(e.into());
        }
    };

    println!("✓ Target folder ready (ID: {})\n", prepared.target.id);

    if prepared.files.is_empty() {
        println!("No files found in directory: {}", root.base_path.display());
        return Ok(());
    }
    println!("Found {} file(s) to import\n", prepared.files.len());

    let report = importer
        .run(&prepared, |file| println!("{file}"))
        .await;

    println!("\n{report}");
    tracing::info!(
        command = "import-files",
        imported = report.imported(),
        skipped = report.skipped(),
        errors = report.errors(),
        "Import finished"
    );
    Ok(())
}
