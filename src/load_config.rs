/// `load_config` module: builds the [`ImportConfig`] for a run from an optional
/// YAML file and environment overrides.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into [`ConfigFile`]; every key is optional
/// - Layer `ASSETS_SYNC_*` environment variables on top of the file
/// - Fall back to the core defaults for anything still unset
///
/// Precedence, highest first: CLI flag (applied by the caller), environment,
/// YAML file, default.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use assets_sync_core::config::ImportConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const ENV_PUBLIC_DIR: &str = "ASSETS_SYNC_PUBLIC_DIR";
pub const ENV_IMPORT_DIRECTORY: &str = "ASSETS_SYNC_IMPORT_DIRECTORY";
pub const ENV_STORE_DIR: &str = "ASSETS_SYNC_STORE_DIR";

/// YAML-side shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub public_dir: Option<PathBuf>,
    pub import_directory: Option<String>,
    pub store_dir: Option<PathBuf>,
}

pub fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => {
            debug!("No config file given, using defaults and environment");
            ConfigFile::default()
        }
    };

    let defaults = ImportConfig::default();
    let config = ImportConfig {
        public_dir: env_var(ENV_PUBLIC_DIR)
            .map(PathBuf::from)
            .or(file.public_dir)
            .unwrap_or(defaults.public_dir),
        import_directory: env_var(ENV_IMPORT_DIRECTORY)
            .or(file.import_directory)
            .unwrap_or(defaults.import_directory),
        store_dir: env_var(ENV_STORE_DIR)
            .map(PathBuf::from)
            .or(file.store_dir)
            .unwrap_or(defaults.store_dir),
    };
    config.trace_loaded();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(file) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(file)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path))
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
