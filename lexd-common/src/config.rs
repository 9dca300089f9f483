//! Configuration loading and data directory resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no command-line override is given.
pub const DATA_DIR_ENV: &str = "LEXD_DATA_DIR";

/// Data directory resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`LEXD_DATA_DIR`)
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_dir())
}

/// Get default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/lexd/config.toml first, then /etc/lexd/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("lexd").join("config.toml"));
        let system_config = PathBuf::from("/etc/lexd/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("lexd").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default data directory path
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        // ~/Library/Application Support/lexd
        dirs::data_dir()
            .map(|d| d.join("lexd"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lexd"))
    } else {
        // ~/.local/share/lexd on Linux, %LOCALAPPDATA%\lexd on Windows
        dirs::data_local_dir()
            .map(|d| d.join("lexd"))
            .unwrap_or_else(|| PathBuf::from("./lexd_data"))
    }
}

/// Locations of the per-store database files under one data directory.
///
/// Each store owns its own file so independent pipeline stages contend
/// only on the tables they actually touch.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub entries_db: PathBuf,
    pub labels_db: PathBuf,
    pub changes_db: PathBuf,
    pub corpus_db: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        DataPaths {
            entries_db: data_dir.join("entries.db"),
            labels_db: data_dir.join("labels.db"),
            changes_db: data_dir.join("changes.db"),
            corpus_db: data_dir.join("corpus.db"),
            data_dir,
        }
    }

    /// Resolve the data directory (see [`resolve_data_dir`]) and derive
    /// the store paths from it.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        Ok(DataPaths::new(resolve_data_dir(cli_arg)?))
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
