//! Configuration loading and data folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 are handled by the service's argument parser; this module
//! owns the TOML file and the compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "catalog.db";

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:5740";

/// Default completion service base URL (OpenAI-compatible)
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default completion request timeout
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;

/// Contents of `config.toml`
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the SQLite database
    pub data_dir: Option<PathBuf>,
    /// HTTP bind address, e.g. "0.0.0.0:5740"
    pub bind: Option<String>,
    /// Text completion service settings
    pub completion: CompletionToml,
}

/// `[completion]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Default location of the TOML config file (`~/.config/catalog/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catalog").join("config.toml"))
}

/// Parse a TOML config file
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Load the TOML config, degrading to defaults
///
/// A missing file is normal and logged at info. An unreadable or malformed
/// file is logged at warn and ignored so that the service still starts.
pub fn load_toml_config_or_default(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        return TomlConfig::default();
    };

    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Resolve the data folder
///
/// `cli_or_env` is the value already resolved from the command line or the
/// environment; it wins over the TOML file, which wins over the default.
pub fn resolve_data_dir(cli_or_env: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_or_env {
        return path.to_path_buf();
    }

    if let Some(path) = &toml_config.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("./catalog_data"))
}

/// Create the data folder if missing and return the database path inside it
pub fn ensure_data_dir(data_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
