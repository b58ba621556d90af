//! Configuration resolution for catalog-ai
//!
//! Command-line arguments and environment variables come from [`Args`];
//! anything they leave unset falls through to the TOML file and then to the
//! compiled defaults in `catalog_common::config`.

use catalog_common::config::{
    self as common_config, TomlConfig, DEFAULT_BIND,
    DEFAULT_COMPLETION_TIMEOUT_SECS, DEFAULT_COMPLETION_URL, DEFAULT_MODEL,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::CompletionSettings;

/// Environment variables checked for the completion API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["OPENAI_API_KEY", "OPEN_API_KEY"];

/// Product catalog ingestion and enrichment service
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "catalog-ai", version, about)]
pub struct Args {
    /// Folder holding the SQLite database
    #[arg(long, env = "CATALOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long, env = "CATALOG_BIND")]
    pub bind: Option<String>,

    /// TOML config file (default: ~/.config/catalog/config.toml)
    #[arg(long, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible completion service
    #[arg(long, env = "CATALOG_COMPLETION_URL")]
    pub completion_url: Option<String>,

    /// Completion model name
    #[arg(long, env = "CATALOG_MODEL")]
    pub model: Option<String>,

    /// Completion request timeout in seconds
    #[arg(long, env = "CATALOG_COMPLETION_TIMEOUT_SECS")]
    pub completion_timeout_secs: Option<u64>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub bind: String,
    pub completion: CompletionSettings,
}

impl ServiceConfig {
    /// Resolve every setting: arguments/env → TOML → defaults
    pub fn resolve(args: &Args) -> Self {
        let config_path = args.config.clone().or_else(common_config::default_config_path);
        let toml_config = common_config::load_toml_config_or_default(config_path.as_deref());
        Self::from_sources(args, &toml_config)
    }

    pub fn from_sources(args: &Args, toml_config: &TomlConfig) -> Self {
        let data_dir = common_config::resolve_data_dir(args.data_dir.as_deref(), toml_config);

        let bind = args
            .bind
            .clone()
            .or_else(|| toml_config.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let completion_toml = &toml_config.completion;
        let completion = CompletionSettings {
            base_url: args
                .completion_url
                .clone()
                .or_else(|| completion_toml.base_url.clone())
                .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            model: args
                .model
                .clone()
                .or_else(|| completion_toml.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: resolve_api_key(toml_config),
            timeout: Duration::from_secs(
                args.completion_timeout_secs
                    .or(completion_toml.timeout_secs)
                    .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_SECS),
            ),
        };

        Self {
            data_dir,
            bind,
            completion,
        }
    }
}

/// Resolve the completion API key
///
/// **Priority:** ENV (`OPENAI_API_KEY`, then `OPEN_API_KEY`) → TOML
///
/// A missing key is not fatal: the service starts and every completion
/// call fails with `CompletionError::NotConfigured`.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = API_KEY_ENV_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .filter(|key| common_config::is_valid_key(key))
            .map(|key| (*var, key))
    });

    let toml_key = toml_config
        .completion
        .api_key
        .clone()
        .filter(|key| common_config::is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Completion API key found in environment and TOML config. Using environment.");
    }

    if let Some((var, key)) = env_key {
        info!("Completion API key loaded from environment variable {}", var);
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Completion API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "Completion API key not configured. Column mapping and enrichment are disabled.\n\
         Configure using one of:\n\
         1. Environment: OPENAI_API_KEY=your-key-here\n\
         2. TOML config: [completion] api_key = \"your-key\""
    );
    None
}
