//! `load_config` module: builds the runtime [`Config`] from an optional YAML file and
//! environment overrides.
//!
//! # Precedence
//! 1. Built-in defaults (local Ollama, `deepseek-coder:6.7b`, `wkhtmltopdf` on `PATH`)
//! 2. The YAML file given with `--config`, if any
//! 3. Environment variables (also read from `.env`):
//!    - `CODESCRIBE_OLLAMA_URL`
//!    - `CODESCRIBE_MODEL`
//!    - `CODESCRIBE_TIMEOUT_SECS` (`0` disables the limit)
//!    - `CODESCRIBE_HTML_RENDERER`
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.
//!
//! Accepted YAML:
//! ```yaml
//! model:
//!   endpoint: http://localhost:11434
//!   name: deepseek-coder:6.7b
//!   timeout_secs: 300
//! export:
//!   html_renderer: /usr/local/bin/wkhtmltopdf
//! ```
use anyhow::Result;
use codescribe_core::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ENV_ENDPOINT: &str = "CODESCRIBE_OLLAMA_URL";
pub const ENV_MODEL: &str = "CODESCRIBE_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "CODESCRIBE_TIMEOUT_SECS";
pub const ENV_HTML_RENDERER: &str = "CODESCRIBE_HTML_RENDERER";

/// Loads the YAML config file (if given) and applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn read_config_file(path_ref: &Path) -> Result<Config> {
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(Config::default());
    }

    match serde_yaml::from_str::<Config>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Overrides config fields from the `CODESCRIBE_*` environment variables.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(endpoint) = env_value(ENV_ENDPOINT) {
        info!(endpoint = %endpoint, "Model endpoint overridden from env");
        config.model.endpoint = endpoint;
    }
    if let Some(model) = env_value(ENV_MODEL) {
        info!(model = %model, "Model name overridden from env");
        config.model.name = model;
    }
    if let Some(raw) = env_value(ENV_TIMEOUT_SECS) {
        config.model.timeout_secs = match raw.parse::<u64>() {
            Ok(secs) => secs,
            Err(e) => {
                error!(error = ?e, var = %raw, "{ENV_TIMEOUT_SECS} must be a valid integer");
                anyhow::bail!("{ENV_TIMEOUT_SECS} must be a valid integer: {e}");
            }
        };
    }
    if let Some(renderer) = env_value(ENV_HTML_RENDERER) {
        info!(renderer = %renderer, "HTML renderer overridden from env");
        config.export.html_renderer = PathBuf::from(renderer);
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
