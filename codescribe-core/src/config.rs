//! Runtime configuration for the model client and the PDF exporter, with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "deepseek-coder:6.7b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_HTML_RENDERER: &str = "wkhtmltopdf";

/// Runtime configuration for the whole pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub export: ExportConfig,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            endpoint = %self.model.endpoint,
            model = %self.model.name,
            timeout_secs = self.model.timeout_secs,
            html_renderer = %self.export.html_renderer.display(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// Where the generation API lives and which model to ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub name: String,
    /// Upper bound on one generation call; `0` waits indefinitely.
    pub timeout_secs: u64,
}

impl ModelConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            name: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Settings for the PDF exporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Executable used to turn HTML into PDF, invoked as `<renderer> <in.html> <out.pdf>`.
    /// A bare name is looked up on `PATH`.
    pub html_renderer: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            html_renderer: PathBuf::from(DEFAULT_HTML_RENDERER),
        }
    }
}
