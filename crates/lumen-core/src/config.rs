//! Configuration for the model endpoint
//!
//! Settings are resolved in layers, highest priority first:
//! 1. Explicit overrides (CLI flags)
//! 2. Environment variables (`OLLAMA_API_URL` / `OLLAMA_HOST`, `OLLAMA_MODEL`,
//!    `OLLAMA_TIMEOUT_SECS`)
//! 3. TOML config file (`--config`, else `~/.local/share/lumen/config.toml`)
//! 4. Built-in defaults
//!
//! Missing settings never fail startup. Each one that falls back to a default is
//! recorded in [`ResolvedConfig::defaulted`] so it can be reported.
//!
//! ```toml
//! [ollama]
//! api_url = "http://gpu-box:11434"
//! model = "llama3.2"
//! timeout_secs = 90
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default model endpoint when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:11434";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "llama2";

/// Default request timeout for a single generate call
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw (unresolved) configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LumenConfig {
    #[serde(default)]
    pub ollama: OllamaSection,
}

/// `[ollama]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaSection {
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// A setting that was not configured anywhere and fell back to its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultedSetting {
    ApiUrl,
    Model,
    TimeoutSecs,
}

impl DefaultedSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiUrl => "api_url",
            Self::Model => "model",
            Self::TimeoutSecs => "timeout_secs",
        }
    }

    /// The value substituted for this setting
    pub fn default_value(&self) -> String {
        match self {
            Self::ApiUrl => DEFAULT_API_URL.to_string(),
            Self::Model => DEFAULT_MODEL.to_string(),
            Self::TimeoutSecs => DEFAULT_TIMEOUT_SECS.to_string(),
        }
    }
}

/// Fully resolved configuration, ready to build a backend from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Settings that fell back to defaults (in resolution order)
    pub defaulted: Vec<DefaultedSetting>,
}

impl LumenConfig {
    /// Load the config file
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// only if a file is present there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                debug!(path = %p.display(), "Loaded config file");
                Self::from_toml_str(&content)
            }
            None => match default_config_path() {
                Some(p) if p.exists() => Self::load(Some(&p)),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse config from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        if config.ollama.timeout_secs == Some(0) {
            return Err(Error::Config(
                "ollama.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(config)
    }

    /// Apply environment variables on top of the file values
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply variables from an arbitrary lookup (tests use a map instead of the process env)
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("OLLAMA_API_URL").or_else(|| get("OLLAMA_HOST")) {
            self.ollama.api_url = Some(url);
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.ollama.model = Some(model);
        }
        if let Some(raw) = get("OLLAMA_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.ollama.timeout_secs = Some(secs),
                _ => warn!(value = %raw, "Ignoring invalid OLLAMA_TIMEOUT_SECS"),
            }
        }
        self
    }

    /// Apply command-line overrides (highest priority)
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(url) = non_empty(overrides.api_url.as_deref()) {
            self.ollama.api_url = Some(url);
        }
        if let Some(model) = non_empty(overrides.model.as_deref()) {
            self.ollama.model = Some(model);
        }
        match overrides.timeout_secs {
            Some(0) => warn!("Ignoring timeout override of 0 seconds"),
            Some(secs) => self.ollama.timeout_secs = Some(secs),
            None => {}
        }
        self
    }

    /// Fill in defaults and record which ones were used
    pub fn resolve(self) -> ResolvedConfig {
        let mut defaulted = Vec::new();

        let api_url = match non_empty(self.ollama.api_url.as_deref()) {
            Some(url) => normalize_base_url(&url),
            None => {
                defaulted.push(DefaultedSetting::ApiUrl);
                DEFAULT_API_URL.to_string()
            }
        };

        let model = match non_empty(self.ollama.model.as_deref()) {
            Some(model) => model,
            None => {
                defaulted.push(DefaultedSetting::Model);
                DEFAULT_MODEL.to_string()
            }
        };

        let timeout_secs = match self.ollama.timeout_secs {
            Some(secs) if secs > 0 => secs,
            _ => {
                defaulted.push(DefaultedSetting::TimeoutSecs);
                DEFAULT_TIMEOUT_SECS
            }
        };

        ResolvedConfig {
            api_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
            defaulted,
        }
    }
}

impl ResolvedConfig {
    /// Resolve from an optional config file, environment and CLI overrides
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Ok(LumenConfig::load(path)?
            .apply_env()
            .apply_overrides(overrides)
            .resolve())
    }

    /// Whether a setting fell back to its default
    pub fn is_defaulted(&self, setting: DefaultedSetting) -> bool {
        self.defaulted.contains(&setting)
    }

    /// Log every defaulted setting: WARN for endpoint and model, DEBUG for timeout
    pub fn warn_defaults(&self) {
        for setting in &self.defaulted {
            match setting {
                DefaultedSetting::TimeoutSecs => debug!(
                    setting = setting.as_str(),
                    value = %setting.default_value(),
                    "Using default setting"
                ),
                _ => warn!(
                    setting = setting.as_str(),
                    value = %setting.default_value(),
                    "⚠️  Model setting not configured, using default"
                ),
            }
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("lumen").join("config.toml"))
}

/// Trim a base URL, drop trailing slashes and make sure it has a scheme
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        debug!(url = %trimmed, "Adding http:// scheme to API URL");
        format!("http://{}", trimmed)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
