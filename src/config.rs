use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::language::Language;

/// Environment variable that overrides `[backend].base_url`.
pub const API_URL_ENV: &str = "BOOKCHAT_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout. Unset means the transport decides.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WidgetConfig {
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_min_chars() -> usize {
    10
}
fn default_max_chars() -> usize {
    2000
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Backend base URL with the environment override applied and any
    /// trailing slash removed.
    pub fn api_base_url(&self) -> String {
        let raw = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.backend.base_url.clone());
        raw.trim().trim_end_matches('/').to_string()
    }

    fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "backend.base_url must start with http:// or https:// (got '{}')",
                url
            );
        }
        if self.backend.timeout_secs == Some(0) {
            anyhow::bail!("backend.timeout_secs must be > 0 when set");
        }
        if self.selection.min_chars == 0 {
            anyhow::bail!("selection.min_chars must be >= 1");
        }
        if self.selection.max_chars < self.selection.min_chars {
            anyhow::bail!(
                "selection.max_chars ({}) must be >= selection.min_chars ({})",
                self.selection.max_chars,
                self.selection.min_chars
            );
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}
