//! Embed block configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Configuration shared by every embed block in an editor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Local resource loaded into every sandbox frame; it receives the posted
    /// content message and mounts it.
    pub receiver_path: String,
    /// Charting library made available to script-bearing chart blocks.
    pub chart_library_url: String,
    /// Theme class forwarded to sandboxed content. Empty means the light theme.
    pub theme: String,
    /// Use Cmd instead of Ctrl as the primary shortcut modifier.
    pub is_mac: bool,
    /// Delay an idle save after typing instead of saving on every key-up.
    pub save_debounce_ms: Option<u64>,
}

impl EmbedConfig {
    pub const DEFAULT_RECEIVER_PATH: &'static str = "./embed/iframe.html";
    pub const DEFAULT_CHART_LIBRARY: &'static str = "https://cdn.jsdelivr.net/npm/chart.js";

    /// Load configuration from environment variables on top of the defaults.
    ///
    /// Optional env vars:
    /// - `BLOCKEMBED_RECEIVER_PATH`: receiver resource path
    /// - `BLOCKEMBED_CHART_LIB`: charting library URL
    /// - `BLOCKEMBED_THEME`: theme class
    /// - `BLOCKEMBED_SAVE_DEBOUNCE_MS`: idle-save delay in milliseconds
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("BLOCKEMBED_RECEIVER_PATH") {
            config.receiver_path = path;
        }

        if let Ok(url) = std::env::var("BLOCKEMBED_CHART_LIB") {
            config.chart_library_url = url;
        }

        if let Ok(theme) = std::env::var("BLOCKEMBED_THEME") {
            config.theme = theme;
        }

        if let Ok(raw) = std::env::var("BLOCKEMBED_SAVE_DEBOUNCE_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnv {
                    var: "BLOCKEMBED_SAVE_DEBOUNCE_MS",
                    message: e.to_string(),
                })?;
            config.save_debounce_ms = Some(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that URL-valued settings parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.chart_library_url).map_err(|e| ConfigError::UrlParse {
            url: self.chart_library_url.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            receiver_path: Self::DEFAULT_RECEIVER_PATH.to_string(),
            chart_library_url: Self::DEFAULT_CHART_LIBRARY.to_string(),
            theme: String::new(),
            is_mac: false,
            save_debounce_ms: None,
        }
    }
}
