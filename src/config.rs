use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Exporter configuration loaded from a YAML file.
///
/// ```yaml
/// attrs: [id, viewBox, width, height]
/// styles: [fill, stroke]
/// capabilities:
///   base64: false
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Attribute whitelist; the built-in table when omitted
    #[serde(default)]
    pub attrs: Option<Vec<String>>,

    /// Style whitelist; the built-in table when omitted
    #[serde(default)]
    pub styles: Option<Vec<String>>,

    /// Host capabilities, resolved once and injected into the exporter
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Optional host features. A missing feature selects a fallback instead of
/// failing.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Data URIs are base64 encoded; otherwise percent-encoded
    #[serde(default = "enabled")]
    pub base64: bool,

    /// The save trigger accepts binary blobs; otherwise it gets a data URI
    #[serde(default = "enabled")]
    pub binary_save: bool,

    /// Rasterized images can be extracted as bitmaps; otherwise raster
    /// exports deliver nothing
    #[serde(default = "enabled")]
    pub bitmap_extraction: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            base64: true,
            binary_save: true,
            bitmap_extraction: true,
        }
    }
}

impl ExportConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load from `path` if given, falling back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    custom_attrs = config.attrs.is_some(),
                    custom_styles = config.styles.is_some(),
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to load config, using defaults");
                Self::default()
            }
        }
    }
}
