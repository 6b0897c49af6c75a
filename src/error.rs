use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("SVG element not found: {0}")]
    ElementNotFound(String),

    #[error("Save failed: {0}")]
    Save(#[from] std::io::Error),
}

/// Failures inside the raster pipeline.
///
/// These never reach the caller of an export; the pipeline logs them and
/// skips delivery.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
