//! svg-export
//!
//! Export SVG elements from HTML or SVG documents as self-contained SVG
//! markup, SVG files or PNG files.

pub mod cloner;
pub mod config;
pub mod dom;
pub mod encoder;
pub mod error;
pub mod exporter;
pub mod locator;
pub mod policy;
pub mod raster;
pub mod save;

pub use config::{Capabilities, ExportConfig};
pub use dom::Document;
pub use error::ExportError;
pub use exporter::Exporter;
pub use locator::Target;
