//! Resolve what the caller passed to a concrete SVG element, and derive
//! default file names from it.

use percent_encoding::utf8_percent_encode;

use crate::dom::{HostDocument, SourceNode};
use crate::encoder::URI_COMPONENT;
use crate::error::ExportError;

/// Reference to the element to export.
#[derive(Debug, Clone)]
pub enum Target<N> {
    /// The first SVG element in the document body
    Auto,
    /// A CSS selector searched in the document body
    Selector(String),
    /// An element; if it is not itself an `<svg>`, its first SVG descendant
    Element(N),
}

impl<N> From<&str> for Target<N> {
    fn from(selector: &str) -> Self {
        if selector.is_empty() {
            Target::Auto
        } else {
            Target::Selector(selector.to_string())
        }
    }
}

impl<N> From<Option<&str>> for Target<N> {
    fn from(selector: Option<&str>) -> Self {
        selector.map_or(Target::Auto, Target::from)
    }
}

/// Resolve `target` to exactly one SVG element of `host`.
pub fn locate<'d, H: HostDocument>(
    host: &'d H,
    target: Target<H::Node<'d>>,
) -> Result<H::Node<'d>, ExportError> {
    let (found, description) = match target {
        Target::Auto => (
            host.body().and_then(|body| body.select_first("svg")),
            "svg".to_string(),
        ),
        Target::Selector(selector) if selector.is_empty() => (
            host.body().and_then(|body| body.select_first("svg")),
            "svg".to_string(),
        ),
        Target::Selector(selector) => (
            host.body().and_then(|body| body.select_first(&selector)),
            selector,
        ),
        Target::Element(node) if node.is_svg() => return Ok(node),
        Target::Element(node) => {
            let description = format!("svg inside <{}>", node.tag());
            (node.select_first("svg"), description)
        }
    };

    found.ok_or_else(|| {
        tracing::debug!(target = %description, "Element lookup failed");
        ExportError::ElementNotFound(description)
    })
}

/// Default download name: the element's `title` (or `untitled`) plus
/// `extension`, URI-encoded.
pub fn default_filename<N: SourceNode>(node: &N, extension: &str) -> String {
    let stem = node
        .attribute("title")
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "untitled".to_string());
    encode_filename(&format!("{stem}.{extension}"))
}

/// Percent-encode a file name the way `encodeURIComponent` does.
pub fn encode_filename(name: &str) -> String {
    utf8_percent_encode(name, URI_COMPONENT).to_string()
}
