//! Read-only view of a host document.
//!
//! The cloner and the locator only talk to [`SourceNode`] and
//! [`HostDocument`]; [`Document`] implements them on top of `scraper`.

pub mod css;
pub mod document;

#[cfg(test)]
pub(crate) mod fake;

pub use document::{DocNode, Document};

use crate::policy;

/// A child of a source element, as seen by the cloner.
#[derive(Debug, Clone)]
pub enum SourceChild<N> {
    Element(N),
    Text(String),
    /// Comments, processing instructions, doctypes and fragments.
    Skipped,
}

/// An element in a host document.
pub trait SourceNode: Clone {
    /// Local tag name, e.g. `svg` or `linearGradient`.
    fn tag(&self) -> &str;

    /// Attributes as `(name, value)` pairs in source order. Namespaced
    /// attributes are reported as `prefix:local`.
    fn attributes(&self) -> Vec<(String, String)>;

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn children(&self) -> Vec<SourceChild<Self>>;

    /// Resolved value of a CSS property after the cascade.
    fn computed_style(&self, property: &str) -> Option<String>;

    /// Value the property would resolve to on an unstyled element with the
    /// same tag.
    fn baseline_style(&self, property: &str) -> Option<String> {
        policy::initial_value(property).map(str::to_owned)
    }

    /// First descendant matching a CSS selector.
    fn select_first(&self, selector: &str) -> Option<Self>;

    fn is_svg(&self) -> bool {
        self.tag().eq_ignore_ascii_case("svg")
    }
}

/// A document the locator can search.
pub trait HostDocument {
    type Node<'a>: SourceNode
    where
        Self: 'a;

    /// The element searched when no explicit element is given.
    fn body(&self) -> Option<Self::Node<'_>>;
}
