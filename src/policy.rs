//! Attribute and style whitelists used when cloning SVG elements.
//!
//! The built-in tables list the SVG attributes copied verbatim, the CSS
//! properties whose resolved values are inlined, and the subset of those
//! properties that cascade from ancestors.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

/// SVG attributes that are always copied onto a clone.
pub const SVG_ATTRIBUTES: &[&str] = &[
    // Core
    "id",
    "xml:base",
    "xml:lang",
    "xml:space",
    // Primitive
    "height",
    "result",
    "width",
    "x",
    "y",
    // Links
    "href",
    "xlink:href",
    "style",
    "class",
    // Path
    "d",
    "pathLength",
    // Text
    "dx",
    "dy",
    "glyphRef",
    "format",
    "rotate",
    "textLength",
    // Lines and shapes
    "x1",
    "y1",
    "x2",
    "y2",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "fx",
    "fy",
    "points",
    // Markers and masks
    "refX",
    "refY",
    "orient",
    "markerUnits",
    "markerWidth",
    "markerHeight",
    "maskUnits",
    // Gradients
    "offset",
    "gradientUnits",
    "gradientTransform",
    "spreadMethod",
    // Container
    "transform",
    "viewBox",
    "version",
    "preserveAspectRatio",
    "xmlns",
];

/// CSS properties inlined onto each cloned node, with the value an
/// unstyled element computes for them. An empty initial value means the
/// property has no fixed default (shorthands and UA-dependent values).
pub const SVG_STYLES: &[(&str, &str)] = &[
    ("alignment-baseline", "auto"),
    ("baseline-shift", "baseline"),
    ("clip", "auto"),
    ("clip-path", "none"),
    ("clip-rule", "nonzero"),
    ("color", "black"),
    ("color-interpolation", "sRGB"),
    ("color-interpolation-filters", "linearRGB"),
    ("color-profile", "auto"),
    ("color-rendering", "auto"),
    ("cursor", "auto"),
    ("direction", "ltr"),
    ("display", "inline"),
    ("dominant-baseline", "auto"),
    ("enable-background", ""),
    ("fill", "black"),
    ("fill-opacity", "1"),
    ("fill-rule", "nonzero"),
    ("filter", "none"),
    ("flood-color", "black"),
    ("flood-opacity", "1"),
    ("font", ""),
    ("font-family", ""),
    ("font-size", "medium"),
    ("font-size-adjust", "none"),
    ("font-stretch", "normal"),
    ("font-style", "normal"),
    ("font-variant", "normal"),
    ("font-weight", "normal"),
    ("glyph-orientation-horizontal", "0deg"),
    ("glyph-orientation-vertical", "auto"),
    ("image-rendering", "auto"),
    ("kerning", "auto"),
    ("letter-spacing", "normal"),
    ("lighting-color", "white"),
    ("marker", ""),
    ("marker-end", "none"),
    ("marker-mid", "none"),
    ("marker-start", "none"),
    ("mask", "none"),
    ("opacity", "1"),
    ("overflow", "visible"),
    ("paint-order", "normal"),
    ("pointer-events", "visiblePainted"),
    ("shape-rendering", "auto"),
    ("stop-color", "black"),
    ("stop-opacity", "1"),
    ("stroke", "none"),
    ("stroke-dasharray", "none"),
    ("stroke-dashoffset", "0"),
    ("stroke-linecap", "butt"),
    ("stroke-linejoin", "miter"),
    ("stroke-miterlimit", "4"),
    ("stroke-opacity", "1"),
    ("stroke-width", "1"),
    ("text-anchor", "start"),
    ("text-decoration", "none"),
    ("text-rendering", "auto"),
    ("unicode-bidi", "normal"),
    ("visibility", "visible"),
    ("word-spacing", "normal"),
    ("writing-mode", "lr-tb"),
];

/// Properties that cascade from parent to child.
pub const INHERITABLE: &[&str] = &[
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cursor",
    "direction",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "image-rendering",
    "kerning",
    "letter-spacing",
    "marker",
    "marker-end",
    "marker-mid",
    "marker-start",
    "pointer-events",
    "shape-rendering",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-rendering",
    "visibility",
    "word-spacing",
    "writing-mode",
];

static SHARED: LazyLock<Arc<Policy>> = LazyLock::new(|| Arc::new(Policy::builtin()));

/// Initial value of a known CSS property, `None` for unknown properties and
/// properties without a fixed default.
pub fn initial_value(property: &str) -> Option<&'static str> {
    SVG_STYLES
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, value)| *value)
        .filter(|value| !value.is_empty())
}

/// Whether a CSS property may also be given as an SVG attribute.
pub fn is_presentation_attribute(property: &str) -> bool {
    SVG_STYLES.iter().any(|(name, _)| *name == property)
}

/// Whether a CSS property cascades from ancestors.
pub fn is_inheritable(property: &str) -> bool {
    INHERITABLE.contains(&property)
}

/// Whitelists applied by one exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    attributes: BTreeSet<String>,
    styles: BTreeSet<String>,
    inheritable: BTreeSet<String>,
}

impl Policy {
    /// Build the default policy from the static tables.
    ///
    /// Inheritable properties are always inlineable, so they are merged into
    /// the style set here.
    pub fn builtin() -> Self {
        let mut policy = Self::new(
            SVG_ATTRIBUTES.iter().copied(),
            SVG_STYLES.iter().map(|(name, _)| *name),
        );
        policy
            .styles
            .extend(INHERITABLE.iter().map(|name| name.to_string()));
        policy
    }

    /// Process-wide default, built on first use and never mutated.
    pub fn shared() -> Arc<Policy> {
        SHARED.clone()
    }

    pub fn new<A, S>(attributes: A, styles: S) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            styles: styles.into_iter().map(Into::into).collect(),
            inheritable: INHERITABLE.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Copy of this policy with either whitelist replaced.
    pub fn with_overrides(&self, attrs: Option<&[String]>, styles: Option<&[String]>) -> Self {
        let mut policy = self.clone();
        if let Some(attrs) = attrs {
            policy.attributes = attrs.iter().cloned().collect();
        }
        if let Some(styles) = styles {
            policy.styles = styles.iter().cloned().collect();
        }
        policy
    }

    /// Whether an attribute survives cloning. Namespaced attributes such as
    /// `xlink:href` are always kept so cross-references keep working.
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name) || self.styles.contains(name) || name.contains(':')
    }

    /// Properties to resolve and inline, in a stable order.
    pub fn styles(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    pub fn is_inheritable(&self, property: &str) -> bool {
        self.inheritable.contains(property)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_inheritable_styles() {
        let policy = Policy::builtin();
        let styles: BTreeSet<&str> = policy.styles().collect();
        for name in INHERITABLE {
            assert!(styles.contains(name), "{name} should be inlineable");
        }
    }

    #[test]
    fn test_allows_whitelisted_and_namespaced_attributes() {
        let policy = Policy::builtin();
        assert!(policy.allows_attribute("viewBox"));
        assert!(policy.allows_attribute("fill"));
        assert!(policy.allows_attribute("xlink:href"));
        assert!(policy.allows_attribute("inkscape:label"));
        assert!(!policy.allows_attribute("onclick"));
        assert!(!policy.allows_attribute("data-value"));
    }

    #[test]
    fn test_overrides_leave_shared_default_intact() {
        let shared = Policy::shared();
        let custom = shared.with_overrides(Some(&["data-value".to_string()]), None);

        assert!(custom.allows_attribute("data-value"));
        assert!(!custom.allows_attribute("viewBox"));
        assert!(custom.allows_attribute("fill"));

        assert!(!Policy::shared().allows_attribute("data-value"));
        assert_eq!(*Policy::shared(), Policy::builtin());
    }

    #[test]
    fn test_style_override_replaces_set() {
        let custom = Policy::builtin().with_overrides(None, Some(&["fill".to_string()]));
        assert_eq!(custom.styles().collect::<Vec<_>>(), vec!["fill"]);
    }

    #[test]
    fn test_initial_value() {
        assert_eq!(initial_value("fill"), Some("black"));
        assert_eq!(initial_value("stroke"), Some("none"));
        assert_eq!(initial_value("font-family"), None);
        assert_eq!(initial_value("not-a-property"), None);
    }

    #[test]
    fn test_is_inheritable() {
        assert!(is_inheritable("fill"));
        assert!(is_inheritable("font-size"));
        assert!(!is_inheritable("opacity"));
        assert!(!is_inheritable("display"));
    }
}
