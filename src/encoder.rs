//! Markup, blob and data URI forms of a cleaned SVG element.

use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::cloner::{clone_svg, CleanElement, CleanNode};
use crate::config::Capabilities;
use crate::dom::SourceNode;
use crate::error::RasterError;
use crate::policy::Policy;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
/// Namespace URI stem for attribute prefixes without a known namespace.
pub const UNKNOWN_NAMESPACE_PREFIX: &str = "urn:x-svg-export:";

/// Fallback root dimensions; some renderers refuse SVGs without them.
pub const DEFAULT_WIDTH: &str = "500";
pub const DEFAULT_HEIGHT: &str = "900";

pub const SVG_MIME: &str = "text/xml";
pub const DATA_URI_PREFIX: &str = "data:image/svg+xml";

/// Characters left alone by JavaScript's `encodeURIComponent`.
pub const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Binary payload tagged with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Clone `source` and make the root standalone: SVG namespace, version,
/// prefix declarations and explicit dimensions.
pub fn prepare<N: SourceNode>(source: &N, policy: &Policy) -> CleanElement {
    let mut root = clone_svg(source, policy);

    root.remove_attribute("xmlns");
    root.remove_attribute("version");
    root.attributes
        .insert(0, ("xmlns".to_string(), SVG_NAMESPACE.to_string()));
    root.attributes
        .insert(1, ("version".to_string(), "1.1".to_string()));
    declare_prefixes(&mut root);

    for (name, fallback) in [("width", DEFAULT_WIDTH), ("height", DEFAULT_HEIGHT)] {
        if root.attribute(name).map_or(true, |v| v.trim().is_empty()) {
            root.set_attribute(name, fallback);
        }
    }

    root
}

/// Declare on the root every attribute prefix the subtree uses without a
/// root declaration. Attributes that are not valid qualified names are
/// dropped.
fn declare_prefixes(root: &mut CleanElement) {
    root.retain_attributes(&is_qualified_name);

    let mut position = 2;
    for prefix in root.prefixes() {
        let declaration = format!("xmlns:{prefix}");
        if prefix == "xml" || prefix == "xmlns" || root.attribute(&declaration).is_some() {
            continue;
        }
        let namespace = namespace_for_prefix(&prefix);
        root.attributes.insert(position, (declaration, namespace));
        position += 1;
    }
}

fn namespace_for_prefix(prefix: &str) -> String {
    let known = match prefix {
        "xlink" => XLINK_NAMESPACE,
        "inkscape" => "http://www.inkscape.org/namespaces/inkscape",
        "sodipodi" => "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
        "rdf" => "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
        "cc" => "http://creativecommons.org/ns#",
        "dc" => "http://purl.org/dc/elements/1.1/",
        "sketch" => "http://www.bohemiancoding.com/sketch/ns",
        "serif" => "http://www.serif.com/",
        _ => return format!("{UNKNOWN_NAMESPACE_PREFIX}{prefix}"),
    };
    known.to_string()
}

/// `prefix:local` or `local`, each part an XML name without colons.
fn is_qualified_name(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    }
}

fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Cleaned outer markup of `source`.
pub fn serialize<N: SourceNode>(source: &N, policy: &Policy) -> String {
    to_markup(&prepare(source, policy))
}

pub fn to_markup(root: &CleanElement) -> String {
    let mut out = String::new();
    write_element(&mut out, root);
    out
}

fn write_element(out: &mut String, el: &CleanElement) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attributes {
        write_attribute(out, name, value);
    }
    if !el.style.is_empty() {
        let style = el
            .style
            .iter()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        write_attribute(out, "style", &style);
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &el.children {
        match child {
            CleanNode::Element(child) => write_element(out, child),
            CleanNode::Text(text) => out.push_str(&escape_text(text)),
        }
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

pub fn to_blob(markup: &str) -> Blob {
    Blob {
        bytes: markup.as_bytes().to_vec(),
        mime: SVG_MIME,
    }
}

/// `data:image/svg+xml;base64,...` when the host has a base64 codec,
/// otherwise the percent-encoded form.
pub fn to_data_uri(markup: &str, capabilities: &Capabilities) -> String {
    if capabilities.base64 {
        let encoded = base64::engine::general_purpose::STANDARD.encode(markup.as_bytes());
        format!("{DATA_URI_PREFIX};base64,{encoded}")
    } else {
        let encoded = utf8_percent_encode(markup, URI_COMPONENT);
        format!("{DATA_URI_PREFIX},{encoded}")
    }
}

/// Payload bytes of a `data:` URI, base64 or percent-encoded.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, RasterError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RasterError::DataUri("missing data: scheme".to_string()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| RasterError::DataUri("missing comma".to_string()))?;

    if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| RasterError::DataUri(e.to_string()))
    } else {
        Ok(percent_decode_str(data).collect())
    }
}
