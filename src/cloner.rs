//! Deep copy of an SVG subtree with resolved styles inlined.

use std::collections::{BTreeMap, BTreeSet};

use crate::dom::css;
use crate::dom::{SourceChild, SourceNode};
use crate::policy::{self, Policy};

/// A node of a detached, cleaned SVG tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanNode {
    Element(CleanElement),
    Text(String),
}

/// A cleaned element: whitelisted attributes plus inline style
/// declarations. Owns its subtree; nothing points back into the source
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
    pub children: Vec<CleanNode>,
}

impl CleanElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an attribute in place, or append it.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(n, _)| n == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline declaration, replacing an earlier one for the same
    /// property.
    pub fn set_style(&mut self, property: &str, value: &str) {
        match self.style.iter_mut().find(|(n, _)| n == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &CleanElement> {
        self.children.iter().filter_map(|child| match child {
            CleanNode::Element(el) => Some(el),
            CleanNode::Text(_) => None,
        })
    }

    /// Namespace prefixes of every attribute in the subtree.
    pub fn prefixes(&self) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.collect_prefixes(&mut found);
        found
    }

    fn collect_prefixes(&self, found: &mut BTreeSet<String>) {
        for (name, _) in &self.attributes {
            if let Some((prefix, _)) = name.split_once(':') {
                found.insert(prefix.to_string());
            }
        }
        for el in self.elements() {
            el.collect_prefixes(found);
        }
    }

    /// Keep only the attributes whose name passes `keep`, in the whole subtree.
    pub fn retain_attributes(&mut self, keep: &impl Fn(&str) -> bool) {
        self.attributes.retain(|(name, _)| keep(name));
        for child in &mut self.children {
            if let CleanNode::Element(el) = child {
                el.retain_attributes(keep);
            }
        }
    }
}

/// Resolved values of the whitelisted properties on one source element.
type Resolved = BTreeMap<String, String>;

/// Clone `source` and its subtree into a self-contained [`CleanElement`].
pub fn clone_svg<N: SourceNode>(source: &N, policy: &Policy) -> CleanElement {
    clone_element(source, None, policy)
}

fn clone_element<N: SourceNode>(
    source: &N,
    parent: Option<&Resolved>,
    policy: &Policy,
) -> CleanElement {
    let mut clean = CleanElement::new(source.tag());

    for (name, value) in source.attributes() {
        if !policy.allows_attribute(&name) {
            continue;
        }
        if name == "style" {
            // Merged with the resolved declarations below
            clean.style = css::parse_declarations(&value);
        } else {
            clean.attributes.push((name, value));
        }
    }

    let mut resolved = Resolved::new();
    for property in policy.styles() {
        let Some(value) = source.computed_style(property) else {
            continue;
        };
        if rendered_without_inline(&clean, source, property, parent, policy).as_deref()
            != Some(value.as_str())
        {
            clean.set_style(property, &value);
        }
        resolved.insert(property.to_string(), value);
    }

    for child in source.children() {
        match child {
            SourceChild::Element(node) => clean.children.push(CleanNode::Element(clone_element(
                &node,
                Some(&resolved),
                policy,
            ))),
            SourceChild::Text(text) => clean.children.push(CleanNode::Text(text)),
            SourceChild::Skipped => {}
        }
    }

    clean
}

/// What the detached clone would render for `property` if no declaration
/// were added: its own style or presentation attribute, the value inherited
/// from the cloned parent, or the unstyled baseline.
fn rendered_without_inline<N: SourceNode>(
    clean: &CleanElement,
    source: &N,
    property: &str,
    parent: Option<&Resolved>,
    policy: &Policy,
) -> Option<String> {
    if let Some(value) = clean.style_value(property) {
        return Some(value.to_string());
    }
    if policy::is_presentation_attribute(property) {
        if let Some(value) = clean.attribute(property) {
            return Some(value.trim().to_string());
        }
    }
    if policy.is_inheritable(property) {
        if let Some(value) = parent.and_then(|p| p.get(property)) {
            return Some(value.clone());
        }
    }
    source.baseline_style(property)
}
