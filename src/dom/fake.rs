//! In-memory [`SourceNode`] for unit tests.
//!
//! Computed styles are whatever the test sets; anything unset falls back to
//! the initial value. Only bare tag selectors are supported.

use std::collections::BTreeMap;

use super::{HostDocument, SourceChild, SourceNode};
use crate::policy;

#[derive(Debug, Clone)]
pub(crate) enum FakeChild {
    Element(FakeNode),
    Text(String),
    Comment,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub styles: BTreeMap<String, String>,
    pub children: Vec<FakeChild>,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, child: FakeNode) -> Self {
        self.children.push(FakeChild::Element(child));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(FakeChild::Text(text.to_string()));
        self
    }

    pub fn comment(mut self) -> Self {
        self.children.push(FakeChild::Comment);
        self
    }
}

impl SourceNode for FakeNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.attrs.clone()
    }

    fn children(&self) -> Vec<SourceChild<Self>> {
        self.children
            .iter()
            .map(|child| match child {
                FakeChild::Element(node) => SourceChild::Element(node.clone()),
                FakeChild::Text(text) => SourceChild::Text(text.clone()),
                FakeChild::Comment => SourceChild::Skipped,
            })
            .collect()
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        self.styles
            .get(property)
            .cloned()
            .or_else(|| policy::initial_value(property).map(str::to_owned))
    }

    fn select_first(&self, selector: &str) -> Option<Self> {
        self.children.iter().find_map(|child| match child {
            FakeChild::Element(node) if node.tag == selector => Some(node.clone()),
            FakeChild::Element(node) => node.select_first(selector),
            _ => None,
        })
    }
}

/// A document whose body is a single fake node.
pub(crate) struct FakeDocument {
    pub body: Option<FakeNode>,
}

impl HostDocument for FakeDocument {
    type Node<'a>
        = FakeNode
    where
        Self: 'a;

    fn body(&self) -> Option<FakeNode> {
        self.body.clone()
    }
}
