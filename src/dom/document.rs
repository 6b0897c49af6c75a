use scraper::{ElementRef, Html, Node, Selector};
use std::fmt;

use super::css;
use super::{HostDocument, SourceChild, SourceNode};
use crate::policy;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A compiled stylesheet rule.
struct StyleRule {
    selector: Selector,
    declarations: Vec<(String, String)>,
}

/// A parsed HTML or SVG document together with the rules of its `<style>`
/// elements.
pub struct Document {
    html: Html,
    rules: Vec<StyleRule>,
}

impl Document {
    /// Parse an HTML page or a standalone SVG file.
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let rules = collect_rules(&html);
        tracing::debug!(rules = rules.len(), "Parsed host document");
        Self { html, rules }
    }

    /// First element in the whole document matching a selector.
    pub fn select_first(&self, selector: &str) -> Option<DocNode<'_>> {
        let selector = Selector::parse(selector).ok()?;
        self.html.select(&selector).next().map(|el| self.node(el))
    }

    fn node<'a>(&'a self, el: ElementRef<'a>) -> DocNode<'a> {
        DocNode { doc: self, el }
    }

    fn cascade(&self, el: ElementRef<'_>, property: &str) -> Option<String> {
        match self.declared(el, property) {
            Some(value) if value == "inherit" => self.inherited(el, property),
            Some(value) if value == "initial" => initial(property),
            Some(value) => Some(value),
            None if policy::is_inheritable(property) => self.inherited(el, property),
            None => initial(property),
        }
    }

    fn inherited(&self, el: ElementRef<'_>, property: &str) -> Option<String> {
        match el.parent().and_then(ElementRef::wrap) {
            Some(parent) => self.cascade(parent, property),
            None => initial(property),
        }
    }

    /// Declared value: inline style, then stylesheet rules (later wins),
    /// then the SVG presentation attribute.
    fn declared(&self, el: ElementRef<'_>, property: &str) -> Option<String> {
        let element = el.value();

        if let Some(style) = element.attr("style") {
            let inline = css::parse_declarations(style)
                .into_iter()
                .rev()
                .find(|(name, _)| name == property);
            if let Some((_, value)) = inline {
                return Some(value);
            }
        }

        let from_rules = self
            .rules
            .iter()
            .rev()
            .filter(|rule| rule.selector.matches(&el))
            .find_map(|rule| {
                rule.declarations
                    .iter()
                    .rev()
                    .find(|(name, _)| name == property)
                    .map(|(_, value)| value.clone())
            });
        if from_rules.is_some() {
            return from_rules;
        }

        let ns: &str = &element.name.ns;
        if ns == SVG_NAMESPACE && policy::is_presentation_attribute(property) {
            return element
                .attr(property)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned);
        }

        None
    }
}

fn initial(property: &str) -> Option<String> {
    policy::initial_value(property).map(str::to_owned)
}

fn collect_rules(html: &Html) -> Vec<StyleRule> {
    let Ok(style) = Selector::parse("style") else {
        return Vec::new();
    };

    html.select(&style)
        .flat_map(|el| css::parse_stylesheet(&el.text().collect::<String>()))
        .filter_map(|raw| match Selector::parse(&raw.selector) {
            Ok(selector) => Some(StyleRule {
                selector,
                declarations: raw.declarations,
            }),
            Err(_) => {
                tracing::debug!(selector = %raw.selector, "Skipping unsupported selector");
                None
            }
        })
        .collect()
}

impl HostDocument for Document {
    type Node<'a>
        = DocNode<'a>
    where
        Self: 'a;

    fn body(&self) -> Option<DocNode<'_>> {
        self.select_first("body")
            .or_else(|| Some(self.node(self.html.root_element())))
    }
}

/// An element of a [`Document`].
#[derive(Clone, Copy)]
pub struct DocNode<'a> {
    doc: &'a Document,
    el: ElementRef<'a>,
}

impl fmt::Debug for DocNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocNode").field("tag", &self.tag()).finish()
    }
}

impl SourceNode for DocNode<'_> {
    fn tag(&self) -> &str {
        self.el.value().name()
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.el
            .value()
            .attrs
            .iter()
            .map(|(name, value)| {
                let local: &str = &name.local;
                let qualified = match name.prefix.as_deref() {
                    Some(prefix) => format!("{prefix}:{local}"),
                    None => local.to_string(),
                };
                (qualified, String::from(&**value))
            })
            .collect()
    }

    fn children(&self) -> Vec<SourceChild<Self>> {
        self.el
            .children()
            .map(|child| match child.value() {
                Node::Element(_) => ElementRef::wrap(child)
                    .map(|el| SourceChild::Element(self.doc.node(el)))
                    .unwrap_or(SourceChild::Skipped),
                Node::Text(text) => SourceChild::Text(String::from(&**text)),
                _ => SourceChild::Skipped,
            })
            .collect()
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        self.doc.cascade(self.el, property)
    }

    fn select_first(&self, selector: &str) -> Option<Self> {
        let selector = Selector::parse(selector).ok()?;
        let own_id = self.el.id();
        self.el
            .select(&selector)
            .find(|el| el.id() != own_id)
            .map(|el| self.doc.node(el))
    }
}
