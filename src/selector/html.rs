//! `scraper`-backed selector engine.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::xpath::translate;
use super::{Element, Node, SelectorEngine, SelectorFactory};
use crate::error_handling::QueryError;
use crate::utils::parse_selector;

// Trailing `::attr(name)` or `::text` pseudo-element
const PSEUDO_ELEMENT_PATTERN: &str = r"^(.*?)::(?:attr\(\s*([^)\s]+)\s*\)|(text))\s*$";

static PSEUDO_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(PSEUDO_ELEMENT_PATTERN)
        .expect("Failed to compile pseudo-element regex - this is a bug")
});

/// What to extract from each matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pseudo {
    /// The value of one attribute
    Attr(String),
    /// The element's own text nodes
    Text,
}

/// Splits `a.next::attr(href)` into `a.next` and the pseudo-element.
pub(crate) fn split_pseudo(query: &str) -> (&str, Option<Pseudo>) {
    match PSEUDO_ELEMENT.captures(query) {
        Some(caps) => {
            let css = caps.get(1).map_or("", |m| m.as_str());
            let pseudo = match caps.get(2) {
                Some(attr) => Pseudo::Attr(attr.as_str().to_string()),
                None => Pseudo::Text,
            };
            (css, Some(pseudo))
        }
        None => (query, None),
    }
}

/// Selector engine over an HTML document.
///
/// Supports CSS plus the `::attr(name)` and `::text` pseudo-elements, and a
/// path-only subset of XPath that is translated to CSS. `scraper` documents
/// are not `Sync`, so the source is parsed again for each query.
#[derive(Debug, Clone)]
pub struct HtmlSelector {
    source: String,
}

impl HtmlSelector {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn select(&self, css: &str, pseudo: Option<&Pseudo>) -> Result<Vec<Node>, QueryError> {
        let css = if css.trim().is_empty() { ":root" } else { css };
        let selector = parse_selector(css)?;
        let document = Html::parse_document(&self.source);

        let mut nodes = Vec::new();
        for element in document.select(&selector) {
            match pseudo {
                None => nodes.push(Node::Element(to_element(element))),
                Some(Pseudo::Attr(name)) => {
                    if let Some(value) = element.value().attr(name) {
                        nodes.push(Node::Text(value.to_string()));
                    }
                }
                Some(Pseudo::Text) => {
                    nodes.extend(
                        element
                            .children()
                            .filter_map(|child| child.value().as_text())
                            .map(|text| Node::Text((&**text).to_string())),
                    );
                }
            }
        }
        debug!("Query '{css}' matched {} nodes", nodes.len());
        Ok(nodes)
    }
}

fn to_element(element: ElementRef<'_>) -> Element {
    Element::new(
        element.value().name(),
        element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string())),
        element.html(),
    )
}

impl SelectorEngine for HtmlSelector {
    fn css(&self, query: &str) -> Result<Vec<Node>, QueryError> {
        let (css, pseudo) = split_pseudo(query);
        self.select(css, pseudo.as_ref())
    }

    fn xpath(&self, query: &str) -> Result<Vec<Node>, QueryError> {
        let translated = translate(query)?;
        debug!("XPath '{query}' translated to CSS '{}'", translated.css);
        self.select(&translated.css, translated.pseudo.as_ref())
    }
}

/// Default `SelectorFactory`, producing `HtmlSelector`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSelectorFactory;

impl SelectorFactory for HtmlSelectorFactory {
    fn create(&self, text: &str) -> Box<dyn SelectorEngine> {
        Box::new(HtmlSelector::new(text))
    }
}
