//! Selector capability.
//!
//! Queries over the decoded text of a response are delegated to a
//! `SelectorEngine`. A response creates one engine through its
//! `SelectorFactory` on first use and forwards every `css`, `xpath` and
//! `jmespath` call to it. The results are `Node`s, which double as follow
//! targets.
//!
//! The default engine, `HtmlSelector`, is built on `scraper`.

mod base;
mod html;
mod xpath;

use std::collections::BTreeMap;
use std::fmt;

use crate::error_handling::{QueryError, QueryKind};
use crate::utils::preview;

// Re-export public API
pub use base::{BaseTagScanner, BaseUrlProvider};
pub use html::{HtmlSelector, HtmlSelectorFactory};

/// An element selected from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    html: String,
}

impl Element {
    /// Builds an element. The tag name is lowercased; `html` is the outer
    /// markup used to identify the element in diagnostics.
    pub fn new(
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = (String, String)>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: attributes.into_iter().collect(),
            html: html.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Outer markup of the element.
    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&preview(&self.html))
    }
}

/// One result of a selector query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A text value: an attribute value (`::attr(href)`, `@href`) or a text node.
    Text(String),
    /// A markup element.
    Element(Element),
    /// Anything else an engine may return (comments, documents, JSON values),
    /// described for diagnostics.
    Other(String),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => write!(f, "text {:?}", preview(text)),
            Node::Element(element) => element.fmt(f),
            Node::Other(description) => f.write_str(&preview(description)),
        }
    }
}

/// A query engine bound to one document.
pub trait SelectorEngine: Send + Sync {
    /// Evaluates a CSS query.
    fn css(&self, query: &str) -> Result<Vec<Node>, QueryError>;

    /// Evaluates an XPath query.
    fn xpath(&self, query: &str) -> Result<Vec<Node>, QueryError>;

    /// Evaluates a JMESPath query. Engines without JSON support keep the default.
    fn jmespath(&self, _query: &str) -> Result<Vec<Node>, QueryError> {
        Err(QueryError::Unsupported(QueryKind::JmesPath))
    }
}

/// Creates the selector engine of a response from its decoded text.
pub trait SelectorFactory: Send + Sync {
    fn create(&self, text: &str) -> Box<dyn SelectorEngine>;
}
