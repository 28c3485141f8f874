//! Follow targets and their normalization to URL candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error_handling::FollowError;
use crate::selector::{Element, Node};
use crate::utils::{preview, strip_html5_whitespace};

/// A link extracted from a page, e.g. by a link extractor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Target URL, possibly relative
    pub url: String,
    /// Anchor text
    #[serde(default)]
    pub text: String,
    /// Fragment part of the original href
    #[serde(default)]
    pub fragment: String,
    /// Whether the anchor carried `rel="nofollow"`
    #[serde(default)]
    pub nofollow: bool,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Anything a request can be followed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// An absolute or relative URL
    Url(String),
    /// A structured link
    Link(Link),
    /// A selector result: an `<a>`/`<link>` element or an attribute value
    Node(Node),
}

impl LinkTarget {
    /// Reduces the target to a URL candidate, not yet resolved against any base.
    ///
    /// URL strings and links always succeed; selector results must be text
    /// values or `<a>`/`<link>` elements carrying an `href`. Surrounding
    /// HTML5 whitespace is stripped in every case.
    ///
    /// # Errors
    ///
    /// - `FollowError::UnsupportedSelector` for nodes that are neither text nor elements
    /// - `FollowError::UnsupportedTag` for elements other than `<a>` and `<link>`
    /// - `FollowError::MissingHref` for `<a>`/`<link>` elements without `href`
    pub fn normalize(&self) -> Result<&str, FollowError> {
        match self {
            LinkTarget::Url(url) => Ok(strip_html5_whitespace(url)),
            LinkTarget::Link(link) => Ok(strip_html5_whitespace(&link.url)),
            LinkTarget::Node(node) => url_from_node(node),
        }
    }
}

fn url_from_node(node: &Node) -> Result<&str, FollowError> {
    match node {
        Node::Text(value) => Ok(strip_html5_whitespace(value)),
        Node::Other(description) => Err(FollowError::UnsupportedSelector(preview(description))),
        Node::Element(element) => url_from_element(element),
    }
}

fn url_from_element(element: &Element) -> Result<&str, FollowError> {
    if !matches!(element.tag(), "a" | "link") {
        return Err(FollowError::UnsupportedTag(element.tag().to_string()));
    }
    element
        .attr("href")
        .map(strip_html5_whitespace)
        .ok_or_else(|| FollowError::MissingHref {
            tag: element.tag().to_string(),
            element: element.to_string(),
        })
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Url(url) => write!(f, "{url:?}"),
            LinkTarget::Link(link) => write!(f, "link {:?}", link.url),
            LinkTarget::Node(node) => node.fmt(f),
        }
    }
}

impl From<&str> for LinkTarget {
    fn from(url: &str) -> Self {
        LinkTarget::Url(url.to_string())
    }
}

impl From<String> for LinkTarget {
    fn from(url: String) -> Self {
        LinkTarget::Url(url)
    }
}

impl From<&String> for LinkTarget {
    fn from(url: &String) -> Self {
        LinkTarget::Url(url.clone())
    }
}

impl From<Link> for LinkTarget {
    fn from(link: Link) -> Self {
        LinkTarget::Link(link)
    }
}

impl From<Node> for LinkTarget {
    fn from(node: Node) -> Self {
        LinkTarget::Node(node)
    }
}

impl From<Element> for LinkTarget {
    fn from(element: Element) -> Self {
        LinkTarget::Node(Node::Element(element))
    }
}
