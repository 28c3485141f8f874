// Shared test helpers for building responses and selector doubles.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use text_response::{
    Element, Node, QueryError, Response, ResponseBuilder, SelectorEngine, SelectorFactory,
};

/// URL every test page is served from.
#[allow(dead_code)] // Used by other test files
pub const PAGE_URL: &str = "https://shop.test/catalog/page.html";

/// Starts a response for `PAGE_URL` with the given body bytes.
#[allow(dead_code)]
pub fn page(body: &[u8]) -> ResponseBuilder {
    Response::builder(PAGE_URL).body(body)
}

/// Builds an element node as a selector would return it.
#[allow(dead_code)]
pub fn element(tag: &str, attributes: &[(&str, &str)]) -> Node {
    let html = format!(
        "<{tag}{}>",
        attributes
            .iter()
            .map(|(name, value)| format!(" {name}=\"{value}\""))
            .collect::<String>()
    );
    Node::Element(Element::new(
        tag,
        attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string())),
        html,
    ))
}

/// Selector factory whose engines answer every CSS and XPath query with the
/// same nodes, and count how often they were created and queried.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct ScriptedSelectorFactory {
    pub nodes: Vec<Node>,
    pub created: Arc<AtomicUsize>,
    pub queries: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedSelectorFactory {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

struct ScriptedSelector {
    nodes: Vec<Node>,
    queries: Arc<AtomicUsize>,
}

impl SelectorEngine for ScriptedSelector {
    fn css(&self, _query: &str) -> Result<Vec<Node>, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.nodes.clone())
    }

    fn xpath(&self, _query: &str) -> Result<Vec<Node>, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.nodes.clone())
    }
}

impl SelectorFactory for ScriptedSelectorFactory {
    fn create(&self, _text: &str) -> Box<dyn SelectorEngine> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedSelector {
            nodes: self.nodes.clone(),
            queries: self.queries.clone(),
        })
    }
}
