//! Error type definitions.
//!
//! This module defines all error types surfaced by response construction,
//! text and JSON access, selector queries and link following.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// Error types for logger initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors raised while turning a follow target into a URL.
///
/// `UnsupportedSelector`, `UnsupportedTag` and `MissingHref` are raised by
/// target normalization; single-target following surfaces them, bulk
/// following drops the offending item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FollowError {
    /// `follow_all` was given none, or more than one, of urls/css/xpath.
    #[error("Please supply exactly one of the following arguments: urls, css, xpath")]
    AmbiguousSource,

    /// The selected node is neither a text value nor an element.
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// The selected element is not an `<a>` or `<link>`.
    #[error("Only <a> and <link> elements are supported; got <{0}>")]
    UnsupportedTag(String),

    /// The selected `<a>`/`<link>` element carries no `href` attribute.
    #[error("<{tag}> element has no href attribute: {element}")]
    MissingHref {
        /// Tag name of the element
        tag: String,
        /// Rendering of the element, for diagnosis
        element: String,
    },

    /// The candidate URL could not be joined against the base URL.
    #[error("Cannot resolve URL '{url}': {reason}")]
    UnresolvableUrl {
        /// The candidate as it was after normalization
        url: String,
        /// Parser error
        reason: String,
    },
}

/// Errors raised by selector engines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The CSS query could not be parsed.
    #[error("Invalid {} query '{query}': {reason}", QueryKind::Css)]
    InvalidCss {
        /// The query text
        query: String,
        /// Parser error
        reason: String,
    },

    /// The XPath expression uses syntax outside the supported subset.
    #[error("Unsupported {kind} expression '{0}'", kind = QueryKind::XPath)]
    UnsupportedXPath(String),

    /// The engine does not implement this query language at all.
    #[error("{0} queries are not supported by this selector engine")]
    Unsupported(QueryKind),
}

/// Query languages a selector engine may be asked to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum QueryKind {
    Css,
    XPath,
    JmesPath,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Css => "CSS",
            QueryKind::XPath => "XPath",
            QueryKind::JmesPath => "JMESPath",
        }
    }
}

/// Top-level error type for response operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The response URL could not be parsed.
    #[error("Invalid response URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as supplied
        url: String,
        /// Parser error
        reason: String,
    },

    /// A header name or value supplied to the builder is not valid HTTP.
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// A text body was supplied without saying how to encode it.
    #[error("Cannot convert text body - response has no encoding")]
    MissingEncoding,

    /// The response configuration failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    /// The body is not valid JSON. Cached: every access reports the same failure.
    #[error("Malformed JSON at line {line}, column {column}: {message}")]
    MalformedJson {
        /// Line of the first syntax error
        line: usize,
        /// Column of the first syntax error
        column: usize,
        /// Parser message
        message: String,
    },

    /// A selector query failed.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// A follow target could not be turned into a request.
    #[error("Follow error: {0}")]
    Follow(#[from] FollowError),
}

impl From<&serde_json::Error> for ResponseError {
    fn from(e: &serde_json::Error) -> Self {
        ResponseError::MalformedJson {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}
