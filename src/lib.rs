//! text_response library: encoding resolution, lazy decoding and link following
//! for HTTP text responses
//!
//! A [`Response`] wraps the raw bytes and headers of a fetched document. Its
//! encoding is resolved through a fixed priority chain (explicit override,
//! byte-order mark, `Content-Type` header, in-document declaration,
//! auto-detection), and the decoded text, parsed JSON, selector engine and
//! base URL are each computed at most once. Links found in the document are
//! turned into [`RequestDescriptor`]s with [`Response::follow`] and
//! [`Response::follow_all`].
//!
//! # Example
//!
//! ```
//! use text_response::{FollowAllArgs, FollowSpec, Response};
//!
//! # fn main() -> Result<(), text_response::ResponseError> {
//! let response = Response::builder("https://example.com/list/")
//!     .header("Content-Type", "text/html; charset=windows-1252")
//!     .body(&b"<a href='item?name=caf\xe9'>1</a><a>no link</a>"[..])
//!     .build()?;
//!
//! assert_eq!(response.encoding().name(), "windows-1252");
//! assert!(response.text().contains("caf\u{e9}"));
//!
//! let requests: Vec<_> = response
//!     .follow_all(FollowAllArgs::css("a"), &FollowSpec::default())?
//!     .collect();
//! assert_eq!(requests.len(), 1);
//! assert_eq!(
//!     requests[0].url.as_str(),
//!     "https://example.com/list/item?name=caf%E9"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! No I/O happens here: responses are built from bytes already in memory, and
//! requests are only described (see [`RequestDescriptor::to_reqwest`]).

pub mod config;
pub mod encoding;
mod error_handling;
pub mod follow;
pub mod initialization;
mod response;
pub mod selector;
pub mod utils;

// Re-export public API
pub use config::{ConfigValidationError, LogFormat, LogLevel, ResponseConfig};
pub use encoding::Charset;
pub use error_handling::{FollowError, InitializationError, QueryError, QueryKind, ResponseError};
pub use follow::{Body, FollowAll, FollowAllArgs, FollowSpec, Link, LinkTarget, RequestDescriptor};
pub use initialization::init_logger_with;
pub use response::{Response, ResponseBuilder};
pub use selector::{
    BaseTagScanner, BaseUrlProvider, Element, HtmlSelector, HtmlSelectorFactory, Node,
    SelectorEngine, SelectorFactory,
};
