//! Text responses.
//!
//! A `Response` is an immutable snapshot of a fetched document: URL, status,
//! headers and raw body bytes. Everything derived from it is computed lazily
//! and at most once, even when the response is shared between threads:
//! - per-detector encoding answers and the declared encoding (`EncodingResolver`)
//! - the decoded text together with the encoding it was decoded under
//! - the parsed JSON value, or the parse failure
//! - the selector engine and the effective base URL

mod builder;

use std::sync::{Arc, OnceLock};

use encoding_rs::UTF_8;
use log::debug;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::config::ResponseConfig;
use crate::encoding::{
    autodetect, decode_declared, decode_utf32, sniff_bom, BodyDecoder, Charset, DetectorKind,
    EncodingResolver, Materialized,
};
use crate::error_handling::{FollowError, ResponseError};
use crate::follow::{
    build_request, FollowAll, FollowAllArgs, FollowSpec, LinkTarget, RequestDescriptor,
    TargetSource, UrlResolver,
};
use crate::selector::{BaseUrlProvider, Node, SelectorEngine, SelectorFactory};

pub use builder::ResponseBuilder;

/// A fetched text document (HTML, XML, JSON, plain text).
pub struct Response {
    url: Url,
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    config: ResponseConfig,
    resolver: EncodingResolver,
    decoder: Arc<dyn BodyDecoder>,
    selector_factory: Arc<dyn SelectorFactory>,
    base_url_provider: Arc<dyn BaseUrlProvider>,
    materialized: OnceLock<Materialized>,
    json: OnceLock<Result<Value, ResponseError>>,
    selector: OnceLock<Box<dyn SelectorEngine>>,
    base_url: OnceLock<Url>,
}

impl Response {
    /// Starts building a response for `url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use text_response::Response;
    ///
    /// let response = Response::builder("https://example.com/")
    ///     .header("Content-Type", "text/html; charset=utf-8")
    ///     .body("<p>caf\u{e9}</p>")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(response.encoding().name(), "UTF-8");
    /// assert_eq!(response.text(), "<p>caf\u{e9}</p>");
    /// ```
    pub fn builder(url: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder::new(url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// The encoding of the body.
    ///
    /// This is the first answer of the detector chain (override, BOM,
    /// `Content-Type`, in-document declaration). When nothing declares an
    /// encoding, the body is auto-detected, which also decodes it.
    pub fn encoding(&self) -> &Charset {
        match self.declared_encoding() {
            Some(charset) => charset,
            None => &self.materialized().charset,
        }
    }

    /// The encoding declared by the detector chain, without auto-detection.
    pub fn declared_encoding(&self) -> Option<&Charset> {
        self.resolver.declared(&self.body, &self.headers)
    }

    /// Encoding signalled by a byte-order mark at the start of the body.
    pub fn bom_encoding(&self) -> Option<&Charset> {
        self.detect(DetectorKind::ByteOrderMark)
    }

    /// Encoding named by the `charset=` parameter of the `Content-Type` header.
    pub fn headers_encoding(&self) -> Option<&Charset> {
        self.detect(DetectorKind::ContentTypeHeader)
    }

    /// Encoding declared inside the document (`<meta charset>`, `<?xml encoding>`).
    pub fn body_declared_encoding(&self) -> Option<&Charset> {
        self.detect(DetectorKind::BodyDeclaration)
    }

    fn detect(&self, kind: DetectorKind) -> Option<&Charset> {
        self.resolver.detect(kind, &self.body, &self.headers)
    }

    /// The body decoded to text. Decoding happens once; byte-order marks are
    /// not part of the text and malformed input is replaced with U+FFFD.
    pub fn text(&self) -> &str {
        &self.materialized().text
    }

    /// Whether `text()` had to replace malformed input.
    pub fn text_is_lossy(&self) -> bool {
        self.materialized().lossy
    }

    fn materialized(&self) -> &Materialized {
        self.materialized
            .get_or_init(|| match self.declared_encoding() {
                Some(declared) => decode_declared(
                    self.decoder.as_ref(),
                    declared,
                    &self.body,
                    self.bom_encoding(),
                    || self.body_declared_encoding().and_then(Charset::encoding),
                ),
                None => autodetect(self.decoder.as_ref(), &self.config, &self.body),
            })
    }

    /// The body parsed as JSON.
    ///
    /// Parsing works on the raw bytes, independently of `text()`. The outcome
    /// is cached, failures included.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::MalformedJson` on this and every later call if
    /// the body is not valid JSON.
    pub fn json(&self) -> Result<&Value, ResponseError> {
        self.json
            .get_or_init(|| parse_json(&self.body))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The selector engine over `text()`, created on first use.
    pub fn selector(&self) -> &dyn SelectorEngine {
        self.selector
            .get_or_init(|| self.selector_factory.create(self.text()))
            .as_ref()
    }

    /// Runs a CSS query against the document.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Query` if the engine rejects the query.
    pub fn css(&self, query: &str) -> Result<Vec<Node>, ResponseError> {
        Ok(self.selector().css(query)?)
    }

    /// Runs an XPath query against the document.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Query` if the engine rejects the query.
    pub fn xpath(&self, query: &str) -> Result<Vec<Node>, ResponseError> {
        Ok(self.selector().xpath(query)?)
    }

    /// Runs a JMESPath query against the document.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Query` if the engine rejects the query or does
    /// not support JMESPath.
    pub fn jmespath(&self, query: &str) -> Result<Vec<Node>, ResponseError> {
        Ok(self.selector().jmespath(query)?)
    }

    /// URL relative links are resolved against: the document's `<base href>`
    /// if it has one, else the response URL.
    pub fn base_url(&self) -> &Url {
        self.base_url
            .get_or_init(|| self.base_url_provider.base_url(&self.url, self.text()))
    }

    /// Resolves `candidate` against `base_url()`.
    ///
    /// # Errors
    ///
    /// Returns `FollowError::UnresolvableUrl` if the result is not a valid URL.
    pub fn urljoin(&self, candidate: &str) -> Result<Url, ResponseError> {
        UrlResolver::new(self.base_url())
            .resolve(candidate)
            .map_err(|e| {
                ResponseError::from(FollowError::UnresolvableUrl {
                    url: candidate.to_string(),
                    reason: e.to_string(),
                })
            })
    }

    /// Builds the request that follows `target`.
    ///
    /// The target is validated, resolved against `base_url()` and combined
    /// with `spec`. An unset `spec.encoding` becomes `encoding()`.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Follow` if the target is not a usable link.
    pub fn follow(
        &self,
        target: impl Into<LinkTarget>,
        spec: &FollowSpec,
    ) -> Result<RequestDescriptor, ResponseError> {
        Ok(self.request_for(&target.into(), spec)?)
    }

    /// Builds requests for many targets at once.
    ///
    /// Targets come from exactly one of `args.urls`, a CSS query or an XPath
    /// query. Requests are produced lazily and targets that are not usable
    /// links are skipped.
    ///
    /// # Errors
    ///
    /// - `FollowError::AmbiguousSource` unless exactly one source is set
    /// - `ResponseError::Query` if the query fails
    pub fn follow_all(
        &self,
        args: FollowAllArgs,
        spec: &FollowSpec,
    ) -> Result<FollowAll<'_>, ResponseError> {
        let targets = match args.into_source()? {
            TargetSource::Targets(targets) => targets,
            TargetSource::Css(query) => into_targets(self.css(&query)?),
            TargetSource::XPath(query) => into_targets(self.xpath(&query)?),
        };
        Ok(FollowAll::new(self, targets, spec.clone()))
    }

    pub(crate) fn request_for(
        &self,
        target: &LinkTarget,
        spec: &FollowSpec,
    ) -> Result<RequestDescriptor, FollowError> {
        build_request(target, spec, self.base_url(), || self.encoding())
    }
}

fn into_targets(nodes: Vec<Node>) -> Vec<LinkTarget> {
    nodes.into_iter().map(LinkTarget::Node).collect()
}

/// Parses a JSON body. A UTF-8 byte-order mark is skipped and UTF-16 or
/// UTF-32 bodies with a byte-order mark are transcoded first.
fn parse_json(body: &[u8]) -> Result<Value, ResponseError> {
    let parsed: Result<Value, serde_json::Error> = match sniff_bom(body) {
        Some((charset, bom_length)) if charset == UTF_8 => {
            serde_json::from_slice(&body[bom_length..])
        }
        Some((charset, bom_length)) => {
            let rest = &body[bom_length..];
            let text = match charset {
                Charset::Utf32 { big_endian } => decode_utf32(rest, big_endian).0,
                other => {
                    let encoding = other.encoding().unwrap_or(UTF_8);
                    encoding.decode_without_bom_handling(rest).0.into_owned()
                }
            };
            serde_json::from_str(&text)
        }
        None => serde_json::from_slice(body),
    };
    parsed.map_err(|e| {
        debug!("Body is not valid JSON: {e}");
        ResponseError::from(&e)
    })
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("resolver", &self.resolver)
            .field(
                "encoding",
                &self.materialized.get().map(|m| m.charset.name()),
            )
            .finish_non_exhaustive()
    }
}
