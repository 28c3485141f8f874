//! Outbound request parameters and descriptors.

use std::collections::BTreeMap;

use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::encoding::Charset;

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Sent as is
    Bytes(Vec<u8>),
    /// Encoded with the request encoding
    Text(String),
}

/// Parameters of a followed request.
///
/// Everything except `encoding` is passed through untouched. An unset
/// `encoding` defaults to the encoding of the response being followed.
///
/// # Examples
///
/// ```
/// use text_response::FollowSpec;
///
/// let spec = FollowSpec {
///     callback: Some("parse_item".to_string()),
///     priority: 10,
///     ..Default::default()
/// };
/// assert_eq!(spec.method, reqwest::Method::GET);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FollowSpec {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    pub cookies: BTreeMap<String, String>,
    pub meta: Map<String, Value>,
    pub encoding: Option<Charset>,
    pub priority: i32,
    /// Bypass duplicate-request filtering
    pub dont_filter: bool,
    /// Name of the handler for the response
    pub callback: Option<String>,
    /// Name of the handler for failures
    pub errback: Option<String>,
    /// Keyword arguments passed to the callback
    pub cb_kwargs: Map<String, Value>,
    pub flags: Vec<String>,
}

/// A fully resolved request, ready to be queued.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    /// Body bytes, already encoded
    pub body: Vec<u8>,
    pub cookies: BTreeMap<String, String>,
    pub meta: Map<String, Value>,
    pub encoding: Charset,
    pub priority: i32,
    pub dont_filter: bool,
    pub callback: Option<String>,
    pub errback: Option<String>,
    pub cb_kwargs: Map<String, Value>,
    pub flags: Vec<String>,
}

impl RequestDescriptor {
    /// Combines a resolved URL with the caller's parameters.
    pub(crate) fn new(url: Url, spec: &FollowSpec, encoding: Charset) -> Self {
        let body = match &spec.body {
            Some(Body::Bytes(bytes)) => bytes.clone(),
            Some(Body::Text(text)) => encoding.encode(text),
            None => Vec::new(),
        };
        Self {
            url,
            method: spec.method.clone(),
            headers: spec.headers.clone(),
            body,
            cookies: spec.cookies.clone(),
            meta: spec.meta.clone(),
            encoding,
            priority: spec.priority,
            dont_filter: spec.dont_filter,
            callback: spec.callback.clone(),
            errback: spec.errback.clone(),
            cb_kwargs: spec.cb_kwargs.clone(),
            flags: spec.flags.clone(),
        }
    }

    /// Prepares (but does not send) the request on `client`.
    ///
    /// Cookies become a single `Cookie` header; cookies that cannot be
    /// represented in a header are dropped with a warning.
    pub fn to_reqwest(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut headers = self.headers.clone();
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.append(COOKIE, value);
                }
                Err(e) => warn!("Dropping cookies for {}: {e}", self.url),
            }
        }

        let builder = client
            .request(self.method.clone(), self.url.clone())
            .headers(headers);
        if self.body.is_empty() {
            builder
        } else {
            builder.body(self.body.clone())
        }
    }
}
