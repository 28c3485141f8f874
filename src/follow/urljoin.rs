//! Resolution of URL candidates against a base URL.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use url::{ParseError, Url};

use crate::encoding::Charset;

/// Joins candidates against one base URL with standard relative-reference rules.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
    base: &'a Url,
}

impl<'a> UrlResolver<'a> {
    pub fn new(base: &'a Url) -> Self {
        Self { base }
    }

    /// Resolves `candidate`; absolute candidates only get normalized.
    ///
    /// # Examples
    ///
    /// ```
    /// use text_response::follow::UrlResolver;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://x.test/c/").unwrap();
    /// let resolver = UrlResolver::new(&base);
    /// assert_eq!(resolver.resolve("/a/b").unwrap().as_str(), "https://x.test/a/b");
    /// assert_eq!(resolver.resolve("d").unwrap().as_str(), "https://x.test/c/d");
    /// ```
    pub fn resolve(&self, candidate: &str) -> Result<Url, ParseError> {
        self.base.join(candidate)
    }

    /// Like `resolve`, but percent-encodes the query string in `charset`, the
    /// way a browser submits links found on a page in that encoding.
    pub fn resolve_with_charset(&self, candidate: &str, charset: &Charset) -> Result<Url, ParseError> {
        match charset.encoding() {
            Some(encoding) if encoding != UTF_8 => {
                let encoder = query_encoder(encoding);
                let encode: &dyn Fn(&str) -> Cow<'_, [u8]> = &encoder;
                Url::options()
                    .base_url(Some(self.base))
                    .encoding_override(Some(encode))
                    .parse(candidate)
            }
            _ => self.resolve(candidate),
        }
    }
}

fn query_encoder(encoding: &'static Encoding) -> impl Fn(&str) -> Cow<'_, [u8]> {
    move |input| encoding.encode(input).0
}
