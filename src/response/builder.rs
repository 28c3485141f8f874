//! Response construction.

use std::sync::{Arc, OnceLock};

use log::warn;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::Response;
use crate::config::ResponseConfig;
use crate::encoding::{BodyDecoder, Charset, EncodingResolver, EncodingRsDecoder};
use crate::error_handling::ResponseError;
use crate::follow::Body;
use crate::selector::{BaseTagScanner, BaseUrlProvider, HtmlSelectorFactory, SelectorFactory};

/// Builder for `Response`.
///
/// Header and URL problems are reported by `build`, so calls can be chained
/// freely.
pub struct ResponseBuilder {
    url: String,
    status: u16,
    headers: HeaderMap,
    invalid_header: Option<String>,
    body: Body,
    encoding: Option<Charset>,
    config: ResponseConfig,
    decoder: Arc<dyn BodyDecoder>,
    selector_factory: Arc<dyn SelectorFactory>,
    base_url_provider: Option<Arc<dyn BaseUrlProvider>>,
}

impl ResponseBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            headers: HeaderMap::new(),
            invalid_header: None,
            body: Body::Bytes(Vec::new()),
            encoding: None,
            config: ResponseConfig::default(),
            decoder: Arc::new(EncodingRsDecoder),
            selector_factory: Arc::new(HtmlSelectorFactory),
            base_url_provider: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Appends a header. Values are raw bytes and need not be UTF-8.
    pub fn header(mut self, name: &str, value: impl AsRef<[u8]>) -> Self {
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .ok()
            .zip(HeaderValue::from_bytes(value.as_ref()).ok());
        match parsed {
            Some((name, value)) => {
                self.headers.append(name, value);
            }
            None => {
                self.invalid_header.get_or_insert_with(|| name.to_string());
            }
        }
        self
    }

    /// Appends every header of `headers`.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut current = None;
        for (name, value) in headers {
            // `None` names repeat the previous one
            if let Some(name) = name {
                current = Some(name);
            }
            if let Some(name) = &current {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    /// Raw body bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Body given as text. It is encoded with the response encoding, so
    /// `encoding` must be set as well.
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Body::Text(text.into());
        self
    }

    /// Overrides encoding detection. Blank labels are ignored; labels that
    /// name no known encoding are kept and still win over every detector.
    pub fn encoding(mut self, label: &str) -> Self {
        if label.trim().is_empty() {
            return self;
        }
        let charset = Charset::from_label(label);
        if !charset.is_recognized() {
            warn!("Unrecognized encoding override '{label}'");
        }
        self.encoding = Some(charset);
        self
    }

    pub fn config(mut self, config: ResponseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn BodyDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn selector_factory(mut self, factory: Arc<dyn SelectorFactory>) -> Self {
        self.selector_factory = factory;
        self
    }

    /// Replaces the default `<base href>` scanner.
    pub fn base_url_provider(mut self, provider: Arc<dyn BaseUrlProvider>) -> Self {
        self.base_url_provider = Some(provider);
        self
    }

    /// Validates the parts and assembles the response.
    ///
    /// # Errors
    ///
    /// - `ResponseError::InvalidHeader` for the first header that was rejected
    /// - `ResponseError::Config` if the configuration does not validate
    /// - `ResponseError::InvalidUrl` if the URL does not parse
    /// - `ResponseError::MissingEncoding` for a text body without an encoding
    pub fn build(self) -> Result<Response, ResponseError> {
        if let Some(name) = self.invalid_header {
            return Err(ResponseError::InvalidHeader(name));
        }
        self.config.validate()?;

        let url = Url::parse(self.url.trim()).map_err(|e| ResponseError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let body = match self.body {
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => match &self.encoding {
                Some(charset) => charset.encode(&text),
                None => return Err(ResponseError::MissingEncoding),
            },
        };

        let base_url_provider: Arc<dyn BaseUrlProvider> = match self.base_url_provider {
            Some(provider) => provider,
            None => Arc::new(BaseTagScanner::new(self.config.base_url_scan_limit)),
        };

        Ok(Response {
            url,
            status: self.status,
            headers: self.headers,
            body,
            resolver: EncodingResolver::new(self.encoding, &self.config),
            config: self.config,
            decoder: self.decoder,
            selector_factory: self.selector_factory,
            base_url_provider,
            materialized: OnceLock::new(),
            json: OnceLock::new(),
            selector: OnceLock::new(),
            base_url: OnceLock::new(),
        })
    }
}

impl std::fmt::Debug for ResponseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBuilder")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("encoding", &self.encoding)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
