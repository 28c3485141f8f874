//! Effective base URL discovery.

use std::sync::LazyLock;

use log::debug;
use scraper::{Html, Selector};
use url::Url;

use crate::utils::{parse_selector_unsafe, strip_html5_whitespace};

const BASE_SELECTOR_STR: &str = "base[href]";

static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(BASE_SELECTOR_STR, "base URL discovery"));

/// Supplies the URL relative links of a response are resolved against.
pub trait BaseUrlProvider: Send + Sync {
    fn base_url(&self, response_url: &Url, text: &str) -> Url;
}

/// Uses the first `<base href>` in the head of the document, resolved
/// against the response URL, and otherwise the response URL itself.
#[derive(Debug, Clone, Copy)]
pub struct BaseTagScanner {
    scan_limit: usize,
}

impl BaseTagScanner {
    /// `scan_limit` is the number of leading characters of the text searched.
    pub fn new(scan_limit: usize) -> Self {
        Self { scan_limit }
    }
}

impl BaseUrlProvider for BaseTagScanner {
    fn base_url(&self, response_url: &Url, text: &str) -> Url {
        let head = match text.char_indices().nth(self.scan_limit) {
            Some((end, _)) => &text[..end],
            None => text,
        };
        let document = Html::parse_document(head);
        let href = document
            .select(&BASE_SELECTOR)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(strip_html5_whitespace);

        match href {
            Some(href) => match response_url.join(href) {
                Ok(base) => {
                    debug!("Using <base href> {base} for {response_url}");
                    base
                }
                Err(e) => {
                    debug!("Ignoring unusable <base href=\"{href}\"> in {response_url}: {e}");
                    response_url.clone()
                }
            },
            None => response_url.clone(),
        }
    }
}
