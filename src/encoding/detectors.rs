//! Encoding detectors.
//!
//! Each detector looks at one independent signal (an explicit override, a
//! byte-order mark, the `Content-Type` header, an in-document declaration)
//! and either names an encoding or abstains. Detectors are pure functions of
//! the body and headers; memoization is the resolver's job.

use std::sync::LazyLock;

use encoding_rs::Encoding;
use log::debug;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use strum_macros::EnumIter;

use super::Charset;

// Content-Type parameter, quoted or bare
const CONTENT_TYPE_CHARSET_PATTERN: &str = r#"(?i)charset\s*=\s*["']?([\w.:-]+)"#;

// Unicode mode is off so that `[^>]` also spans bytes of an undeclared 8-bit encoding
const DECLARATION_TAG_PATTERN: &str = r"(?i-u)<\s*(meta\b[^>]*|\?xml\s[^>]*)>";
const TAG_ATTRIBUTE_PATTERN: &str =
    r#"(?-u)([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#;

static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CONTENT_TYPE_CHARSET_PATTERN)
        .expect("Failed to compile Content-Type charset regex - this is a bug")
});

static DECLARATION_TAG: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(DECLARATION_TAG_PATTERN)
        .expect("Failed to compile declaration tag regex - this is a bug")
});

static TAG_ATTRIBUTE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(TAG_ATTRIBUTE_PATTERN)
        .expect("Failed to compile tag attribute regex - this is a bug")
});

/// The signals consulted before auto-detection, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DetectorKind {
    /// Encoding supplied explicitly when the response was built
    Override,
    /// UTF-8 / UTF-16 / UTF-32 byte-order mark at the start of the body
    ByteOrderMark,
    /// `charset=` parameter of the `Content-Type` header
    ContentTypeHeader,
    /// `<meta charset>`, `<meta http-equiv>` or `<?xml encoding>` in the body
    BodyDeclaration,
}

/// Number of `DetectorKind` variants.
pub const DETECTOR_COUNT: usize = 4;

impl DetectorKind {
    /// Position of this detector in the priority chain.
    pub fn index(self) -> usize {
        match self {
            DetectorKind::Override => 0,
            DetectorKind::ByteOrderMark => 1,
            DetectorKind::ContentTypeHeader => 2,
            DetectorKind::BodyDeclaration => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Override => "encoding override",
            DetectorKind::ByteOrderMark => "byte-order mark",
            DetectorKind::ContentTypeHeader => "Content-Type header",
            DetectorKind::BodyDeclaration => "in-document declaration",
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link of the encoding priority chain.
pub trait EncodingDetector: Send + Sync {
    /// Which signal this detector reads.
    fn kind(&self) -> DetectorKind;

    /// Names the encoding this signal declares, or `None` to defer to the
    /// next detector.
    fn detect(&self, body: &[u8], headers: &HeaderMap) -> Option<Charset>;
}

/// Returns the override it was built with, ignoring body and headers.
#[derive(Debug, Clone, Default)]
pub struct OverrideDetector {
    charset: Option<Charset>,
}

impl OverrideDetector {
    pub fn new(charset: Option<Charset>) -> Self {
        Self { charset }
    }
}

impl EncodingDetector for OverrideDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Override
    }

    fn detect(&self, _body: &[u8], _headers: &HeaderMap) -> Option<Charset> {
        self.charset.clone()
    }
}

/// Recognises UTF-8, UTF-16 and UTF-32 byte-order marks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BomDetector;

impl EncodingDetector for BomDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ByteOrderMark
    }

    fn detect(&self, body: &[u8], _headers: &HeaderMap) -> Option<Charset> {
        sniff_bom(body).map(|(charset, _)| charset)
    }
}

/// The encoding announced by a byte-order mark and the length of that mark.
///
/// UTF-32LE is checked first: its mark starts with the UTF-16LE one.
pub(crate) fn sniff_bom(body: &[u8]) -> Option<(Charset, usize)> {
    match body {
        [0xff, 0xfe, 0x00, 0x00, ..] => Some((Charset::Utf32 { big_endian: false }, 4)),
        [0x00, 0x00, 0xfe, 0xff, ..] => Some((Charset::Utf32 { big_endian: true }, 4)),
        _ => Encoding::for_bom(body).map(|(encoding, length)| (Charset::Known(encoding), length)),
    }
}

/// Reads the `charset=` parameter of the last `Content-Type` header value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTypeDetector;

impl EncodingDetector for ContentTypeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ContentTypeHeader
    }

    fn detect(&self, _body: &[u8], headers: &HeaderMap) -> Option<Charset> {
        // Header bytes predate any encoding decision, so read them as Latin-1
        let value = headers.get_all(CONTENT_TYPE).iter().last()?;
        let content_type = encoding_rs::mem::decode_latin1(value.as_bytes());
        content_type_charset(&content_type).and_then(Charset::known)
    }
}

/// Looks for an encoding declaration in the first `scan_limit` body bytes.
#[derive(Debug, Clone, Copy)]
pub struct BodyDeclarationDetector {
    scan_limit: usize,
}

impl BodyDeclarationDetector {
    pub fn new(scan_limit: usize) -> Self {
        Self { scan_limit }
    }
}

impl EncodingDetector for BodyDeclarationDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::BodyDeclaration
    }

    fn detect(&self, body: &[u8], _headers: &HeaderMap) -> Option<Charset> {
        let chunk = &body[..body.len().min(self.scan_limit)];
        let label = declared_label(chunk)?;
        let charset = Charset::known(&label);
        if charset.is_none() {
            debug!("Ignoring unknown in-document encoding declaration '{label}'");
        }
        charset
    }
}

/// Extracts the raw `charset=` value from a `Content-Type` header value.
///
/// # Examples
///
/// ```
/// use text_response::encoding::content_type_charset;
///
/// assert_eq!(content_type_charset("text/html; charset=\"UTF-8\""), Some("UTF-8"));
/// assert_eq!(content_type_charset("text/html"), None);
/// ```
pub fn content_type_charset(content_type: &str) -> Option<&str> {
    CONTENT_TYPE_CHARSET
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Finds the first `<meta>` or `<?xml?>` tag in `chunk` that declares an
/// encoding and returns the declared label.
fn declared_label(chunk: &[u8]) -> Option<String> {
    for tag in DECLARATION_TAG.captures_iter(chunk) {
        let Some(inner) = tag.get(1) else {
            continue;
        };
        let inner = inner.as_bytes();
        let is_xml = inner.first() == Some(&b'?');
        // Both "meta" and "?xml" are four bytes long
        let attributes = tag_attributes(&inner[4..]);

        let label = if is_xml {
            attribute(&attributes, "encoding").map(str::to_string)
        } else if let Some(charset) = attribute(&attributes, "charset") {
            Some(charset.to_string())
        } else if attribute(&attributes, "http-equiv")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
        {
            attribute(&attributes, "content")
                .and_then(content_type_charset)
                .map(str::to_string)
        } else {
            None
        };

        // Unquoted values swallow the slash of a self-closing tag
        if let Some(label) = label
            .map(|l| l.trim().trim_end_matches('/').to_string())
            .filter(|l| !l.is_empty())
        {
            return Some(label);
        }
    }
    None
}

fn tag_attributes(raw: &[u8]) -> Vec<(String, String)> {
    TAG_ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
                .unwrap_or_default();
            Some((
                String::from_utf8_lossy(name.as_bytes()).to_ascii_lowercase(),
                value,
            ))
        })
        .collect()
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
