//! Canonical encoding names.

use std::fmt;

use encoding_rs::{Encoding, UTF_16BE};

use crate::config::{ASCII_LABELS, CP1252_LABELS};

/// A resolved character encoding.
///
/// Labels are canonicalised through the WHATWG label table, so `latin1`,
/// `iso-8859-1` and `ascii` all resolve to `windows-1252`, `utf8` to `UTF-8`,
/// and so on. A label that table does not know is kept verbatim
/// (lowercased): an explicit override is authoritative even when it cannot be
/// used for decoding.
///
/// A bare `utf-16` or `utf-32` label names no byte order; without a
/// byte-order mark such bodies are big-endian, so those labels resolve to
/// `UTF-16BE` and `UTF-32BE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Charset {
    /// An encoding `encoding_rs` can decode and encode.
    Known(&'static Encoding),
    /// UTF-32, which `encoding_rs` does not implement. Decoded in 4-byte units.
    Utf32 { big_endian: bool },
    /// A label with no known encoding behind it.
    Unrecognized(String),
}

impl Charset {
    /// Resolves a label such as `"utf8"` or `" Latin1 "`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::known(label).unwrap_or_else(|| Charset::Unrecognized(label.to_ascii_lowercase()))
    }

    /// Resolves a label, returning `None` when it is not recognised.
    pub fn known(label: &str) -> Option<Self> {
        let label = label.trim();
        match label.to_ascii_lowercase().as_str() {
            "utf-16" => Some(Charset::Known(UTF_16BE)),
            "utf-32" | "utf-32be" => Some(Charset::Utf32 { big_endian: true }),
            "utf-32le" => Some(Charset::Utf32 { big_endian: false }),
            _ => Encoding::for_label(label.as_bytes()).map(Charset::Known),
        }
    }

    /// Canonical name, e.g. `UTF-8` or `windows-1252`.
    pub fn name(&self) -> &str {
        match self {
            Charset::Known(encoding) => encoding.name(),
            Charset::Utf32 { big_endian: true } => "UTF-32BE",
            Charset::Utf32 { big_endian: false } => "UTF-32LE",
            Charset::Unrecognized(label) => label,
        }
    }

    /// The `encoding_rs` decoder behind this charset, if any.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            Charset::Known(encoding) => Some(encoding),
            Charset::Utf32 { .. } | Charset::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Charset::Unrecognized(_))
    }

    /// Encodes `text` for the wire. Unrecognized charsets and encodings that
    /// cannot be produced (UTF-16, UTF-32) fall back to UTF-8.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let encoding = self.encoding().unwrap_or(encoding_rs::UTF_8);
        let (bytes, _, _) = encoding.encode(text);
        bytes.into_owned()
    }
}

impl From<&'static Encoding> for Charset {
    fn from(encoding: &'static Encoding) -> Self {
        Charset::Known(encoding)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq<&'static Encoding> for Charset {
    fn eq(&self, other: &&'static Encoding) -> bool {
        self.encoding() == Some(*other)
    }
}

/// Whether a label means the strict cp1252 codec, which leaves five bytes
/// undefined, rather than the WHATWG windows-1252 that maps every byte.
pub(crate) fn is_cp1252_label(label: &str) -> bool {
    let label = label.trim();
    CP1252_LABELS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(label))
}

/// Whether a label means strict 7-bit ASCII rather than its WHATWG alias.
pub(crate) fn is_ascii_label(label: &str) -> bool {
    let label = label.trim();
    ASCII_LABELS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(label))
}
