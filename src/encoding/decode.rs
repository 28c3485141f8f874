//! Body decoding.
//!
//! Produces the text of a response exactly once, together with the encoding
//! it was decoded under. When no encoding is declared, auto-detection test
//! decodes candidate encodings and keeps the text of the first clean one.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};

use super::charset::{is_ascii_label, is_cp1252_label};
use super::Charset;
use crate::config::{ResponseConfig, CP1252_UNDEFINED_BYTES};

/// Low-level decoding capability.
///
/// The default implementation is `EncodingRsDecoder`; tests substitute a
/// counting wrapper to verify how often bodies are decoded.
pub trait BodyDecoder: Send + Sync {
    /// Decodes `bytes` replacing malformed sequences with U+FFFD. Returns the
    /// text and whether any replacement happened.
    fn decode(&self, encoding: &'static Encoding, bytes: &[u8]) -> (String, bool);

    /// Decodes `bytes` only if they are entirely well formed in `encoding`.
    fn decode_strict(&self, encoding: &'static Encoding, bytes: &[u8]) -> Option<String>;
}

/// `BodyDecoder` backed by `encoding_rs`. BOMs are not interpreted here;
/// callers strip them first.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRsDecoder;

impl BodyDecoder for EncodingRsDecoder {
    fn decode(&self, encoding: &'static Encoding, bytes: &[u8]) -> (String, bool) {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        (text.into_owned(), had_errors)
    }

    fn decode_strict(&self, encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
    }
}

/// Decoded body together with the encoding reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Encoding the response reports (the declared one, or the detected one)
    pub charset: Charset,
    /// Decoded text, without any byte-order mark
    pub text: String,
    /// Whether malformed input was replaced with U+FFFD
    pub lossy: bool,
}

/// Length of the byte-order mark announcing `bom`.
fn bom_length(bom: &Charset) -> usize {
    match bom {
        Charset::Utf32 { .. } => 4,
        Charset::Known(encoding) if *encoding == UTF_8 => 3,
        _ => 2,
    }
}

/// Decodes UTF-32 in 4-byte units. Invalid code points and a trailing
/// partial unit become U+FFFD.
pub(crate) fn decode_utf32(bytes: &[u8], big_endian: bool) -> (String, bool) {
    let mut lossy = false;
    let mut units = bytes.chunks_exact(4);
    let mut text: String = units
        .by_ref()
        .map(|unit| {
            let unit = [unit[0], unit[1], unit[2], unit[3]];
            let value = if big_endian {
                u32::from_be_bytes(unit)
            } else {
                u32::from_le_bytes(unit)
            };
            char::from_u32(value).unwrap_or_else(|| {
                lossy = true;
                char::REPLACEMENT_CHARACTER
            })
        })
        .collect();
    if !units.remainder().is_empty() {
        text.push(char::REPLACEMENT_CHARACTER);
        lossy = true;
    }
    (text, lossy)
}

/// Decodes with `charset`, or `None` when nothing can decode it.
fn decode_with(decoder: &dyn BodyDecoder, charset: &Charset, bytes: &[u8]) -> Option<(String, bool)> {
    match charset {
        Charset::Known(encoding) => Some(decoder.decode(encoding, bytes)),
        Charset::Utf32 { big_endian } => Some(decode_utf32(bytes, *big_endian)),
        Charset::Unrecognized(_) => None,
    }
}

/// Decodes a body whose encoding was declared by the detector chain.
///
/// The declared name is trusted only as far as it is usable: a byte-order
/// mark still decides the actual decoding, and an unrecognized override
/// falls back to the in-document declaration, then to UTF-8. The reported
/// charset stays the declared one.
pub(crate) fn decode_declared(
    decoder: &dyn BodyDecoder,
    declared: &Charset,
    body: &[u8],
    bom: Option<&Charset>,
    body_declared: impl FnOnce() -> Option<&'static Encoding>,
) -> Materialized {
    let (text, lossy) = match bom {
        Some(bom) => {
            let rest = &body[bom_length(bom).min(body.len())..];
            decode_with(decoder, bom, rest).unwrap_or_else(|| decoder.decode(UTF_8, rest))
        }
        None => decode_with(decoder, declared, body).unwrap_or_else(|| {
            let encoding = body_declared().unwrap_or(UTF_8);
            warn!(
                "Unrecognized encoding '{declared}', decoding as {}",
                encoding.name()
            );
            decoder.decode(encoding, body)
        }),
    };

    if lossy {
        warn!("Body is not valid {declared}; malformed bytes were replaced");
    }

    Materialized {
        charset: declared.clone(),
        text,
        lossy,
    }
}

fn is_cp1252_undefined(c: char) -> bool {
    u8::try_from(u32::from(c)).is_ok_and(|byte| CP1252_UNDEFINED_BYTES.contains(&byte))
}

/// Picks an encoding for a body nothing declared anything about.
///
/// Candidates from `config.autodetect_encodings` are tried in order; the
/// first that decodes cleanly wins and its decoded text is kept. ASCII
/// labels only accept pure 7-bit bodies and cp1252 labels reject the five
/// bytes that codec leaves undefined. If no candidate is clean, the body is
/// decoded lossily under `config.default_encoding`.
pub(crate) fn autodetect(
    decoder: &dyn BodyDecoder,
    config: &ResponseConfig,
    body: &[u8],
) -> Materialized {
    for label in &config.autodetect_encodings {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            continue;
        };
        if is_ascii_label(label) && !body.is_ascii() {
            continue;
        }
        if is_cp1252_label(label) && body.iter().any(|b| CP1252_UNDEFINED_BYTES.contains(b)) {
            continue;
        }
        if let Some(text) = decoder.decode_strict(encoding, body) {
            debug!("Auto-detected encoding {} (candidate '{label}')", encoding.name());
            return Materialized {
                charset: Charset::Known(encoding),
                text,
                lossy: false,
            };
        }
    }

    let default = &config.default_encoding;
    let encoding = Encoding::for_label(default.trim().as_bytes()).unwrap_or(WINDOWS_1252);
    let (mut text, mut lossy) = decoder.decode(encoding, body);
    if is_ascii_label(default) && !body.is_ascii() {
        text = text
            .chars()
            .map(|c| if c.is_ascii() { c } else { char::REPLACEMENT_CHARACTER })
            .collect();
        lossy = true;
    } else if is_cp1252_label(default) && text.chars().any(is_cp1252_undefined) {
        text = text
            .chars()
            .map(|c| if is_cp1252_undefined(c) { char::REPLACEMENT_CHARACTER } else { c })
            .collect();
        lossy = true;
    }
    warn!(
        "No candidate encoding decodes the body cleanly; falling back to {}",
        encoding.name()
    );

    Materialized {
        charset: Charset::Known(encoding),
        text,
        lossy,
    }
}
