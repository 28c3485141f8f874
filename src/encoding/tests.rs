// Encoding module tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use encoding_rs::{SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use super::*;
use crate::config::ResponseConfig;

fn content_type(value: &[u8]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.append(CONTENT_TYPE, HeaderValue::from_bytes(value).unwrap());
    headers
}

/// Detector double that counts how often it runs.
struct CountingDetector {
    kind: DetectorKind,
    answer: Option<Charset>,
    calls: Arc<AtomicUsize>,
}

impl EncodingDetector for CountingDetector {
    fn kind(&self) -> DetectorKind {
        self.kind
    }

    fn detect(&self, _body: &[u8], _headers: &HeaderMap) -> Option<Charset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

#[test]
fn test_charset_resolves_aliases() {
    assert_eq!(Charset::from_label("latin1"), WINDOWS_1252);
    assert_eq!(Charset::from_label(" UTF8 "), UTF_8);
    assert_eq!(Charset::from_label("ascii").name(), "windows-1252");
    assert_eq!(Charset::from_label("sjis").name(), "Shift_JIS");
}

#[test]
fn test_charset_bare_unicode_labels_are_big_endian() {
    assert_eq!(Charset::from_label("UTF-16"), UTF_16BE);
    assert_eq!(Charset::from_label("utf-16le"), UTF_16LE);
    assert_eq!(Charset::from_label("utf-16be"), UTF_16BE);
    assert_eq!(
        Charset::from_label("utf-32"),
        Charset::Utf32 { big_endian: true }
    );
    assert_eq!(Charset::from_label(" UTF-32LE ").name(), "UTF-32LE");
    assert!(Charset::from_label("utf-32be").is_recognized());
    assert_eq!(Charset::from_label("utf-32le").encoding(), None);
}

#[test]
fn test_charset_keeps_unrecognized_label() {
    let charset = Charset::from_label(" X-Klingon ");
    assert!(!charset.is_recognized());
    assert_eq!(charset.name(), "x-klingon");
    assert_eq!(charset.encoding(), None);
    assert_eq!(Charset::known("x-klingon"), None);
}

#[test]
fn test_charset_encode() {
    assert_eq!(Charset::from(WINDOWS_1252).encode("café"), b"caf\xe9");
    assert_eq!(Charset::from(UTF_8).encode("café"), "café".as_bytes());
    // Unrecognized charsets, UTF-16 and UTF-32 encode as UTF-8
    assert_eq!(Charset::from_label("nope").encode("é"), "é".as_bytes());
    assert_eq!(Charset::from(UTF_16LE).encode("é"), "é".as_bytes());
    assert_eq!(Charset::Utf32 { big_endian: true }.encode("é"), "é".as_bytes());
}

#[test]
fn test_ascii_labels() {
    assert!(charset::is_ascii_label("ascii"));
    assert!(charset::is_ascii_label("US-ASCII"));
    assert!(!charset::is_ascii_label("cp1252"));
    assert!(charset::is_cp1252_label(" Windows-1252"));
    assert!(!charset::is_cp1252_label("latin1"));
}

#[test]
fn test_content_type_charset_parsing() {
    assert_eq!(
        content_type_charset("text/html; charset=utf-8"),
        Some("utf-8")
    );
    assert_eq!(
        content_type_charset("text/html;CHARSET = 'ISO-8859-4'"),
        Some("ISO-8859-4")
    );
    assert_eq!(content_type_charset("text/html"), None);
    assert_eq!(content_type_charset(""), None);
}

#[test]
fn test_bom_detector() {
    let headers = HeaderMap::new();
    assert_eq!(
        BomDetector.detect(b"\xef\xbb\xbfhello", &headers),
        Some(Charset::Known(UTF_8))
    );
    assert_eq!(
        BomDetector.detect(b"\xff\xfeh\x00", &headers),
        Some(Charset::Known(UTF_16LE))
    );
    assert_eq!(
        BomDetector.detect(b"\xfe\xff\x00h", &headers),
        Some(Charset::Known(UTF_16BE))
    );
    assert_eq!(
        BomDetector.detect(b"\xff\xfe\x00\x00h\x00\x00\x00", &headers),
        Some(Charset::Utf32 { big_endian: false })
    );
    assert_eq!(
        BomDetector.detect(b"\x00\x00\xfe\xff\x00\x00\x00h", &headers),
        Some(Charset::Utf32 { big_endian: true })
    );
    assert_eq!(BomDetector.detect(b"hello", &headers), None);
    assert_eq!(BomDetector.detect(b"", &headers), None);
}

#[test]
fn test_content_type_detector() {
    let detector = ContentTypeDetector;
    assert_eq!(
        detector.detect(b"", &content_type(b"text/html; charset=Shift_JIS")),
        Some(Charset::Known(SHIFT_JIS))
    );
    assert_eq!(detector.detect(b"", &content_type(b"text/html")), None);
    assert_eq!(
        detector.detect(b"", &content_type(b"text/html; charset=bogus")),
        None
    );
    assert_eq!(detector.detect(b"", &HeaderMap::new()), None);
}

#[test]
fn test_content_type_detector_uses_last_value() {
    let mut headers = content_type(b"text/html; charset=utf-8");
    headers.append(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=cp1252"),
    );
    assert_eq!(
        ContentTypeDetector.detect(b"", &headers),
        Some(Charset::Known(WINDOWS_1252))
    );
}

#[test]
fn test_content_type_detector_tolerates_8bit_header_bytes() {
    let headers = content_type(b"text/html; title=\xe9t\xe9; charset=utf-8");
    assert_eq!(
        ContentTypeDetector.detect(b"", &headers),
        Some(Charset::Known(UTF_8))
    );
}

#[test]
fn test_body_declaration_meta_charset() {
    let detector = BodyDeclarationDetector::new(4096);
    let body = b"<html><head><meta charset=\"Shift_JIS\"></head></html>";
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(SHIFT_JIS))
    );

    let body = b"<META CHARSET=utf-8/>";
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(UTF_8))
    );
}

#[test]
fn test_body_declaration_http_equiv() {
    let detector = BodyDeclarationDetector::new(4096);
    let body = br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#;
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(WINDOWS_1252))
    );

    // Attribute order does not matter
    let body = br#"<meta content='text/html; charset=utf-8' http-equiv='content-type'>"#;
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(UTF_8))
    );
}

#[test]
fn test_body_declaration_ignores_unrelated_meta() {
    let detector = BodyDeclarationDetector::new(4096);
    let body = br#"<meta name="description" content="charset=koi8-r"><metadata charset="utf-8"><meta charset="utf-8">"#;
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(UTF_8))
    );
}

#[test]
fn test_body_declaration_xml_prolog() {
    let detector = BodyDeclarationDetector::new(4096);
    let body = br#"<?xml version="1.0" encoding="UTF-16BE"?><root/>"#;
    assert_eq!(
        detector.detect(body, &HeaderMap::new()),
        Some(Charset::Known(UTF_16BE))
    );
}

#[test]
fn test_body_declaration_respects_scan_limit() {
    let mut body = vec![b' '; 100];
    body.extend_from_slice(b"<meta charset=\"utf-8\">");
    assert_eq!(
        BodyDeclarationDetector::new(50).detect(&body, &HeaderMap::new()),
        None
    );
    assert!(BodyDeclarationDetector::new(4096)
        .detect(&body, &HeaderMap::new())
        .is_some());
}

#[test]
fn test_body_declaration_with_undeclared_8bit_bytes() {
    let body = b"<title>\xe9t\xe9</title><meta charset=\"windows-1251\">";
    assert_eq!(
        BodyDeclarationDetector::new(4096).detect(body, &HeaderMap::new()),
        Some(Charset::Known(encoding_rs::WINDOWS_1251))
    );
}

#[test]
fn test_body_declaration_unknown_label() {
    let body = b"<meta charset=\"klingon\">";
    assert_eq!(
        BodyDeclarationDetector::new(4096).detect(body, &HeaderMap::new()),
        None
    );
}

#[test]
fn test_resolver_priority_order() {
    let config = ResponseConfig::default();
    let body = b"\xef\xbb\xbf<meta charset=\"cp1252\">";
    let headers = content_type(b"text/html; charset=shift_jis");

    let resolver = EncodingResolver::new(Some(Charset::from_label("koi8-r")), &config);
    assert_eq!(resolver.declared(body, &headers).unwrap().name(), "KOI8-R");

    let resolver = EncodingResolver::new(None, &config);
    assert_eq!(resolver.declared(body, &headers), Some(&Charset::Known(UTF_8)));

    let resolver = EncodingResolver::new(None, &config);
    assert_eq!(
        resolver.declared(&body[3..], &headers),
        Some(&Charset::Known(SHIFT_JIS))
    );

    let resolver = EncodingResolver::new(None, &config);
    assert_eq!(
        resolver.declared(&body[3..], &HeaderMap::new()),
        Some(&Charset::Known(WINDOWS_1252))
    );

    let resolver = EncodingResolver::new(None, &config);
    assert_eq!(resolver.declared(b"plain", &HeaderMap::new()), None);
}

#[test]
fn test_resolver_memoizes_each_detector() {
    let bom_calls = Arc::new(AtomicUsize::new(0));
    let header_calls = Arc::new(AtomicUsize::new(0));
    let resolver = EncodingResolver::with_detectors(vec![
        Box::new(CountingDetector {
            kind: DetectorKind::ByteOrderMark,
            answer: None,
            calls: Arc::clone(&bom_calls),
        }),
        Box::new(CountingDetector {
            kind: DetectorKind::ContentTypeHeader,
            answer: Some(Charset::Known(UTF_8)),
            calls: Arc::clone(&header_calls),
        }),
    ]);
    let headers = HeaderMap::new();

    assert_eq!(resolver.detect(DetectorKind::ByteOrderMark, b"", &headers), None);
    for _ in 0..3 {
        assert_eq!(
            resolver.declared(b"", &headers),
            Some(&Charset::Known(UTF_8))
        );
    }
    assert_eq!(
        resolver.detect(DetectorKind::ContentTypeHeader, b"", &headers),
        Some(&Charset::Known(UTF_8))
    );

    assert_eq!(bom_calls.load(Ordering::SeqCst), 1);
    assert_eq!(header_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_resolver_stops_at_first_answer() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let resolver = EncodingResolver::with_detectors(vec![
        Box::new(OverrideDetector::new(Some(Charset::Known(UTF_8)))),
        Box::new(CountingDetector {
            kind: DetectorKind::BodyDeclaration,
            answer: Some(Charset::Known(WINDOWS_1252)),
            calls: Arc::clone(&later_calls),
        }),
    ]);
    assert_eq!(
        resolver.declared(b"", &HeaderMap::new()),
        Some(&Charset::Known(UTF_8))
    );
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_resolver_missing_detector_kind_abstains() {
    let resolver = EncodingResolver::with_detectors(Vec::new());
    assert_eq!(
        resolver.detect(DetectorKind::ByteOrderMark, b"\xef\xbb\xbf", &HeaderMap::new()),
        None
    );
}

#[test]
fn test_detector_kind_indices_follow_priority() {
    use strum::IntoEnumIterator;
    let indices: Vec<usize> = DetectorKind::iter().map(DetectorKind::index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_decode_declared_bom_beats_declared_encoding() {
    let body = b"\xef\xbb\xbfcaf\xc3\xa9";
    let materialized = decode_declared(
        &EncodingRsDecoder,
        &Charset::Known(WINDOWS_1252),
        body,
        Some(&Charset::Known(UTF_8)),
        || None,
    );
    assert_eq!(materialized.text, "café");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert!(!materialized.lossy);
}

#[test]
fn test_decode_declared_utf16_bom_is_stripped() {
    let body = b"\xff\xfeh\x00i\x00";
    let bom = Charset::Known(UTF_16LE);
    let materialized = decode_declared(&EncodingRsDecoder, &bom, body, Some(&bom), || None);
    assert_eq!(materialized.text, "hi");
}

#[test]
fn test_decode_declared_utf32_boms() {
    let little = Charset::Utf32 { big_endian: false };
    let body = b"\xff\xfe\x00\x00h\x00\x00\x00i\x00\x00\x00";
    let materialized = decode_declared(&EncodingRsDecoder, &little, body, Some(&little), || None);
    assert_eq!(materialized.text, "hi");
    assert_eq!(materialized.charset.name(), "UTF-32LE");
    assert!(!materialized.lossy);

    let big = Charset::Utf32 { big_endian: true };
    let body = b"\x00\x00\xfe\xff\x00\x00\x00h\x00\x01\xf6\x00";
    let materialized = decode_declared(&EncodingRsDecoder, &big, body, Some(&big), || None);
    assert_eq!(materialized.text, "h\u{1f600}");
}

#[test]
fn test_decode_declared_bare_utf16_label_is_big_endian() {
    let declared = Charset::from_label("utf-16");
    let materialized = decode_declared(&EncodingRsDecoder, &declared, b"\x00h\x00i", None, || None);
    assert_eq!(materialized.text, "hi");
    assert_eq!(materialized.charset, Charset::Known(UTF_16BE));

    // An explicit byte order is kept
    let declared = Charset::from_label("utf-16le");
    let materialized = decode_declared(&EncodingRsDecoder, &declared, b"h\x00i\x00", None, || None);
    assert_eq!(materialized.text, "hi");
}

#[test]
fn test_decode_utf32_replaces_invalid_units() {
    let (text, lossy) = decode::decode_utf32(b"h\x00\x00\x00\x00\xd8\x00\x00", false);
    assert_eq!(text, "h\u{FFFD}");
    assert!(lossy);

    let (text, lossy) = decode::decode_utf32(b"\x00\x00\x00hi", true);
    assert_eq!(text, "h\u{FFFD}");
    assert!(lossy);

    assert_eq!(decode::decode_utf32(b"", true), (String::new(), false));
}

#[test]
fn test_decode_declared_unrecognized_falls_back() {
    let declared = Charset::from_label("x-unknown");
    let materialized = decode_declared(
        &EncodingRsDecoder,
        &declared,
        b"caf\xe9",
        None,
        || Some(WINDOWS_1252),
    );
    assert_eq!(materialized.text, "café");
    assert_eq!(materialized.charset.name(), "x-unknown");

    let materialized = decode_declared(&EncodingRsDecoder, &declared, b"caf\xe9", None, || None);
    assert_eq!(materialized.text, "caf\u{FFFD}");
    assert!(materialized.lossy);
}

#[test]
fn test_decode_declared_mismatch_is_lossy_not_fatal() {
    let materialized = decode_declared(
        &EncodingRsDecoder,
        &Charset::Known(UTF_8),
        b"caf\xe9",
        None,
        || None,
    );
    assert_eq!(materialized.text, "caf\u{FFFD}");
    assert!(materialized.lossy);
}

#[test]
fn test_autodetect_ascii_body() {
    let materialized = autodetect(&EncodingRsDecoder, &ResponseConfig::default(), b"hello");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert_eq!(materialized.text, "hello");
    assert!(!materialized.lossy);
}

#[test]
fn test_autodetect_utf8_body() {
    let materialized = autodetect(
        &EncodingRsDecoder,
        &ResponseConfig::default(),
        "naïve".as_bytes(),
    );
    assert_eq!(materialized.charset, Charset::Known(UTF_8));
    assert_eq!(materialized.text, "naïve");
}

#[test]
fn test_autodetect_legacy_body() {
    let materialized = autodetect(&EncodingRsDecoder, &ResponseConfig::default(), b"na\xefve");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert_eq!(materialized.text, "naïve");
    assert!(!materialized.lossy);
}

#[test]
fn test_autodetect_lossy_default_fallback() {
    let config = ResponseConfig {
        autodetect_encodings: vec!["ascii".to_string(), "utf-8".to_string()],
        ..Default::default()
    };
    let materialized = autodetect(&EncodingRsDecoder, &config, b"na\xefve");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert_eq!(materialized.text, "na\u{FFFD}ve");
    assert!(materialized.lossy);
}

#[test]
fn test_autodetect_lossy_fallback_with_non_ascii_default() {
    let config = ResponseConfig {
        default_encoding: "utf-8".to_string(),
        autodetect_encodings: vec!["ascii".to_string()],
        ..Default::default()
    };
    let materialized = autodetect(&EncodingRsDecoder, &config, b"ok \xff");
    assert_eq!(materialized.charset, Charset::Known(UTF_8));
    assert_eq!(materialized.text, "ok \u{FFFD}");
    assert!(materialized.lossy);
}

#[test]
fn test_autodetect_cp1252_rejects_undefined_bytes() {
    let materialized = autodetect(&EncodingRsDecoder, &ResponseConfig::default(), b"a\x81\xff");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert_eq!(materialized.text, "a\u{FFFD}\u{FFFD}");
    assert!(materialized.lossy);

    // latin1 maps every byte, so it still accepts the body
    let config = ResponseConfig {
        autodetect_encodings: vec!["latin1".to_string()],
        ..Default::default()
    };
    let materialized = autodetect(&EncodingRsDecoder, &config, b"a\x81");
    assert_eq!(materialized.text, "a\u{81}");
    assert!(!materialized.lossy);
}

#[test]
fn test_autodetect_cp1252_default_replaces_undefined_bytes() {
    let config = ResponseConfig {
        default_encoding: "cp1252".to_string(),
        autodetect_encodings: vec!["utf-8".to_string()],
        ..Default::default()
    };
    let materialized = autodetect(&EncodingRsDecoder, &config, b"\x80\x9d\xe9");
    assert_eq!(materialized.charset, Charset::Known(WINDOWS_1252));
    assert_eq!(materialized.text, "\u{20ac}\u{FFFD}\u{e9}");
    assert!(materialized.lossy);
}
