//! Configuration constants.
//!
//! This module defines the defaults used by encoding detection, text decoding
//! and base URL discovery.

/// Encoding assumed when nothing else is known about a body.
///
/// `ascii` is resolved the way browsers resolve it, to `windows-1252`, but the
/// auto-detection step still treats it as strict 7-bit ASCII when testing
/// whether a body decodes cleanly.
pub const DEFAULT_ENCODING: &str = "ascii";

/// Candidate encodings tried in order when no encoding is declared anywhere.
pub const DEFAULT_AUTODETECT_ENCODINGS: [&str; 3] = ["ascii", "utf-8", "cp1252"];

/// Number of body bytes inspected for an in-document encoding declaration.
/// HTML5 only requires 1024; legacy pages put the meta tag further down.
pub const BODY_DECLARATION_SCAN_LIMIT: usize = 4096;

/// Number of text characters inspected for a `<base href>` element.
pub const BASE_URL_SCAN_LIMIT: usize = 4096;

/// Maximum length of an element rendering embedded in an error message.
pub const MAX_ELEMENT_PREVIEW_CHARS: usize = 200;

/// Labels that mean "7-bit ASCII" to auto-detection.
pub const ASCII_LABELS: [&str; 3] = ["ascii", "us-ascii", "ansi_x3.4-1968"];

/// Labels that mean the strict cp1252 codec to auto-detection.
pub const CP1252_LABELS: [&str; 3] = ["cp1252", "windows-1252", "x-cp1252"];

/// Bytes cp1252 leaves undefined. windows-1252 decodes them to C1 controls.
pub const CP1252_UNDEFINED_BYTES: [u8; 5] = [0x81, 0x8d, 0x8f, 0x90, 0x9d];
