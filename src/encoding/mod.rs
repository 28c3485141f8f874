//! Character encoding resolution and text materialization.
//!
//! The encoding of a response body is decided by a fixed priority chain:
//! 1. an explicit override given when the response was built
//! 2. a byte-order mark
//! 3. the `charset=` parameter of the `Content-Type` header
//! 4. an in-document declaration (`<meta charset>`, `<?xml encoding>`)
//! 5. auto-detection over candidate encodings, ending in a lossy default
//!
//! Steps 1-4 are `EncodingDetector`s memoized by `EncodingResolver`. Step 5
//! decodes as a side effect, so it lives with text materialization in
//! `decode`, and its text is kept rather than decoded a second time.

mod charset;
mod decode;
mod detectors;
mod resolver;

// Re-export public API
pub use charset::Charset;
pub use decode::{BodyDecoder, EncodingRsDecoder, Materialized};
pub use detectors::{
    content_type_charset, BodyDeclarationDetector, BomDetector, ContentTypeDetector,
    DetectorKind, EncodingDetector, OverrideDetector,
};
pub use resolver::EncodingResolver;

pub(crate) use decode::{autodetect, decode_declared, decode_utf32};
pub(crate) use detectors::sniff_bom;
