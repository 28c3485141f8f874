//! Priority-ordered encoding resolution with per-detector memoization.

use std::sync::OnceLock;

use log::debug;
use reqwest::header::HeaderMap;

use super::detectors::{
    BodyDeclarationDetector, BomDetector, ContentTypeDetector, DetectorKind, EncodingDetector,
    OverrideDetector, DETECTOR_COUNT,
};
use super::Charset;
use crate::config::ResponseConfig;

/// Runs the detector chain for one response and remembers every answer.
///
/// The resolver does not own the body or headers; callers pass the same
/// immutable snapshot on every call. Each detector runs at most once, and the
/// chain result is cached separately so that asking for a single detector
/// (e.g. "is there a BOM?") never triggers the others.
pub struct EncodingResolver {
    detectors: Vec<Box<dyn EncodingDetector>>,
    slots: [OnceLock<Option<Charset>>; DETECTOR_COUNT],
    declared: OnceLock<Option<Charset>>,
}

impl EncodingResolver {
    /// Builds the standard chain: override, BOM, `Content-Type`, in-document declaration.
    pub fn new(override_charset: Option<Charset>, config: &ResponseConfig) -> Self {
        Self::with_detectors(vec![
            Box::new(OverrideDetector::new(override_charset)),
            Box::new(BomDetector),
            Box::new(ContentTypeDetector),
            Box::new(BodyDeclarationDetector::new(
                config.body_declaration_scan_limit,
            )),
        ])
    }

    /// Builds a chain from explicit detectors, evaluated in the order given.
    ///
    /// A kind appearing twice shares one cache slot; the first detector of
    /// that kind wins.
    pub fn with_detectors(detectors: Vec<Box<dyn EncodingDetector>>) -> Self {
        Self {
            detectors,
            slots: Default::default(),
            declared: OnceLock::new(),
        }
    }

    /// Result of one detector, computed on first request.
    pub fn detect(
        &self,
        kind: DetectorKind,
        body: &[u8],
        headers: &HeaderMap,
    ) -> Option<&Charset> {
        self.slots[kind.index()]
            .get_or_init(|| {
                self.detectors
                    .iter()
                    .find(|detector| detector.kind() == kind)
                    .and_then(|detector| detector.detect(body, headers))
            })
            .as_ref()
    }

    /// First answer of the chain, or `None` when every detector abstains and
    /// the caller has to fall back to auto-detection.
    pub fn declared(&self, body: &[u8], headers: &HeaderMap) -> Option<&Charset> {
        self.declared
            .get_or_init(|| {
                self.detectors.iter().find_map(|detector| {
                    let charset = self.detect(detector.kind(), body, headers)?;
                    debug!("Encoding {charset} declared by {}", detector.kind());
                    Some(charset.clone())
                })
            })
            .as_ref()
    }
}

impl std::fmt::Debug for EncodingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingResolver")
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.kind()).collect::<Vec<_>>(),
            )
            .field("declared", &self.declared.get())
            .finish()
    }
}
