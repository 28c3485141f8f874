//! Configuration types.
//!
//! This module defines the logging option enums and the `ResponseConfig`
//! struct that tunes encoding detection for a response.

use serde::Deserialize;
use strum_macros::{EnumIter, EnumString};

use crate::config::constants::{
    BASE_URL_SCAN_LIMIT, BODY_DECLARATION_SCAN_LIMIT, DEFAULT_AUTODETECT_ENCODINGS,
    DEFAULT_ENCODING,
};

/// Logging level for the library logger.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for `{field}`: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong with it and what is accepted instead
    pub message: String,
}

/// Tuning knobs for encoding detection and base URL discovery.
///
/// Can be built programmatically or deserialized from a host application's
/// configuration file; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use text_response::ResponseConfig;
///
/// let config = ResponseConfig {
///     default_encoding: "utf-8".to_string(),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Encoding used when auto-detection finds no clean candidate
    pub default_encoding: String,

    /// Candidate encodings tried in order during auto-detection
    pub autodetect_encodings: Vec<String>,

    /// Number of leading body bytes searched for a `<meta charset>` or XML declaration
    pub body_declaration_scan_limit: usize,

    /// Number of leading text characters searched for a `<base href>` element
    pub base_url_scan_limit: usize,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_encoding: DEFAULT_ENCODING.to_string(),
            autodetect_encodings: DEFAULT_AUTODETECT_ENCODINGS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            body_declaration_scan_limit: BODY_DECLARATION_SCAN_LIMIT,
            base_url_scan_limit: BASE_URL_SCAN_LIMIT,
        }
    }
}

impl ResponseConfig {
    /// Checks that every encoding label is known and that scan limits are usable.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if encoding_rs::Encoding::for_label(self.default_encoding.trim().as_bytes()).is_none() {
            return Err(ConfigValidationError {
                field: "default_encoding",
                message: format!(
                    "unknown encoding label '{}'; use a WHATWG label such as 'utf-8' or 'windows-1252'",
                    self.default_encoding
                ),
            });
        }

        if self.autodetect_encodings.is_empty() {
            return Err(ConfigValidationError {
                field: "autodetect_encodings",
                message: "must list at least one candidate encoding".to_string(),
            });
        }

        if let Some(label) = self
            .autodetect_encodings
            .iter()
            .find(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_none())
        {
            return Err(ConfigValidationError {
                field: "autodetect_encodings",
                message: format!("unknown encoding label '{label}'"),
            });
        }

        if self.body_declaration_scan_limit == 0 {
            return Err(ConfigValidationError {
                field: "body_declaration_scan_limit",
                message: "must be greater than 0".to_string(),
            });
        }

        if self.base_url_scan_limit == 0 {
            return Err(ConfigValidationError {
                field: "base_url_scan_limit",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
