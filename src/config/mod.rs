//! Response configuration and constants.
//!
//! This module provides:
//! - Configuration constants (default encodings, scan limits)
//! - Logging option types
//! - `ResponseConfig` and its validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{ConfigValidationError, LogFormat, LogLevel, ResponseConfig};
