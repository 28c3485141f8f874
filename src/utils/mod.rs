//! Shared helpers.
//!
//! This module provides:
//! - HTML5 whitespace stripping and preview sanitization
//! - CSS selector parsing utilities

pub mod sanitize;
mod selector;

pub use sanitize::{preview, strip_html5_whitespace};
pub use selector::{parse_selector, parse_selector_unsafe};
