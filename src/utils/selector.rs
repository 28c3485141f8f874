//! CSS selector parsing utilities.

use scraper::Selector;

use crate::error_handling::QueryError;

/// Parses a caller-supplied CSS selector.
///
/// # Errors
///
/// Returns `QueryError::InvalidCss` carrying the parser message.
pub fn parse_selector(selector_str: &str) -> Result<Selector, QueryError> {
    Selector::parse(selector_str).map_err(|e| QueryError::InvalidCss {
        query: selector_str.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a CSS selector that must succeed (for compile-time constants).
///
/// This function panics if parsing fails, which is appropriate for static selectors
/// that are compile-time constants. Use `parse_selector()` for caller input.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - Context description for error messages
///
/// # Panics
///
/// Panics if the selector cannot be parsed (indicates a programming error).
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}
