//! Utilities for cleaning strings taken from markup.
//!
//! URLs pulled out of attributes are stripped of HTML5 whitespace, and
//! element renderings embedded in error messages are freed of control
//! characters and truncated.

use crate::config::MAX_ELEMENT_PREVIEW_CHARS;

/// Characters HTML5 treats as inter-element whitespace.
const HTML5_WHITESPACE: [char; 5] = [' ', '\t', '\n', '\r', '\x0c'];

/// Strips leading and trailing HTML5 whitespace (space, tab, LF, CR, FF).
///
/// Unlike `str::trim`, non-breaking spaces and other Unicode whitespace are
/// kept: they are significant in URLs.
///
/// # Examples
///
/// ```
/// use text_response::utils::strip_html5_whitespace;
///
/// assert_eq!(strip_html5_whitespace("\n\t /next \x0c"), "/next");
/// ```
pub fn strip_html5_whitespace(text: &str) -> &str {
    text.trim_matches(|c| HTML5_WHITESPACE.contains(&c))
}

/// Removes control characters other than tab, newline and carriage return.
pub fn sanitize_control_chars(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitized rendering of `text` limited to `MAX_ELEMENT_PREVIEW_CHARS`
/// characters, for use in error messages.
pub fn preview(text: &str) -> String {
    let sanitized = sanitize_control_chars(text);
    let char_count = sanitized.chars().count();
    if char_count > MAX_ELEMENT_PREVIEW_CHARS {
        let truncated: String = sanitized.chars().take(MAX_ELEMENT_PREVIEW_CHARS).collect();
        format!("{truncated}... (truncated, original length: {char_count} chars)")
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html5_whitespace() {
        assert_eq!(strip_html5_whitespace(" /x "), "/x");
        assert_eq!(strip_html5_whitespace("\r\n/x\t"), "/x");
        assert_eq!(strip_html5_whitespace("   "), "");
        assert_eq!(strip_html5_whitespace(""), "");
    }

    #[test]
    fn test_strip_html5_whitespace_keeps_nbsp() {
        assert_eq!(strip_html5_whitespace("\u{a0}/x\u{a0}"), "\u{a0}/x\u{a0}");
    }

    #[test]
    fn test_sanitize_control_chars_removes_control_chars() {
        let input = "Error\x00message\x01with\x02control\x03chars";
        assert_eq!(sanitize_control_chars(input), "Errormessagewithcontrolchars");
    }

    #[test]
    fn test_sanitize_control_chars_preserves_unicode_and_newlines() {
        let input = "<a>\n测试 🚀</a>";
        assert_eq!(sanitize_control_chars(input), input);
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("<a>Next</a>"), "<a>Next</a>");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "é".repeat(MAX_ELEMENT_PREVIEW_CHARS + 10);
        let output = preview(&long);
        assert!(output.starts_with(&"é".repeat(MAX_ELEMENT_PREVIEW_CHARS)));
        assert!(output.contains(&format!(
            "original length: {} chars",
            MAX_ELEMENT_PREVIEW_CHARS + 10
        )));
    }
}
