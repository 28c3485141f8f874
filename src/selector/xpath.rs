//! Translation of location-path XPath expressions to CSS.
//!
//! Only the subset that has a direct CSS equivalent is accepted:
//! absolute paths built from `/` and `//` steps, element names or `*`,
//! attribute predicates `[@name]` and `[@name='value']`, and a final
//! `@name` or `text()` step. Anything else is `QueryError::UnsupportedXPath`.

use std::sync::LazyLock;

use regex::Regex;

use super::html::Pseudo;
use crate::error_handling::QueryError;

const ELEMENT_STEP_PATTERN: &str = r"^([A-Za-z_][\w.-]*|\*)((?:\[[^\]]*\])*)$";
const PREDICATE_PATTERN: &str = r"\[([^\]]*)\]";
const ATTRIBUTE_TEST_PATTERN: &str =
    r#"^\s*@([A-Za-z_][\w:.-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'))?\s*$"#;
const ATTRIBUTE_NAME_PATTERN: &str = r"^[A-Za-z_][\w:.-]*$";

static ELEMENT_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ELEMENT_STEP_PATTERN).expect("Failed to compile XPath step regex - this is a bug")
});

static PREDICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(PREDICATE_PATTERN).expect("Failed to compile XPath predicate regex - this is a bug")
});

static ATTRIBUTE_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ATTRIBUTE_TEST_PATTERN)
        .expect("Failed to compile XPath attribute test regex - this is a bug")
});

static ATTRIBUTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ATTRIBUTE_NAME_PATTERN)
        .expect("Failed to compile XPath attribute name regex - this is a bug")
});

/// A CSS selector plus what to extract from its matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Translated {
    pub(crate) css: String,
    pub(crate) pseudo: Option<Pseudo>,
}

/// Translates `expr` to CSS.
pub(crate) fn translate(expr: &str) -> Result<Translated, QueryError> {
    let unsupported = || QueryError::UnsupportedXPath(expr.to_string());

    let mut rest = expr.trim();
    if rest.is_empty() {
        return Err(unsupported());
    }

    let mut css = String::new();
    let mut pseudo = None;

    while !rest.is_empty() {
        // An attribute or text() step must be the last one
        if pseudo.is_some() {
            return Err(unsupported());
        }

        let (descendant, after) = if let Some(after) = rest.strip_prefix("//") {
            (true, after)
        } else if let Some(after) = rest.strip_prefix('/') {
            (false, after)
        } else {
            return Err(unsupported());
        };
        let end = step_end(after);
        let step = after[..end].trim();
        rest = &after[end..];

        if let Some(name) = step.strip_prefix('@') {
            if !ATTRIBUTE_NAME.is_match(name) {
                return Err(unsupported());
            }
            if descendant {
                push_combinator(&mut css, true);
                css.push_str(&format!("[{name}]"));
            } else if css.is_empty() {
                return Err(unsupported());
            }
            pseudo = Some(Pseudo::Attr(name.to_string()));
            continue;
        }

        if step == "text()" {
            if descendant || css.is_empty() {
                return Err(unsupported());
            }
            pseudo = Some(Pseudo::Text);
            continue;
        }

        let caps = ELEMENT_STEP.captures(step).ok_or_else(unsupported)?;
        let first = css.is_empty();
        push_combinator(&mut css, descendant);
        css.push_str(&caps[1]);
        for predicate in PREDICATE.captures_iter(&caps[2]) {
            let test = ATTRIBUTE_TEST
                .captures(&predicate[1])
                .ok_or_else(unsupported)?;
            let name = &test[1];
            match test.get(2).or_else(|| test.get(3)) {
                Some(value) => css.push_str(&format!(
                    "[{name}=\"{}\"]",
                    value.as_str().replace('\\', "\\\\").replace('"', "\\\"")
                )),
                None => css.push_str(&format!("[{name}]")),
            }
        }
        // "/html" selects the document element itself
        if first && !descendant {
            css.push_str(":root");
        }
    }

    Ok(Translated { css, pseudo })
}

/// Byte offset of the next `/` outside a predicate.
fn step_end(path: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return i,
            _ => {}
        }
    }
    path.len()
}

fn push_combinator(css: &mut String, descendant: bool) {
    if css.is_empty() {
        return;
    }
    css.push_str(if descendant { " " } else { " > " });
}
