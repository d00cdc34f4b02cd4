//! # Sanitization pipeline
//!
//! Pure functions that rewrite externally supplied markup before it is
//! admitted into a document. Externally supplied initial content is always
//! sanitized; pasted HTML is sanitized only when it actually carries color
//! declarations (see the editor's paste handling).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static STYLE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(\s?)style\s*=\s*("[^"]*"|'[^']*')"#).unwrap());

// Property name must sit at a declaration boundary so `border-color` and
// prose mentioning "color:" are left alone.
static COLOR_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|[;\s])\s*(?:background-)?color\s*:\s*[^;]*;?").unwrap());

/// Strip `color:` and `background-color:` declarations from `style`
/// attribute values.
///
/// Only style attributes are rewritten: text content and other `*-color`
/// properties pass through untouched. A `style` attribute left empty by the
/// stripping is removed entirely.
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(markup: &str) -> String {
    STYLE_ATTR_RE
        .replace_all(markup, |caps: &Captures| {
            let quoted = &caps[2];
            let value = &quoted[1..quoted.len() - 1];
            let stripped = COLOR_DECL_RE.replace_all(value, "$1");
            if stripped.trim().is_empty() {
                String::new()
            } else {
                format!("{}style=\"{}\"", &caps[1], stripped)
            }
        })
        .into_owned()
}

/// Whether any style attribute carries a declaration the pipeline would
/// strip.
pub fn has_color_styles(markup: &str) -> bool {
    STYLE_ATTR_RE.captures_iter(markup).any(|caps| {
        let quoted = &caps[2];
        COLOR_DECL_RE.is_match(&quoted[1..quoted.len() - 1])
    })
}
