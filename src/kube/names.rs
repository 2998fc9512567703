//! Kubernetes name sanitization
//!
//! Resource names must be valid RFC 1123 subdomains; label values allow
//! a slightly wider set. Pipeline and application names arrive as free
//! text and are cleaned here before they name cluster objects.

use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9.-]+").unwrap());
static INVALID_LABEL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Maximum length of a resource name
const MAX_NAME_LEN: usize = 63;

/// Sanitizes a string into a valid Kubernetes resource name
///
/// Lower-cases, replaces invalid characters with `-`, trims to 63
/// characters and strips non-alphanumeric edges. Returns `"x"` for
/// input with no usable characters, since a name must not be empty.
#[must_use]
pub fn to_valid_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = INVALID_NAME_CHARS.replace_all(&lowered, "-");
    let trimmed: String = replaced
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .chars()
        .take(MAX_NAME_LEN)
        .collect();
    let trimmed = trimmed
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string();
    if trimmed.is_empty() {
        "x".to_string()
    } else {
        trimmed
    }
}

/// Sanitizes a string into a valid Kubernetes label value
///
/// Keeps case, replaces invalid characters with `_` and enforces the
/// same 63-character limit. Empty values stay empty (a legal label
/// value).
#[must_use]
pub fn to_valid_value(value: &str) -> String {
    let replaced = INVALID_LABEL_CHARS.replace_all(value, "_");
    let trimmed: String = replaced
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .chars()
        .take(MAX_NAME_LEN)
        .collect();
    trimmed
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_names_unchanged() {
        assert_eq!(to_valid_name("my-app"), "my-app");
        assert_eq!(to_valid_name("release-1.2.3"), "release-1.2.3");
    }

    #[test]
    fn test_name_lowercased_and_cleaned() {
        assert_eq!(to_valid_name("My App"), "my-app");
        assert_eq!(to_valid_name("feature/JX-123"), "feature-jx-123");
        assert_eq!(to_valid_name("_internal_"), "internal");
    }

    #[test]
    fn test_name_edges_are_alphanumeric() {
        assert_eq!(to_valid_name("-app-"), "app");
        assert_eq!(to_valid_name(".app."), "app");
    }

    #[test]
    fn test_name_never_empty() {
        assert_eq!(to_valid_name(""), "x");
        assert_eq!(to_valid_name("---"), "x");
    }

    #[test]
    fn test_name_length_cap() {
        let long = format!("a{}", "b".repeat(100));
        assert_eq!(to_valid_name(&long).len(), 63);
    }

    #[test]
    fn test_label_value_keeps_case() {
        assert_eq!(to_valid_value("My App"), "My_App");
        assert_eq!(to_valid_value("v1.2.3"), "v1.2.3");
        assert_eq!(to_valid_value(""), "");
    }
}
