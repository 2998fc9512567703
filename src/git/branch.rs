//! Branch-name sanitization
//!
//! Git ref names reject a handful of characters and sequences; user
//! input (application names, versions) must be cleaned before it can be
//! embedded in a branch name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters not allowed in a git ref component
static INVALID_REF_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s~^:?*\[\\\x00-\x1f\x7f]+|\.\.+|@\{|//+").unwrap());

/// Separator runs left behind by the replacement pass
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Maximum length of a generated branch name
const MAX_BRANCH_LEN: usize = 63;

/// Sanitizes an arbitrary string into a valid git branch name
///
/// Lower-cases the input, replaces whitespace and characters git refuses
/// in ref names with `-`, collapses separator runs and trims separators
/// and dots from the ends. Never returns an empty string.
#[must_use]
pub fn sanitize_branch_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = INVALID_REF_CHARS.replace_all(&lowered, "-");
    let collapsed = SEPARATOR_RUNS.replace_all(&replaced, "-");
    let trimmed: String = collapsed
        .trim_matches(|c| c == '-' || c == '.' || c == '/')
        .chars()
        .take(MAX_BRANCH_LEN)
        .collect();
    let trimmed = trimmed
        .trim_end_matches(|c| c == '-' || c == '.' || c == '/')
        .to_string();

    if trimmed.is_empty() {
        "branch".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_branch_name("feature/login"), "feature/login");
        assert_eq!(sanitize_branch_name("fix-123"), "fix-123");
    }

    #[test]
    fn test_lowercased() {
        assert_eq!(sanitize_branch_name("Feature/Login"), "feature/login");
    }

    #[test]
    fn test_whitespace_replaced() {
        assert_eq!(sanitize_branch_name("my new branch"), "my-new-branch");
        assert_eq!(sanitize_branch_name("tabs\tand  spaces"), "tabs-and-spaces");
    }

    #[test]
    fn test_invalid_ref_sequences_replaced() {
        assert_eq!(sanitize_branch_name("a..b"), "a-b");
        assert_eq!(sanitize_branch_name("a@{b"), "a-b");
        assert_eq!(sanitize_branch_name("what?:name"), "what-name");
        assert_eq!(sanitize_branch_name("path//to"), "path-to");
    }

    #[test]
    fn test_edges_trimmed() {
        assert_eq!(sanitize_branch_name("-branch-"), "branch");
        assert_eq!(sanitize_branch_name(".hidden."), "hidden");
    }

    #[test]
    fn test_never_empty() {
        assert_eq!(sanitize_branch_name(""), "branch");
        assert_eq!(sanitize_branch_name("???"), "branch");
        assert_eq!(sanitize_branch_name("--"), "branch");
    }

    #[test]
    fn test_length_capped() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_branch_name(&long).len(), 63);
    }
}
