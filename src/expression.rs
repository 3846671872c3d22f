//! Pulls variable references out of free-form condition expressions.
//!
//! This is a text heuristic, not a parser: literals, operators and brackets
//! are scrubbed away and whatever still looks like an identifier or dotted
//! path is reported. Escaped quotes or operators glued to their operands can
//! produce false positives; callers treat the result as a suggestion.

use crate::keywords::is_keyword;
use once_cell::sync::Lazy;
use regex::Regex;

static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"'[^']*'").expect("valid regex"));
static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).expect("valid regex"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)[0-9]+\.?[0-9]*(?-u:\b)").expect("valid regex"));
static OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:and|or|not|in|is|==|!=|<=|>=|<|>)\s+").expect("valid regex")
});
static BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[()\[\]]\s*").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static FUNCTION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)([a-zA-Z_][a-zA-Z0-9_]*)\s*\(\s*([^)]*)\s*\)").expect("valid regex")
});
static PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*").expect("valid regex")
});

/// Variables (roots or dotted paths) referenced by `expression`, skipping
/// template keywords.
pub fn expression_variables(expression: &str) -> Vec<String> {
    expression_variables_with(expression, &is_keyword)
}

/// Like [`expression_variables`] but with a caller-supplied keyword test.
///
/// Names of called functions come first (an unknown function may be a
/// callable from the context), followed by everything found in the
/// scrubbed expression. Duplicates are kept.
pub fn expression_variables_with<F>(expression: &str, is_excluded: &F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut variables = Vec::new();

    let cleaned = SINGLE_QUOTED.replace_all(expression, "");
    let cleaned = DOUBLE_QUOTED.replace_all(&cleaned, "");
    let cleaned = NUMBER.replace_all(&cleaned, "");
    let cleaned = OPERATOR.replace_all(&cleaned, " ");
    let cleaned = BRACKET.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    // Arguments never contain ')', so this recursion is at most one level deep.
    for call in FUNCTION_CALL.captures_iter(expression) {
        let name = &call[1];
        let args = &call[2];

        if !is_excluded(name) {
            variables.push(name.to_string());
        }
        if !args.trim().is_empty() {
            variables.extend(expression_variables_with(args, is_excluded));
        }
    }

    for found in PATH.find_iter(cleaned) {
        let path = found.as_str();
        let root = path.split('.').next().unwrap_or(path);
        if !is_excluded(root) {
            variables.push(path.to_string());
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_comparison() {
        assert_eq!(
            expression_variables("user.age >= 18 and is_admin"),
            vec!["user.age", "is_admin"]
        );
    }

    #[test]
    fn test_string_literals_are_ignored() {
        assert_eq!(
            expression_variables("status == 'active' or mode != \"dark mode\""),
            vec!["status", "mode"]
        );
    }

    #[test]
    fn test_keywords_are_skipped() {
        assert_eq!(expression_variables("not loop.first and x is defined"), vec!["x"]);
        assert!(expression_variables("true").is_empty());
        assert!(expression_variables("None").is_empty());
    }

    #[test]
    fn test_numbers_do_not_leak() {
        assert_eq!(expression_variables("count > 3.5"), vec!["count"]);
    }

    #[test]
    fn test_unknown_function_counts_as_variable() {
        assert_eq!(
            expression_variables("has_access(user.role, 'admin')"),
            vec!["has_access", "user.role", "has_access", "user.role"]
        );
    }

    #[test]
    fn test_builtin_function_arguments() {
        assert_eq!(expression_variables("len(items) > 0"), vec!["items", "items"]);
    }

    #[test]
    fn test_in_operator() {
        assert_eq!(
            expression_variables("role in allowed_roles"),
            vec!["role", "allowed_roles"]
        );
    }

    #[test]
    fn test_custom_exclusion() {
        let excluded = |name: &str| is_keyword(name) || name == "config";
        assert_eq!(
            expression_variables_with("config.debug or verbose", &excluded),
            vec!["verbose"]
        );
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        assert_eq!(expression_variables("éuser and x2"), vec!["user", "x2"]);
    }

    #[test]
    fn test_empty_expression() {
        assert!(expression_variables("").is_empty());
        assert!(expression_variables("   ").is_empty());
    }
}
