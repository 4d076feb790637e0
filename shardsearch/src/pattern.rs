//! Strips shell-introduced quoting artifacts from the raw pattern argument.
//!
//! This is a textual heuristic, not a shell-unescaping grammar: when the
//! argument arrives wrapped in double quotes, every `"` and every `\` is
//! deleted in a single left-to-right compaction; when it arrives wrapped in
//! single quotes, every `'` is deleted; otherwise the argument is returned
//! unchanged. The relative order of the remaining bytes is preserved.
//!
//! Known limitation, kept deliberately: an escaped quote such as `\"` is
//! deleted along with the delimiter noise rather than restored to a literal
//! quote. The intended escaping grammar of the invoking shell is unknown
//! here, so the normalizer only removes delimiter characters and never
//! rewrites them.

/// Returns the literal byte sequence meant for matching.
///
/// Always succeeds. The result may be empty, which the caller must reject
/// (a valid pattern has at least one byte).
pub fn normalize_pattern(raw: &str) -> String {
    match raw.as_bytes().first() {
        Some(b'"') => raw.chars().filter(|&c| c != '"' && c != '\\').collect(),
        Some(b'\'') => raw.chars().filter(|&c| c != '\'').collect(),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_pattern_unchanged() {
        assert_eq!(normalize_pattern("abc"), "abc");
        assert_eq!(normalize_pattern("a\\b"), "a\\b");
        assert_eq!(normalize_pattern(""), "");
    }

    #[test]
    fn test_double_quoted_pattern() {
        assert_eq!(normalize_pattern("\"abc\""), "abc");
        assert_eq!(normalize_pattern("\"a b c\""), "a b c");
        // Backslashes go too, even mid-pattern.
        assert_eq!(normalize_pattern("\"a\\nb\""), "anb");
    }

    #[test]
    fn test_single_quoted_pattern() {
        assert_eq!(normalize_pattern("'abc'"), "abc");
        // Backslashes survive inside single quotes.
        assert_eq!(normalize_pattern("'a\\b'"), "a\\b");
    }

    #[test]
    fn test_interior_quotes_are_deleted_not_restored() {
        // Documented limitation: \" collapses to nothing, not to a quote.
        assert_eq!(normalize_pattern("\"say \\\"hi\\\"\""), "say hi");
        assert_eq!(normalize_pattern("'it''s'"), "its");
    }

    #[test]
    fn test_can_produce_empty_pattern() {
        assert_eq!(normalize_pattern("\"\""), "");
        assert_eq!(normalize_pattern("''"), "");
    }
}
