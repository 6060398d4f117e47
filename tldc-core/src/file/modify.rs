use crate::file::error::AccessError;

/// Replaces the single occurrence of `search` in `content`.
///
/// Models tend to escape quotes in arguments that are already JSON encoded.
/// When the literal search text does not match exactly once, a copy with
/// `\"` turned into `"` is tried before giving up.
pub fn apply_edit(content: &str, search: &str, replace: &str) -> Result<String, AccessError> {
    let matches = content.matches(search).count();
    if matches == 1 {
        return Ok(content.replacen(search, replace, 1));
    }

    let unescaped = search.replace("\\\"", "\"");
    if unescaped != search && content.matches(unescaped.as_str()).count() == 1 {
        return Ok(content.replacen(&unescaped, replace, 1));
    }

    Err(AccessError::AmbiguousEdit { matches })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_match_is_replaced() {
        let updated = apply_edit("fn a() {}\nfn b() {}\n", "fn b", "fn c").unwrap();
        assert_eq!(updated, "fn a() {}\nfn c() {}\n");
    }

    #[test]
    fn test_zero_and_multiple_matches_are_rejected() {
        assert_eq!(
            apply_edit("abc", "x", "y"),
            Err(AccessError::AmbiguousEdit { matches: 0 })
        );
        assert_eq!(
            apply_edit("x x", "x", "y"),
            Err(AccessError::AmbiguousEdit { matches: 2 })
        );
    }

    #[test]
    fn test_escaped_quotes_fallback() {
        let content = r#"print("hello")"#;
        let updated = apply_edit(content, r#"print(\"hello\")"#, r#"print("bye")"#).unwrap();
        assert_eq!(updated, r#"print("bye")"#);
    }

    #[test]
    fn test_error_message() {
        let err = apply_edit("aa", "a", "b").unwrap_err();
        assert_eq!(err.to_string(), "search matches != 1 (found 2)");
    }
}
