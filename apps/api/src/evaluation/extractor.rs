//! Response Extractor: isolates the most plausible JSON substring in raw model text.
//!
//! Two tiers, both deterministic and infallible:
//! - `extract`: strip fences, then first `{` .. last `}`; otherwise the cleaned text.
//! - `extract_aggressive`: only used after the first tier failed to parse.
//!   Repeats the first `{` .. last `}` search, then first `[` .. last `]`,
//!   and finally the cleaned text.

const FENCE: &str = "```";

/// Removes a leading fence (with optional language tag) and a trailing fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix(FENCE) {
        cleaned = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // Single-line fence: drop only the language tag.
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    let trimmed = cleaned.trim_end();
    trimmed.strip_suffix(FENCE).unwrap_or(trimmed).trim()
}

/// Primary tier.
pub fn extract(raw: &str) -> &str {
    let cleaned = strip_code_fences(raw);
    delimited_span(cleaned, '{', '}').unwrap_or(cleaned)
}

/// Fallback tier: braces first, then a bare top-level array.
pub fn extract_aggressive(raw: &str) -> &str {
    let cleaned = strip_code_fences(raw);
    delimited_span(cleaned, '{', '}')
        .or_else(|| delimited_span(cleaned, '[', ']'))
        .unwrap_or(cleaned)
}

/// Span from the first `open` to the last `close`, inclusive, if well ordered.
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let input = "```json\n{\"score\": 40}\n```";
        assert_eq!(strip_code_fences(input), "{\"score\": 40}");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_single_line() {
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  Sorry, I cannot comply.  "), "Sorry, I cannot comply.");
    }

    #[test]
    fn test_strip_fences_without_closing_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_isolates_object_inside_prose() {
        let raw = "Here is my evaluation: {\"score\": 90} Hope this helps!";
        assert_eq!(extract(raw), "{\"score\": 90}");
    }

    #[test]
    fn test_extract_without_braces_returns_cleaned_text() {
        assert_eq!(extract("Sorry, I cannot comply."), "Sorry, I cannot comply.");
    }

    #[test]
    fn test_extract_with_reversed_braces_returns_cleaned_text() {
        assert_eq!(extract("} nothing here {"), "} nothing here {");
    }

    #[test]
    fn test_extract_is_idempotent_over_fence_stripping() {
        let inputs = [
            "```json\n{\"result\":\"Passed\",\"score\":85}\n```",
            "```\nNote: {\"score\": 10}\n```",
            "```json\n[1, 2]\n```",
        ];
        for x in inputs {
            assert_eq!(extract(strip_code_fences(x)), extract(x), "input: {x}");
        }
    }

    #[test]
    fn test_extract_is_idempotent_on_its_own_output() {
        let x = "```json\nsure! {\"score\": 1} bye\n```";
        assert_eq!(extract(extract(x)), extract(x));
    }

    #[test]
    fn test_aggressive_repeats_brace_span_first() {
        let raw = "Template {} -> {\"score\": 90} trailing }";
        assert_eq!(extract_aggressive(raw), extract(raw));
        assert_eq!(extract_aggressive(raw), "{} -> {\"score\": 90} trailing }");
    }

    #[test]
    fn test_aggressive_braces_win_over_brackets() {
        let raw = "[\"a\"] then {\"score\": 1}";
        assert_eq!(extract_aggressive(raw), "{\"score\": 1}");
    }

    #[test]
    fn test_aggressive_uses_brackets_when_braces_are_reversed() {
        let raw = "} see [\"Strong in Go\"] {";
        assert_eq!(extract_aggressive(raw), "[\"Strong in Go\"]");
    }

    #[test]
    fn test_aggressive_falls_back_to_array_span() {
        let raw = "Reasons: [\"Strong in Go\", \"Lacks cloud\"] end";
        assert_eq!(extract_aggressive(raw), "[\"Strong in Go\", \"Lacks cloud\"]");
    }

    #[test]
    fn test_aggressive_last_resort_is_cleaned_text() {
        assert_eq!(
            extract_aggressive("```\nSorry, I cannot comply.\n```"),
            "Sorry, I cannot comply."
        );
    }

    #[test]
    fn test_extractors_accept_empty_input() {
        assert_eq!(extract(""), "");
        assert_eq!(extract_aggressive("   "), "");
    }
}
