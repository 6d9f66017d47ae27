use regex::Regex;
use std::sync::LazyLock;

/// Sentinel genre for rows with no usable genre token.
pub const OTHER: &str = "other";

// Bracket and quote punctuation around list-style genre fields,
// e.g. "['dance pop', 'pop']" or "[\"rap\"]"
static GENRE_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\[\]'"]"#).unwrap());

/// Split a raw genre field into trimmed, non-empty tokens (in field order).
fn tokens(raw: &str) -> Vec<String> {
    GENRE_PUNCT_RE
        .replace_all(raw, "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Canonical "primary genre" of a raw genre list: the first non-empty token.
/// Total: empty, absent or token-less input maps to `"other"`.
pub fn primary_genre(raw: Option<&str>) -> String {
    raw.and_then(|r| tokens(r).into_iter().next())
        .unwrap_or_else(|| OTHER.to_string())
}

/// Every genre token of a raw genre list, in order, without duplicates.
pub fn parse_genres(raw: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(r) = raw {
        for g in tokens(r) {
            if !out.contains(&g) {
                out.push(g);
            }
        }
    }
    out
}

/// Whether the raw genre list contains `genre` as one of its tokens.
pub fn has_genre(raw: Option<&str>, genre: &str) -> bool {
    raw.is_some_and(|r| tokens(r).iter().any(|g| g == genre))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_genre_list_field() {
        assert_eq!(primary_genre(Some("['pop', 'rap']")), "pop");
        assert_eq!(primary_genre(Some("['dance pop', 'pop']")), "dance pop");
        assert_eq!(primary_genre(Some("[\"canadian hip hop\"]")), "canadian hip hop");
    }

    #[test]
    fn test_primary_genre_fallbacks() {
        assert_eq!(primary_genre(Some("")), "other");
        assert_eq!(primary_genre(None), "other");
        assert_eq!(primary_genre(Some("[]")), "other");
        assert_eq!(primary_genre(Some("[ , '' ,]")), "other");
        assert_eq!(primary_genre(Some("   ")), "other");
    }

    #[test]
    fn test_primary_genre_skips_leading_empty_tokens() {
        assert_eq!(primary_genre(Some("[, 'k-pop']")), "k-pop");
        // Plain comma-separated text works too
        assert_eq!(primary_genre(Some("rock, blues")), "rock");
    }

    #[test]
    fn test_primary_genre_deterministic_and_non_empty() {
        let inputs = [
            Some("['pop']"), Some(""), None, Some("[[[]]]"), Some("'''"),
            Some(",,,"), Some("['latin', 'reggaeton']"), Some("\u{00e9}lectro"),
        ];
        for input in inputs {
            let a = primary_genre(input);
            let b = primary_genre(input);
            assert!(!a.is_empty(), "empty genre for {:?}", input);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_parse_genres_dedups_in_order() {
        assert_eq!(
            parse_genres(Some("['pop', 'rap', 'pop', ' trap ']")),
            vec!["pop", "rap", "trap"]
        );
        assert!(parse_genres(Some("[]")).is_empty());
        assert!(parse_genres(None).is_empty());
    }

    #[test]
    fn test_has_genre() {
        let raw = Some("['canadian hip hop', 'rap']");
        assert!(has_genre(raw, "rap"));
        assert!(has_genre(raw, "canadian hip hop"));
        assert!(!has_genre(raw, "hip hop"));
        assert!(!has_genre(None, "rap"));
    }
}
