use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Tokenize text: lowercase, strip non-word characters, split on whitespace.
/// Duplicates and order are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().map(str::to_string).collect()
}

/// Normalize a single raw token the way [`tokenize`] would. Returns `None`
/// when nothing is left.
pub fn normalize_term(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let term: String = stripped.split_whitespace().collect();
    if term.is_empty() { None } else { Some(term) }
}

/// Cache-key form of a query: lowercase, trimmed, whitespace runs collapsed.
pub fn normalize_query(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The Quick, brown fox!");
        assert_eq!(t, vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn strips_punctuation_inside_words() {
        assert_eq!(tokenize("don't re-index"), vec!["dont", "reindex"]);
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(tokenize("zzz_not_present 2024"), vec!["zzz_not_present", "2024"]);
    }

    #[test]
    fn drops_empty_tokens() {
        assert!(tokenize("  -- !! ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn normalizes_single_term() {
        assert_eq!(normalize_term("Apple,"), Some("apple".to_string()));
        assert_eq!(normalize_term("?!"), None);
    }

    #[test]
    fn query_normalization_collapses_case_and_spacing() {
        assert_eq!(normalize_query("  Quick   Brown\tFox "), "quick brown fox");
        assert_eq!(normalize_query("   "), "");
    }
}
