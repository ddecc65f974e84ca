//! Keyword matching over fetched page text
//!
//! A pure substring scan: no network, no side effects.

/// Returns the subset of keywords found in the text, case-insensitively
///
/// Preserves keyword order. Empty input text or keyword list yields an
/// empty result.
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| lowered.contains(&k.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_returns_matching_subset() {
        let hits = match_keywords(
            "the page mentions a secret and nothing else",
            &kw(&["secret", "other"]),
        );
        assert_eq!(hits, vec!["secret"]);
    }

    #[test]
    fn test_case_insensitive_both_ways() {
        assert_eq!(
            match_keywords("LEAKED@EXAMPLE.COM found here", &kw(&["leaked@example.com"])),
            kw(&["leaked@example.com"])
        );
        assert_eq!(
            match_keywords("password dump", &kw(&["PassWord"])),
            kw(&["PassWord"])
        );
    }

    #[test]
    fn test_matches_inside_html() {
        let html = "<html><body><p>my secret plan</p></body></html>";
        assert_eq!(match_keywords(html, &kw(&["secret"])), kw(&["secret"]));
    }

    #[test]
    fn test_no_content_no_match() {
        assert!(match_keywords("", &kw(&["secret"])).is_empty());
        assert!(match_keywords("some text", &kw(&[])).is_empty());
        assert!(match_keywords("some text", &kw(&["absent"])).is_empty());
    }

    #[test]
    fn test_preserves_keyword_order() {
        let hits = match_keywords("b comes after a here", &kw(&["a", "b", "c"]));
        assert_eq!(hits, kw(&["a", "b"]));
    }
}
