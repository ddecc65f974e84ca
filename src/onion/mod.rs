//! Onion address syntax checking
//!
//! Pure lexical validation of v3 hidden-service addresses: 56 characters
//! drawn from the base32 alphabet `a-z2-7`, followed by `.onion`. v2
//! addresses (16 characters) are deprecated and rejected.

/// Length of the base32 host label in a v3 onion address
const V3_HOST_LEN: usize = 56;

/// Extracts the host segment from a URL-ish string
///
/// Strips an optional scheme (everything up to `://`) and anything after
/// the first `/`. Returns the remaining host segment, which may still be
/// syntactically invalid.
pub fn extract_host(url: &str) -> &str {
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    match without_scheme.find('/') {
        Some(idx) => &without_scheme[..idx],
        None => without_scheme,
    }
}

/// Returns true iff `url` contains a syntactically valid v3 onion host
///
/// Accepts a bare host, or a full URL with scheme and path. Never fails
/// on malformed input; anything without a recognizable v3 host is false.
pub fn is_valid_onion(url: &str) -> bool {
    let host = extract_host(url);

    let Some(label) = host.strip_suffix(".onion") else {
        return false;
    };

    label.len() == V3_HOST_LEN && label.bytes().all(is_base32_byte)
}

fn is_base32_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A syntactically valid v3 address: 56 `a`s
    fn valid_host() -> String {
        format!("{}.onion", "a".repeat(56))
    }

    #[test]
    fn test_valid_bare_host() {
        assert!(is_valid_onion(&valid_host()));
    }

    #[test]
    fn test_valid_full_alphabet() {
        // All of a-z and 2-7 are permitted
        let label = "abcdefghijklmnopqrstuvwxyz234567abcdefghijklmnopqrstuvwx";
        assert_eq!(label.len(), 56);
        assert!(is_valid_onion(&format!("{}.onion", label)));
    }

    #[test]
    fn test_valid_with_scheme_and_path() {
        let url = format!("http://{}/search/?q=test", valid_host());
        assert!(is_valid_onion(&url));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(!is_valid_onion(&format!("{}.onion", "a".repeat(55))));
        assert!(!is_valid_onion(&format!("{}.onion", "a".repeat(57))));
        // v2 addresses are 16 characters
        assert!(!is_valid_onion(&format!("{}.onion", "a".repeat(16))));
    }

    #[test]
    fn test_invalid_characters_rejected() {
        // 0, 1, 8, 9 are not in the base32 alphabet
        assert!(!is_valid_onion(&format!("{}0.onion", "a".repeat(55))));
        assert!(!is_valid_onion(&format!("{}1.onion", "a".repeat(55))));
        assert!(!is_valid_onion(&format!("{}8.onion", "a".repeat(55))));
        // Uppercase is rejected
        assert!(!is_valid_onion(&format!("{}A.onion", "a".repeat(55))));
        // Hyphens are rejected
        assert!(!is_valid_onion("http://invalid-link-for-test.onion"));
    }

    #[test]
    fn test_missing_suffix_rejected() {
        assert!(!is_valid_onion(&"a".repeat(56)));
        assert!(!is_valid_onion(&format!("{}.com", "a".repeat(56))));
    }

    #[test]
    fn test_malformed_input_returns_false() {
        assert!(!is_valid_onion(""));
        assert!(!is_valid_onion("://"));
        assert!(!is_valid_onion("http://"));
        assert!(!is_valid_onion("not a url at all"));
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(extract_host("http://example.onion/path"), "example.onion");
        assert_eq!(extract_host("example.onion/path"), "example.onion");
        assert_eq!(extract_host("example.onion"), "example.onion");
        assert_eq!(extract_host("https://example.onion"), "example.onion");
    }
}
