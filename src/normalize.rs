//! Domain input normalization
//!
//! Raw user input arrives as anything from `MyBrand.COM` to
//! `https://www.mybrand.com/landing`. Every provider must see the same
//! canonical string, so normalization runs once, before any source is
//! queried.

/// Normalize raw user input into a canonical checkable domain.
///
/// Lowercases, strips an optional leading `http://` or `https://`, strips an
/// optional leading `www.`, and truncates at the first `/`. Pure and
/// idempotent.
pub fn normalize_domain(raw: &str) -> String {
    let mut domain = raw.trim().to_lowercase();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = domain.strip_prefix(scheme) {
            domain = rest.to_string();
            break;
        }
    }

    if let Some(rest) = domain.strip_prefix("www.") {
        domain = rest.to_string();
    }

    if let Some(slash) = domain.find('/') {
        domain.truncate(slash);
    }

    domain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        assert_eq!(normalize_domain("Example.COM"), "example.com");
    }

    #[test]
    fn test_strips_scheme() {
        assert_eq!(normalize_domain("http://example.com"), "example.com");
        assert_eq!(normalize_domain("https://example.com"), "example.com");
    }

    #[test]
    fn test_strips_www() {
        assert_eq!(normalize_domain("www.example.com"), "example.com");
    }

    #[test]
    fn test_truncates_path() {
        assert_eq!(normalize_domain("example.com/some/path?q=1"), "example.com");
    }

    #[test]
    fn test_combined() {
        assert_eq!(
            normalize_domain("HTTPS://WWW.Example.com/path"),
            "example.com"
        );
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "HTTPS://WWW.Example.com/path",
            "www.test.io",
            "plain.org",
            "  spaced.net  ",
        ] {
            let once = normalize_domain(input);
            assert_eq!(normalize_domain(&once), once);
        }
    }

    #[test]
    fn test_scheme_only_stripped_once() {
        // www embedded mid-string must survive
        assert_eq!(normalize_domain("mywww.example.com"), "mywww.example.com");
        assert_eq!(
            normalize_domain("https://www.www.example.com"),
            "www.example.com"
        );
    }
}
