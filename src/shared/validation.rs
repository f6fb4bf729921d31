use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for source URLs accepted by the clipper
    /// Must be an absolute http(s) URL with a host
    /// - Valid: "https://example.com/cafe-post", "http://instagram.com/p/abc"
    /// - Invalid: "ftp://example.com", "example.com/post", "https://", "mailto:a@b.c"
    pub static ref HTTP_URL_REGEX: Regex = Regex::new(r"(?i)^https?://[^\s/?#]+\S*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_url_regex_valid() {
        assert!(HTTP_URL_REGEX.is_match("https://example.com/cafe-post"));
        assert!(HTTP_URL_REGEX.is_match("http://instagram.com/p/abc?igsh=1"));
        assert!(HTTP_URL_REGEX.is_match("HTTPS://EXAMPLE.COM"));
        assert!(HTTP_URL_REGEX.is_match("https://localhost:8080/x#frag"));
    }

    #[test]
    fn test_http_url_regex_invalid() {
        assert!(!HTTP_URL_REGEX.is_match("ftp://example.com")); // wrong scheme
        assert!(!HTTP_URL_REGEX.is_match("example.com/post")); // no scheme
        assert!(!HTTP_URL_REGEX.is_match("https://")); // no host
        assert!(!HTTP_URL_REGEX.is_match("mailto:a@b.c"));
        assert!(!HTTP_URL_REGEX.is_match("https://exa mple.com")); // whitespace
        assert!(!HTTP_URL_REGEX.is_match(""));
    }
}
