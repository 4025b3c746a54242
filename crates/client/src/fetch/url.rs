//! Validation of upstream locations before they are requested.

/// Error type for rejected locations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse an absolute http(s) location.
///
/// Surrounding whitespace is trimmed and any fragment is dropped; the query
/// string is kept verbatim since API endpoints often encode parameters there.
pub fn parse_location(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_content_location() {
        let url = parse_location("https://raw.githubusercontent.com/o/r/main/Normal/1.txt").unwrap();
        assert_eq!(url.host_str(), Some("raw.githubusercontent.com"));
        assert_eq!(url.path(), "/o/r/main/Normal/1.txt");
    }

    #[test]
    fn test_parse_keeps_query_drops_fragment() {
        let url = parse_location("  https://api.example.com/random?type=pc#top ").unwrap();
        assert_eq!(url.query(), Some("type=pc"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_parse_requires_scheme() {
        assert!(matches!(parse_location("example.com/a.png"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_rejects_file_scheme() {
        assert!(matches!(parse_location("file:///etc/hosts"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(parse_location("   "), Err(UrlError::Empty)));
    }
}
