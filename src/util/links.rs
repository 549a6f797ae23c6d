use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpenUrlError {
    #[error("Story has no URL")]
    Missing,
    #[error("Invalid URL: {0}")]
    Invalid(String),
    #[error("Refusing to open {0}:// URL (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// SEC: Check a story URL before handing it to `open::that()`.
///
/// Only http(s) URLs are passed to the system opener; anything else
/// (`file://`, `javascript:`, custom handlers) could launch arbitrary programs.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, OpenUrlError> {
    if url_str.trim().is_empty() {
        return Err(OpenUrlError::Missing);
    }

    let url = Url::parse(url_str).map_err(|e| OpenUrlError::Invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(OpenUrlError::UnsupportedScheme(scheme.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_urls_accepted() {
        assert!(validate_url_for_open("https://news.ycombinator.com/item?id=1").is_ok());
        assert!(validate_url_for_open("http://example.com").is_ok());
    }

    #[test]
    fn test_empty_url_is_missing() {
        assert_eq!(validate_url_for_open(""), Err(OpenUrlError::Missing));
        assert_eq!(validate_url_for_open("   "), Err(OpenUrlError::Missing));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            validate_url_for_open("file:///etc/passwd"),
            Err(OpenUrlError::UnsupportedScheme(s)) if s == "file"
        ));
        assert!(matches!(
            validate_url_for_open("javascript:alert(1)"),
            Err(OpenUrlError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_url_for_open("not a url"),
            Err(OpenUrlError::Invalid(_))
        ));
    }
}
