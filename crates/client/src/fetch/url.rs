//! Request URL resolution for host-supplied request targets.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request target the way a page would.
///
/// Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Absolute URLs (with `scheme:`) parse as-is, whatever the scheme;
///    the router decides what to do with non-network schemes
/// 3. Anything else resolves relative to `origin`
/// 4. Hosts are lowercased by the URL parser; query and fragment are kept
pub fn resolve(input: &str, origin: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    match Url::parse(trimmed) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))
        }
        Err(e) => Err(UrlError::InvalidUrl(e.to_string())),
    }
}
