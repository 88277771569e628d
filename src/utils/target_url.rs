//! Validation and normalization of link targets.

use url::Url;

/// Errors that can occur while validating a target address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Validates a target address and returns its canonical form.
///
/// Only `http` and `https` are accepted, which keeps `javascript:` and
/// `data:` targets out of redirects. The host is lowercased by the parser
/// and the fragment is dropped; path and query are kept as given.
pub fn normalize_target(input: &str) -> Result<String, TargetUrlError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(TargetUrlError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TargetUrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url.to_string())
}
