//! Error types for the otakudesu scraper

/// Result type alias for otakudesu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scraping otakudesu
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure before any HTTP status was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status
    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The page or response was well-formed but carried nothing usable
    ///
    /// Usually means the site changed its markup.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// An opaque id that was not produced by the codec
    #[error("Malformed id: {0}")]
    MalformedId(String),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 payload could not be decoded
    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error (from wajikconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyResult(what.into())
    }

    pub fn malformed_id(id: impl Into<String>) -> Self {
        Self::MalformedId(id.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 403 from the upstream, the signal of a stale nonce
    pub fn is_permission_denied(&self) -> bool {
        self.status() == Some(403)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_helpers() {
        let denied = Error::Status {
            status: 403,
            url: "/wp-admin/admin-ajax.php".into(),
        };
        assert_eq!(denied.status(), Some(403));
        assert!(denied.is_permission_denied());

        let missing = Error::Status {
            status: 404,
            url: "/anime/x".into(),
        };
        assert!(!missing.is_permission_denied());

        assert_eq!(Error::empty("home").status(), None);
        assert!(!Error::malformed_id("zz").is_permission_denied());
    }
}
