//! Errors surfaced by the recommendation service client.
//!
//! Player failures never produce an error value: the controller reports
//! "no information" instead, so only the Echo Nest side is typed here.

/// Result alias for Echo Nest calls.
pub type Result<T> = std::result::Result<T, EchoNestError>;

#[derive(Debug, thiserror::Error)]
pub enum EchoNestError {
    /// Transport failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope carried a non-zero status code.
    #[error("Echo Nest API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Body was not the expected JSON shape.
    #[error("Failed to decode Echo Nest response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Echo Nest response is missing `{0}`")]
    MissingField(&'static str),
}

impl EchoNestError {
    /// Worth another attempt: transport failures, rate limiting (code 3)
    /// and the service's catch-all unknown error (code -1).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { code, .. } => matches!(*code, -1 | 3),
            Self::Decode(_) | Self::MissingField(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_codes() {
        let api = |code| EchoNestError::Api { code, message: String::new() };
        assert!(api(3).is_transient());
        assert!(api(-1).is_transient());
        assert!(!api(1).is_transient());
        assert!(!api(5).is_transient());
        assert!(!EchoNestError::MissingField("songs").is_transient());
    }
}
