//! Error types for the test-server bridge.
//!
//! The bridge keeps three failure categories strictly apart so that test
//! code can tell "the call never completed" from "the server rejected the
//! call" from "the call succeeded but the response was unreadable".

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // Transport errors: the HTTP round trip itself failed.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // The server executed (or refused) the method and answered non-200.
    // The message is the response body verbatim; tests assert on its
    // substrings, so it is never rewritten.
    #[error("Method invocation failed ({status}): {message}")]
    MethodInvocation { status: u16, message: String },

    // The server answered 200 but the body did not decode.
    #[error("Failed to decode wire token {token:?}: {message}")]
    Decoding { token: String, message: String },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // A decoded value had the wrong shape for the caller's expectation.
    #[error("Unexpected value: expected {expected}, got {actual}")]
    UnexpectedValue {
        expected: &'static str,
        actual: String,
    },

    // Configuration errors
    #[error("Invalid base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BridgeError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            BridgeError::Transport {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl BridgeError {
    /// Create a decoding error carrying the offending raw token.
    pub fn decoding(token: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Decoding {
            token: token.into(),
            message: message.into(),
        }
    }

    /// HTTP status code of a method-invocation failure, if that is what
    /// this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::MethodInvocation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for server-side rejections (non-200 responses).
    pub fn is_invocation(&self) -> bool {
        matches!(self, BridgeError::MethodInvocation { .. })
    }

    /// True when the response arrived but could not be interpreted.
    pub fn is_decoding(&self) -> bool {
        matches!(self, BridgeError::Decoding { .. } | BridgeError::Json { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error_exposes_status() {
        let err = BridgeError::MethodInvocation {
            status: 400,
            message: "a documentID parameter is null".to_string(),
        };
        assert_eq!(err.status(), Some(400));
        assert!(err.is_invocation());
        assert!(!err.is_decoding());
        assert!(err.to_string().contains("a documentID parameter is null"));
    }

    #[test]
    fn test_decoding_error_carries_token() {
        let err = BridgeError::decoding("\"unterminated", "missing closing quote");
        assert!(err.is_decoding());
        assert!(!err.is_invocation());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("\"unterminated"));
    }
}
