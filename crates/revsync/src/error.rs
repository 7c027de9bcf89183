use thiserror::Error;

/// Errors surfaced by a review synchronization run.
///
/// Every variant is fatal to the run that produced it. No partial result
/// accompanies an error, so a caller holding a previous watermark should
/// keep it unchanged.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote endpoint answered with a failure status.
    #[error("{description} (HTTP {status_code}): {body}")]
    Protocol {
        description: String,
        status_code: u16,
        body: String,
    },

    /// A success response lacked a field the sync relies on.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Network or connection error before a response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SyncError {
    /// Create a protocol error.
    #[inline]
    pub fn protocol(
        description: impl Into<String>,
        status_code: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Protocol {
            description: description.into(),
            status_code,
            body: body.into(),
        }
    }

    /// Create a malformed-response error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status of a protocol error.
    #[inline]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Check if the remote endpoint reported a failure status.
    #[inline]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message; protocol bodies are often
/// multi-line JSON or HTML.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_exposes_status_and_body() {
        let err = SyncError::protocol("cannot fetch reviews", 500, "{\"error\":\"boom\"}");
        assert!(err.is_protocol());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(
            err.to_string(),
            "cannot fetch reviews (HTTP 500): {\"error\":\"boom\"}"
        );
    }

    #[test]
    fn other_variants_have_no_status() {
        assert_eq!(SyncError::malformed("paging.total").status_code(), None);
        assert!(!SyncError::network("reset").is_protocol());
    }

    #[test]
    fn short_error_message_keeps_first_line() {
        let err = SyncError::protocol("bad gateway", 502, "<html>\n<body>oops</body>\n</html>");
        assert_eq!(short_error_message(&err), "bad gateway (HTTP 502): <html>");
    }
}
