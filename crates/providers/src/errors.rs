//! Error types for the upstream source clients.

use thiserror::Error;

/// Errors that can occur while fetching from an upstream source.
///
/// The fatal/absorbed split is decided by the caller: the exchange-rate
/// pipeline treats every variant as fatal, the base-rate pipeline records
/// them and carries on.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The upstream answered with a non-2xx status.
    #[error("Upstream unavailable: {provider} returned HTTP {status}")]
    Unavailable {
        /// The source that returned the status
        provider: String,
        /// HTTP status code of the failed response
        status: u16,
    },

    /// The body did not have the documented shape.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The source that returned the body
        provider: String,
        /// Description of the shape mismatch
        message: String,
    },

    /// The upstream returned a well-formed body carrying an explicit
    /// error result code.
    #[error("Upstream error from {provider}: {message}")]
    UpstreamLogical {
        /// The source that reported the error
        provider: String,
        /// Code-specific message derived from the response
        message: String,
    },

    /// A transport-level error occurred before any response was read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SourceError::Unavailable {
            provider: "KOREA_EXIM".to_string(),
            status: 503,
        };
        assert_eq!(
            format!("{}", error),
            "Upstream unavailable: KOREA_EXIM returned HTTP 503"
        );

        let error = SourceError::UpstreamLogical {
            provider: "ECOS".to_string(),
            message: "정보-100 인증키가 유효하지 않습니다".to_string(),
        };
        assert!(format!("{}", error).starts_with("Upstream error from ECOS"));
    }
}
