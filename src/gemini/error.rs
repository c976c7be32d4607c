//! Errors from the Gemini text-generation API.

use thiserror::Error;

/// Errors that can occur while calling the generation service.
///
/// - [`RateLimited`](GeminiError::RateLimited): HTTP 429
/// - [`ApiError`](GeminiError::ApiError): any other non-success status
/// - [`EmptyResponse`](GeminiError::EmptyResponse): 200 with no usable text
/// - [`NetworkError`](GeminiError::NetworkError): transport failure
#[derive(Debug, Error)]
pub enum GeminiError {
    /// `retry_after_ms` comes from the `retry-after` header when present.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Typically a safety block or an empty candidate list.
    #[error("response contained no text")]
    EmptyResponse,

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = GeminiError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
    }

    #[test]
    fn api_error_display() {
        let err = GeminiError::ApiError {
            status: 403,
            message: "API key not valid".into(),
        };
        assert_eq!(err.to_string(), "API error (status 403): API key not valid");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiError>();
    }
}
