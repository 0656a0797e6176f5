//! Errors surfaced by client operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    api::{ErrorCode, ErrorResponse},
    client::transport::TransportError,
};

/// A standard error response together with the status it arrived with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{response} (HTTP {status})")]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// The decoded error envelope.
    pub response: ErrorResponse,
}

impl ApiError {
    /// The error code, falling back to the HTTP status when the homeserver
    /// sent a code this client does not recognise (or `M_UNKNOWN`).
    ///
    /// # Examples
    ///
    /// ```
    /// use matrix_client::{api::{ErrorCode, ErrorResponse}, client::ApiError};
    /// use reqwest::StatusCode;
    ///
    /// let response: ErrorResponse =
    ///     serde_json::from_str(r#"{"errcode": "M_UNKNOWN", "error": "?"}"#).unwrap();
    /// let error = ApiError { status: StatusCode::NOT_FOUND, response };
    /// assert_eq!(error.effective_code(), ErrorCode::NotFound);
    /// ```
    pub fn effective_code(&self) -> ErrorCode {
        if self.response.code != ErrorCode::Unknown {
            return self.response.code;
        }

        match self.status {
            StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
            StatusCode::FORBIDDEN => ErrorCode::Forbidden,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::PAYLOAD_TOO_LARGE => ErrorCode::TooLarge,
            StatusCode::TOO_MANY_REQUESTS => ErrorCode::LimitExceeded,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Why a client operation failed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange failed, e.g. network failure or timeout.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The exchange completed without any response.
    #[error("no response received")]
    NoResponse,

    /// The response is not a well-formed HTTP response.
    #[error("corrupted response: {0}")]
    CorruptedResponse(String),

    /// The body length differs from the declared `Content-Length`.
    #[error("payload size mismatch: expected {expected} bytes, received {actual}")]
    PayloadSizeMismatch {
        /// Declared length.
        expected: u64,
        /// Received length.
        actual: u64,
    },

    /// A successful response carried no body.
    #[error("response has no data")]
    NoData,

    /// The homeserver answered with a standard error response.
    #[error("homeserver error: {0}")]
    Api(#[from] ApiError),

    /// A non-success status without a decodable error envelope.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status of the response.
        status: StatusCode,
        /// Body as text, possibly empty.
        body: String,
    },

    /// The body does not match the expected response type.
    #[error("response does not match the expected schema: {0}")]
    SchemaMismatch(#[source] serde_json::Error),

    /// The request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request was cancelled through its handle.
    #[error("request cancelled")]
    Cancelled,

    /// The task running the request panicked.
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: StatusCode, errcode: &str) -> ApiError {
        let json = format!(r#"{{"errcode": "{errcode}", "error": "message"}}"#);
        ApiError {
            status,
            response: serde_json::from_str(&json).unwrap(),
        }
    }

    #[test]
    fn test_effective_code_prefers_known_code() {
        let error = api_error(StatusCode::BAD_REQUEST, "M_NOT_FOUND");
        assert_eq!(error.effective_code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_effective_code_falls_back_to_status() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::TooLarge),
            (StatusCode::TOO_MANY_REQUESTS, ErrorCode::LimitExceeded),
            (StatusCode::BAD_REQUEST, ErrorCode::Unknown),
        ];

        for (status, expected) in cases {
            assert_eq!(
                api_error(status, "M_SOME_UNDEFINED_CODE").effective_code(),
                expected
            );
            assert_eq!(api_error(status, "M_UNKNOWN").effective_code(), expected);
        }
    }

    #[test]
    fn test_api_error_display() {
        let error = api_error(StatusCode::FORBIDDEN, "M_FORBIDDEN");
        assert_eq!(error.to_string(), "M_FORBIDDEN: message (HTTP 403 Forbidden)");
    }

    #[test]
    fn test_payload_size_mismatch_display() {
        let error = ClientError::PayloadSizeMismatch {
            expected: 10,
            actual: 4,
        };
        assert_eq!(
            error.to_string(),
            "payload size mismatch: expected 10 bytes, received 4"
        );
    }
}
