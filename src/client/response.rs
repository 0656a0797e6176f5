//! Validation and decoding of raw responses.
//!
//! Checks run in order: transport outcome, status line, declared payload
//! length, presence of a body, then decoding. Non-success statuses are
//! decoded as the standard error envelope. A success body carrying an
//! `errcode` key is an error envelope too, for homeservers that report errors
//! with a `200`; any other success body is decoded as the expected type.

use log::debug;
use reqwest::{
    StatusCode,
    header::{CONTENT_LENGTH, HeaderMap},
};
use serde::{
    Deserialize,
    de::{DeserializeOwned, IgnoredAny},
};

use crate::{
    api::ErrorResponse,
    client::{
        error::{ApiError, ClientError},
        transport::{RawResponse, TransportError},
    },
};

/// Turns the outcome of an exchange into the expected response type or a
/// typed failure.
pub(crate) fn decode_response<T>(
    outcome: Result<Option<RawResponse>, TransportError>,
) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let response = outcome?.ok_or(ClientError::NoResponse)?;

    let status = StatusCode::from_u16(response.status).map_err(|_| {
        ClientError::CorruptedResponse(format!("invalid status code {}", response.status))
    })?;
    let body = response.body.unwrap_or_default();

    if let Some(expected) = declared_length(&response.headers)? {
        let actual = body.len() as u64;
        if expected != actual {
            return Err(ClientError::PayloadSizeMismatch { expected, actual });
        }
    }

    debug!("response status {} with {} bytes", status, body.len());

    if body.is_empty() {
        return Err(if status.is_success() {
            ClientError::NoData
        } else {
            ClientError::UnexpectedStatus {
                status,
                body: String::new(),
            }
        });
    }

    if !status.is_success() {
        return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
            Ok(response) => ClientError::Api(ApiError { status, response }),
            Err(_) => ClientError::UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            },
        });
    }

    if carries_errcode(&body) {
        return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
            Ok(response) => ClientError::Api(ApiError { status, response }),
            Err(e) => ClientError::SchemaMismatch(e),
        });
    }

    serde_json::from_slice::<T>(&body).map_err(ClientError::SchemaMismatch)
}

/// Top-level `errcode` key of a JSON object.
#[derive(Deserialize)]
struct ErrcodeField {
    #[serde(default)]
    errcode: Option<IgnoredAny>,
}

/// Whether `body` is a JSON object with an `errcode` key.
fn carries_errcode(body: &[u8]) -> bool {
    serde_json::from_slice::<ErrcodeField>(body).is_ok_and(|field| field.errcode.is_some())
}

/// Reads `Content-Length`, if any.
fn declared_length(headers: &HeaderMap) -> Result<Option<u64>, ClientError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|length| length.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| ClientError::CorruptedResponse(format!("invalid content-length {value:?}")))
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;
    use crate::api::{EmptyResponse, ErrorCode, LoginFlowsResponse};

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: HeaderMap::new(),
            body: (!body.is_empty()).then(|| body.as_bytes().to_vec()),
        }
    }

    fn with_content_length(mut response: RawResponse, length: &'static str) -> RawResponse {
        response
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from_static(length));
        response
    }

    #[test]
    fn test_success() {
        let body = r#"{"flows": [{"type": "m.login.password"}]}"#;
        let decoded: LoginFlowsResponse = decode_response(Ok(Some(response(200, body)))).unwrap();
        assert_eq!(decoded.flows.len(), 1);
    }

    #[test]
    fn test_transport_error_is_propagated() {
        let outcome = Err(TransportError::Other("connection reset".to_owned()));
        let err = decode_response::<LoginFlowsResponse>(outcome).unwrap_err();

        let ClientError::Transport(TransportError::Other(message)) = err else {
            panic!("expected a transport error, got {err:?}");
        };
        assert_eq!(message, "connection reset");
    }

    #[test]
    fn test_no_response() {
        let err = decode_response::<LoginFlowsResponse>(Ok(None)).unwrap_err();
        assert!(matches!(err, ClientError::NoResponse));
    }

    #[test]
    fn test_invalid_status_is_corrupted() {
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(42, "{}")))).unwrap_err();
        assert!(matches!(err, ClientError::CorruptedResponse(_)));
    }

    #[test]
    fn test_invalid_content_length_is_corrupted() {
        let raw = with_content_length(response(200, "{}"), "many");
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(raw))).unwrap_err();
        assert!(matches!(err, ClientError::CorruptedResponse(_)));
    }

    #[test]
    fn test_payload_size_mismatch() {
        let raw = with_content_length(response(200, r#"{"flows": []}"#), "100");
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(raw))).unwrap_err();
        assert!(matches!(
            err,
            ClientError::PayloadSizeMismatch {
                expected: 100,
                actual: 13
            }
        ));
    }

    #[test]
    fn test_matching_content_length() {
        let raw = with_content_length(response(200, r#"{"flows": []}"#), "13");
        let decoded: LoginFlowsResponse = decode_response(Ok(Some(raw))).unwrap();
        assert!(decoded.flows.is_empty());
    }

    #[test]
    fn test_no_data() {
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(200, "")))).unwrap_err();
        assert!(matches!(err, ClientError::NoData));
    }

    #[test]
    fn test_error_status_without_body() {
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(502, "")))).unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedStatus { status: StatusCode::BAD_GATEWAY, .. }
        ));
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"errcode": "M_FORBIDDEN", "error": "Invalid password"}"#;
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(403, body)))).unwrap_err();

        let ClientError::Api(api_error) = err else {
            panic!("expected an api error, got {err:?}");
        };
        assert_eq!(api_error.status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.response.code, ErrorCode::Forbidden);
        assert_eq!(api_error.response.error, "Invalid password");
    }

    #[test]
    fn test_error_status_with_garbage_body() {
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(500, "<html>oops</html>"))))
            .unwrap_err();

        let ClientError::UnexpectedStatus { status, body } = err else {
            panic!("expected an unexpected status, got {err:?}");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "<html>oops</html>");
    }

    #[test]
    fn test_error_envelope_with_success_status() {
        let body = r#"{"errcode": "M_UNKNOWN", "error": "Something went wrong"}"#;
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(200, body)))).unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));
    }

    #[test]
    fn test_error_envelope_is_not_an_empty_success() {
        let body = r#"{"errcode": "M_UNKNOWN_TOKEN", "error": "bad"}"#;
        let err = decode_response::<EmptyResponse>(Ok(Some(response(200, body)))).unwrap_err();

        let ClientError::Api(api_error) = err else {
            panic!("expected an api error, got {err:?}");
        };
        assert_eq!(api_error.response.code, ErrorCode::UnknownToken);
    }

    #[test]
    fn test_empty_success() {
        let decoded: EmptyResponse = decode_response(Ok(Some(response(200, "{}")))).unwrap();
        assert_eq!(decoded, EmptyResponse {});
    }

    #[test]
    fn test_malformed_errcode_with_success_status() {
        let body = r#"{"errcode": "NOSEPARATOR", "error": "?"}"#;
        let err = decode_response::<EmptyResponse>(Ok(Some(response(200, body)))).unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch(_)));
    }

    #[test]
    fn test_schema_mismatch() {
        let err = decode_response::<LoginFlowsResponse>(Ok(Some(response(200, r#"{"flow": 1}"#))))
            .unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch(_)));
    }
}
