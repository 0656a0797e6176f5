//! The standard error envelope.
//!
//! Every error at the Matrix API level is reported as
//! `{"errcode": "<NAMESPACE>_<CODE>", "error": "<message>"}`. The namespace is
//! the text before the first `_` (`M` for codes defined by the protocol,
//! e.g. `COM.EXAMPLE` for a vendor). Codes are matched with the namespace
//! replaced by `M`, and codes this client does not know map to
//! [`ErrorCode::Unknown`] instead of failing to decode.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// Known error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `M_FORBIDDEN`: forbidden access, e.g. joining a room without permission, failed login.
    Forbidden,
    /// `M_UNKNOWN_TOKEN`: the access token was not recognised.
    UnknownToken,
    /// `M_MISSING_TOKEN`: no access token was specified.
    MissingToken,
    /// `M_BAD_JSON`: valid JSON, but malformed, e.g. missing required keys.
    BadJson,
    /// `M_NOT_JSON`: the request did not contain valid JSON.
    NotJson,
    /// `M_NOT_FOUND`: no resource was found for this request.
    NotFound,
    /// `M_LIMIT_EXCEEDED`: too many requests in a short period of time.
    LimitExceeded,
    /// `M_UNKNOWN`, or any code this client does not recognise.
    Unknown,
    /// `M_UNRECOGNIZED`: the server did not understand the request.
    Unrecognized,
    /// `M_UNAUTHORIZED`: the request was not correctly authorized.
    Unauthorized,
    /// `M_USER_DEACTIVATED`: the user ID has been deactivated.
    UserDeactivated,
    /// `M_USER_IN_USE`: the user ID is already taken.
    UserInUse,
    /// `M_INVALID_USERNAME`: the user ID is not valid.
    InvalidUsername,
    /// `M_ROOM_IN_USE`: the room alias is already in use.
    RoomInUse,
    /// `M_INVALID_ROOM_STATE`: the initial room state is invalid.
    InvalidRoomState,
    /// `M_THREEPID_IN_USE`: the third-party identifier is already in use.
    ThreepidInUse,
    /// `M_THREEPID_NOT_FOUND`: no record matches the third-party identifier.
    ThreepidNotFound,
    /// `M_THREEPID_AUTH_FAILED`: authentication on the third-party identifier failed.
    ThreepidAuthFailed,
    /// `M_THREEPID_DENIED`: the server does not permit this third-party identifier.
    ThreepidDenied,
    /// `M_SERVER_NOT_TRUSTED`: the request used an untrusted third-party server.
    ServerNotTrusted,
    /// `M_UNSUPPORTED_ROOM_VERSION`: the room version is not supported.
    UnsupportedRoomVersion,
    /// `M_INCOMPATIBLE_ROOM_VERSION`: the room to join has an unsupported version.
    IncompatibleRoomVersion,
    /// `M_BAD_STATE`: the requested state change cannot be performed.
    BadState,
    /// `M_GUEST_ACCESS_FORBIDDEN`: guests may not access the resource.
    GuestAccessForbidden,
    /// `M_CAPTCHA_NEEDED`: a captcha is required.
    CaptchaNeeded,
    /// `M_CAPTCHA_INVALID`: the captcha did not match.
    CaptchaInvalid,
    /// `M_MISSING_PARAM`: a required parameter was missing.
    MissingParam,
    /// `M_INVALID_PARAM`: a parameter has the wrong value.
    InvalidParam,
    /// `M_TOO_LARGE`: the request or entity was too large.
    TooLarge,
    /// `M_EXCLUSIVE`: the resource is reserved by an application service.
    Exclusive,
    /// `M_RESOURCE_LIMIT_EXCEEDED`: the homeserver reached a resource limit.
    ResourceLimitExceeded,
    /// `M_CANNOT_LEAVE_SERVER_NOTICE_ROOM`: the server notices room cannot be left.
    CannotLeaveServerNoticeRoom,
}

impl ErrorCode {
    /// The `M_*` form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Forbidden => "M_FORBIDDEN",
            ErrorCode::UnknownToken => "M_UNKNOWN_TOKEN",
            ErrorCode::MissingToken => "M_MISSING_TOKEN",
            ErrorCode::BadJson => "M_BAD_JSON",
            ErrorCode::NotJson => "M_NOT_JSON",
            ErrorCode::NotFound => "M_NOT_FOUND",
            ErrorCode::LimitExceeded => "M_LIMIT_EXCEEDED",
            ErrorCode::Unknown => "M_UNKNOWN",
            ErrorCode::Unrecognized => "M_UNRECOGNIZED",
            ErrorCode::Unauthorized => "M_UNAUTHORIZED",
            ErrorCode::UserDeactivated => "M_USER_DEACTIVATED",
            ErrorCode::UserInUse => "M_USER_IN_USE",
            ErrorCode::InvalidUsername => "M_INVALID_USERNAME",
            ErrorCode::RoomInUse => "M_ROOM_IN_USE",
            ErrorCode::InvalidRoomState => "M_INVALID_ROOM_STATE",
            ErrorCode::ThreepidInUse => "M_THREEPID_IN_USE",
            ErrorCode::ThreepidNotFound => "M_THREEPID_NOT_FOUND",
            ErrorCode::ThreepidAuthFailed => "M_THREEPID_AUTH_FAILED",
            ErrorCode::ThreepidDenied => "M_THREEPID_DENIED",
            ErrorCode::ServerNotTrusted => "M_SERVER_NOT_TRUSTED",
            ErrorCode::UnsupportedRoomVersion => "M_UNSUPPORTED_ROOM_VERSION",
            ErrorCode::IncompatibleRoomVersion => "M_INCOMPATIBLE_ROOM_VERSION",
            ErrorCode::BadState => "M_BAD_STATE",
            ErrorCode::GuestAccessForbidden => "M_GUEST_ACCESS_FORBIDDEN",
            ErrorCode::CaptchaNeeded => "M_CAPTCHA_NEEDED",
            ErrorCode::CaptchaInvalid => "M_CAPTCHA_INVALID",
            ErrorCode::MissingParam => "M_MISSING_PARAM",
            ErrorCode::InvalidParam => "M_INVALID_PARAM",
            ErrorCode::TooLarge => "M_TOO_LARGE",
            ErrorCode::Exclusive => "M_EXCLUSIVE",
            ErrorCode::ResourceLimitExceeded => "M_RESOURCE_LIMIT_EXCEEDED",
            ErrorCode::CannotLeaveServerNoticeRoom => "M_CANNOT_LEAVE_SERVER_NOTICE_ROOM",
        }
    }

    /// Matches an `M_*` code, falling back to [`ErrorCode::Unknown`].
    pub fn from_m_code(code: &str) -> Self {
        match code {
            "M_FORBIDDEN" => ErrorCode::Forbidden,
            "M_UNKNOWN_TOKEN" => ErrorCode::UnknownToken,
            "M_MISSING_TOKEN" => ErrorCode::MissingToken,
            "M_BAD_JSON" => ErrorCode::BadJson,
            "M_NOT_JSON" => ErrorCode::NotJson,
            "M_NOT_FOUND" => ErrorCode::NotFound,
            "M_LIMIT_EXCEEDED" => ErrorCode::LimitExceeded,
            "M_UNRECOGNIZED" => ErrorCode::Unrecognized,
            "M_UNAUTHORIZED" => ErrorCode::Unauthorized,
            "M_USER_DEACTIVATED" => ErrorCode::UserDeactivated,
            "M_USER_IN_USE" => ErrorCode::UserInUse,
            "M_INVALID_USERNAME" => ErrorCode::InvalidUsername,
            "M_ROOM_IN_USE" => ErrorCode::RoomInUse,
            "M_INVALID_ROOM_STATE" => ErrorCode::InvalidRoomState,
            "M_THREEPID_IN_USE" => ErrorCode::ThreepidInUse,
            "M_THREEPID_NOT_FOUND" => ErrorCode::ThreepidNotFound,
            "M_THREEPID_AUTH_FAILED" => ErrorCode::ThreepidAuthFailed,
            "M_THREEPID_DENIED" => ErrorCode::ThreepidDenied,
            "M_SERVER_NOT_TRUSTED" => ErrorCode::ServerNotTrusted,
            "M_UNSUPPORTED_ROOM_VERSION" => ErrorCode::UnsupportedRoomVersion,
            "M_INCOMPATIBLE_ROOM_VERSION" => ErrorCode::IncompatibleRoomVersion,
            "M_BAD_STATE" => ErrorCode::BadState,
            "M_GUEST_ACCESS_FORBIDDEN" => ErrorCode::GuestAccessForbidden,
            "M_CAPTCHA_NEEDED" => ErrorCode::CaptchaNeeded,
            "M_CAPTCHA_INVALID" => ErrorCode::CaptchaInvalid,
            "M_MISSING_PARAM" => ErrorCode::MissingParam,
            "M_INVALID_PARAM" => ErrorCode::InvalidParam,
            "M_TOO_LARGE" => ErrorCode::TooLarge,
            "M_EXCLUSIVE" => ErrorCode::Exclusive,
            "M_RESOURCE_LIMIT_EXCEEDED" => ErrorCode::ResourceLimitExceeded,
            "M_CANNOT_LEAVE_SERVER_NOTICE_ROOM" => ErrorCode::CannotLeaveServerNoticeRoom,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded standard error response.
///
/// # Examples
///
/// ```
/// use matrix_client::api::{ErrorCode, ErrorResponse};
///
/// let error: ErrorResponse =
///     serde_json::from_str(r#"{"errcode": "M_NOT_FOUND", "error": "not found"}"#).unwrap();
/// assert_eq!(error.domain, "M");
/// assert_eq!(error.code, ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Namespace of the code, the text before the first `_`.
    #[serde(skip)]
    pub domain: String,
    /// The code with its namespace replaced by `M`.
    #[serde(skip)]
    pub code: ErrorCode,
    /// The `errcode` exactly as received.
    pub errcode: String,
    /// Human-readable error message.
    pub error: String,
    /// Milliseconds to wait before retrying, sent with `M_LIMIT_EXCEEDED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// Wire shape of the envelope.
#[derive(Deserialize)]
struct RawErrorResponse {
    errcode: String,
    error: String,
    #[serde(default)]
    retry_after_ms: Option<u64>,
}

impl<'de> Deserialize<'de> for ErrorResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let RawErrorResponse {
            errcode,
            error,
            retry_after_ms,
        } = RawErrorResponse::deserialize(deserializer)?;

        let Some((domain, code)) = errcode.split_once('_') else {
            return Err(D::Error::custom(format!(
                "no separator \"_\" found in {errcode}"
            )));
        };
        let domain = domain.to_owned();
        let code = ErrorCode::from_m_code(&format!("M_{code}"));

        Ok(ErrorResponse {
            domain,
            code,
            errcode,
            error,
            retry_after_ms,
        })
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.errcode, self.error)
    }
}
