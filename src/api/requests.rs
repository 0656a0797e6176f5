//! Request bodies sent to the homeserver.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{api::login::LoginType, identifiers::Identifier};

/// The fixed `type` of a password login. Decoding any other value fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PasswordLogin;

impl Serialize for PasswordLogin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(LoginType::Password.as_str())
    }
}

impl<'de> Deserialize<'de> for PasswordLogin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match LoginType::deserialize(deserializer)? {
            LoginType::Password => Ok(PasswordLogin),
            other => Err(D::Error::custom(format!(
                "type value equal to {other}, expecting {}",
                LoginType::Password
            ))),
        }
    }
}

/// `POST /login` body authenticating with a password.
///
/// ```text
/// {
///   "type": "m.login.password",
///   "identifier": { "type": "m.id.user", "user": "@alice:matrix.org" },
///   "password": "...",
///   "device_id": "GHTYAJCE",
///   "initial_device_display_name": "Jungle Phone"
/// }
/// ```
///
/// # Examples
///
/// ```
/// use matrix_client::{api::LoginPasswordRequest, identifiers::Identifier};
///
/// let request = LoginPasswordRequest::new(
///     Identifier::user("@alice:matrix.org".parse().unwrap()),
///     "secret",
///     "laptop",
/// )
/// .with_device_id("GHTYAJCE");
/// assert_eq!(request.device_id.as_deref(), Some("GHTYAJCE"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPasswordRequest {
    #[serde(rename = "type")]
    login_type: PasswordLogin,
    /// Who is logging in.
    pub identifier: Identifier,
    /// The account password.
    pub password: String,
    /// Device to reuse; the homeserver generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Display name of a newly created device.
    pub initial_device_display_name: String,
}

impl LoginPasswordRequest {
    /// Creates a password login for a new device named `device_name`.
    pub fn new(identifier: Identifier, password: &str, device_name: &str) -> Self {
        LoginPasswordRequest {
            login_type: PasswordLogin,
            identifier,
            password: password.to_owned(),
            device_id: None,
            initial_device_display_name: device_name.to_owned(),
        }
    }

    /// Reuses an existing device instead of creating a new one.
    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.device_id = Some(device_id.to_owned());
        self
    }

    /// Always [`LoginType::Password`].
    pub fn login_type(&self) -> LoginType {
        LoginType::Password
    }
}

impl fmt::Debug for LoginPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoginPasswordRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .field("device_id", &self.device_id)
            .field(
                "initial_device_display_name",
                &self.initial_device_display_name,
            )
            .finish()
    }
}
