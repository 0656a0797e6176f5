//! Login flows advertised by a homeserver.

use std::fmt;

use serde::{Deserialize, Serialize};

const PASSWORD: &str = "m.login.password";

/// A login type. Types this client does not implement are kept verbatim so
/// they survive a decode/encode round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoginType {
    /// `m.login.password`
    Password,
    /// Any other login type, e.g. `m.login.sso`.
    Unknown(String),
}

impl LoginType {
    /// The wire value of the login type.
    pub fn as_str(&self) -> &str {
        match self {
            LoginType::Password => PASSWORD,
            LoginType::Unknown(id) => id,
        }
    }
}

impl From<String> for LoginType {
    fn from(value: String) -> Self {
        match value.as_str() {
            PASSWORD => LoginType::Password,
            _ => LoginType::Unknown(value),
        }
    }
}

impl From<LoginType> for String {
    fn from(login_type: LoginType) -> Self {
        match login_type {
            LoginType::Password => PASSWORD.to_owned(),
            LoginType::Unknown(id) => id,
        }
    }
}

impl fmt::Display for LoginType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A login flow supported by the homeserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFlow {
    /// The login type, supplied as `type` when logging in.
    #[serde(rename = "type")]
    pub login_type: LoginType,
}

impl fmt::Display for LoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "type={}", self.login_type)
    }
}
