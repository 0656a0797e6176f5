//! Response bodies returned by the homeserver.
//!
//! All keys are snake_case on the wire.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    api::login::LoginFlow,
    endpoints::Version,
    identifiers::{MatrixId, RoomId},
};

/// Response from `GET /_matrix/client/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionsResponse {
    /// Supported client-server API versions.
    pub versions: HashSet<Version>,
    /// Experimental features and whether they are enabled.
    #[serde(default)]
    pub unstable_features: HashMap<String, bool>,
}

/// Response from `GET /login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginFlowsResponse {
    /// The homeserver's supported login types.
    pub flows: Vec<LoginFlow>,
}

/// Base URL of a server advertised during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInformation {
    /// The server's base URL.
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Server discovery information, as returned by `.well-known/matrix/client`
/// or embedded in a login response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscoveryInformation {
    /// Homeserver the client should use from now on.
    #[serde(rename = "m.homeserver", default)]
    pub homeserver: Option<ServerInformation>,
    /// Identity server the client should use.
    #[serde(rename = "m.identity_server", default)]
    pub identity_server: Option<ServerInformation>,
}

/// Response from `POST /login`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// The fully-qualified Matrix ID that has been registered.
    pub user_id: MatrixId,
    /// Access token for subsequent authenticated requests.
    pub access_token: String,
    /// ID of the logged-in device.
    pub device_id: String,
    /// Server name of the homeserver. Deprecated in favour of `well_known`.
    #[serde(default)]
    pub home_server: Option<String>,
    /// Discovery information the client should adopt.
    #[serde(default)]
    pub well_known: Option<DiscoveryInformation>,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .field("device_id", &self.device_id)
            .field("home_server", &self.home_server)
            .field("well_known", &self.well_known)
            .finish()
    }
}

impl fmt::Display for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "user_id={}, device_id={}", self.user_id, self.device_id)
    }
}

/// Response from `GET /joined_rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinedRoomResponse {
    /// Rooms the user has joined.
    pub joined_rooms: Vec<RoomId>,
}

/// Response from `GET /account/whoami`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WhoAmIResponse {
    /// Owner of the access token.
    pub user_id: MatrixId,
    /// Device the access token belongs to, absent for application services.
    #[serde(default)]
    pub device_id: Option<String>,
}

/// An empty JSON object, returned by endpoints such as `POST /logout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EmptyResponse {}
