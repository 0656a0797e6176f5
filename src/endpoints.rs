//! Client-server API endpoint construction.
//!
//! This module maps a homeserver location, a protocol version and a logical
//! route to the fully qualified URL of that route.
//!
//! Versions of the `r0` family are served under `/_matrix/client/r0/`; any
//! other version is served under the bare `/_matrix/client/` prefix. Version
//! discovery is always `/_matrix/client/versions`.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const CLIENT_PATH: &str = "/_matrix/client/";
const R0_CLIENT_PATH: &str = "/_matrix/client/r0/";
const R0_VERSIONS: [&str; 7] = [
    "r0.0.1", "r0.1.0", "r0.2.0", "r0.3.0", "r0.4.0", "r0.5.0", "r0.6.0",
];

/// The homeserver location could not form a valid base URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// Scheme, host and port do not combine into a usable URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A client-server API version, as advertised by `/versions`.
///
/// Versions compare by their string, so `Other("r0.6.0")` equals `R0_6_0`
/// and is routed the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Version {
    /// `r0.0.1`
    R0_0_1,
    /// `r0.1.0`
    R0_1_0,
    /// `r0.2.0`
    R0_2_0,
    /// `r0.3.0`
    R0_3_0,
    /// `r0.4.0`
    R0_4_0,
    /// `r0.5.0`
    R0_5_0,
    /// `r0.6.0`
    R0_6_0,
    /// Any version outside the `r0` family, e.g. `v1.1`.
    Other(String),
}

impl Version {
    /// The version string.
    pub fn as_str(&self) -> &str {
        match self {
            Version::R0_0_1 => "r0.0.1",
            Version::R0_1_0 => "r0.1.0",
            Version::R0_2_0 => "r0.2.0",
            Version::R0_3_0 => "r0.3.0",
            Version::R0_4_0 => "r0.4.0",
            Version::R0_5_0 => "r0.5.0",
            Version::R0_6_0 => "r0.6.0",
            Version::Other(version) => version,
        }
    }

    /// Whether the version belongs to the `r0` family.
    pub fn is_r0(&self) -> bool {
        R0_VERSIONS.contains(&self.as_str())
    }

    /// Path prefix the version's routes live under.
    fn path_prefix(&self) -> &'static str {
        if self.is_r0() {
            R0_CLIENT_PATH
        } else {
            CLIENT_PATH
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::R0_6_0
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        match value {
            "r0.0.1" => Version::R0_0_1,
            "r0.1.0" => Version::R0_1_0,
            "r0.2.0" => Version::R0_2_0,
            "r0.3.0" => Version::R0_3_0,
            "r0.4.0" => Version::R0_4_0,
            "r0.5.0" => Version::R0_5_0,
            "r0.6.0" => Version::R0_6_0,
            other => Version::Other(other.to_owned()),
        }
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Version::from(value.as_str())
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.as_str().to_owned()
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Version::from(value))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical client-server routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `login`: supported login flows (GET) and password login (POST).
    Login,
    /// `logout`: invalidates the access token.
    Logout,
    /// `joined_rooms`: rooms the user has joined.
    JoinedRooms,
    /// `account/whoami`: owner of an access token.
    WhoAmI,
}

impl Route {
    /// Path of the route relative to the version prefix.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Logout => "logout",
            Route::JoinedRooms => "joined_rooms",
            Route::WhoAmI => "account/whoami",
        }
    }
}

/// Location of a homeserver and the API version to speak to it.
///
/// # Examples
///
/// ```
/// use matrix_client::endpoints::{Homeserver, Version};
///
/// let homeserver = Homeserver::new("https", "matrix.org", 443, Version::R0_6_0);
/// assert_eq!(homeserver.host, "matrix.org");
///
/// let local = Homeserver::from_url("http://localhost:8008").unwrap();
/// assert_eq!(local.port, 8008);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Homeserver {
    /// Server host name, e.g. `matrix.org`.
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// `http` or `https`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Client-server API version used to build routes.
    #[serde(default)]
    pub version: Version,
}

fn default_port() -> u16 {
    443
}

fn default_scheme() -> String {
    "https".to_owned()
}

impl Homeserver {
    /// Creates a homeserver location.
    pub fn new(scheme: &str, host: &str, port: u16, version: Version) -> Self {
        Homeserver {
            host: host.to_owned(),
            port,
            scheme: scheme.to_owned(),
            version,
        }
    }

    /// Reads scheme, host and port from a base URL such as
    /// `https://matrix.org`, using the default version.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidEndpoint`] if the URL cannot be parsed
    /// or has no host.
    pub fn from_url(base_url: &str) -> Result<Self, EndpointError> {
        let url =
            Url::parse(base_url).map_err(|e| EndpointError::InvalidEndpoint(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| EndpointError::InvalidEndpoint(format!("{base_url} has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| EndpointError::InvalidEndpoint(format!("{base_url} has no port")))?;

        Ok(Homeserver::new(url.scheme(), host, port, Version::default()))
    }
}

/// Builds route URLs for one homeserver and API version.
///
/// The base URL is validated once at construction, so route resolution
/// cannot fail afterwards.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// `scheme://host:port/`, path-less.
    base: Url,
    /// API version the routes are built for.
    version: Version,
}

impl Endpoints {
    /// Validates the homeserver location.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidEndpoint`] when the scheme is not
    /// `http`/`https`, the host is empty or carries a path, credentials,
    /// query or fragment, or the port is `0`.
    pub fn new(homeserver: &Homeserver) -> Result<Self, EndpointError> {
        let Homeserver {
            host,
            port,
            scheme,
            version,
        } = homeserver;

        if scheme != "http" && scheme != "https" {
            return Err(EndpointError::InvalidEndpoint(format!(
                "unsupported scheme {scheme:?}"
            )));
        }
        if host.is_empty() {
            return Err(EndpointError::InvalidEndpoint("empty host".to_owned()));
        }
        if *port == 0 {
            return Err(EndpointError::InvalidEndpoint("port 0".to_owned()));
        }

        let raw = format!("{scheme}://{host}:{port}/");
        let base = Url::parse(&raw).map_err(|e| EndpointError::InvalidEndpoint(format!("{raw}: {e}")))?;

        if base.path() != "/"
            || base.query().is_some()
            || base.fragment().is_some()
            || !base.username().is_empty()
            || base.password().is_some()
            || base.port_or_known_default() != Some(*port)
        {
            return Err(EndpointError::InvalidEndpoint(format!(
                "{host:?} is not a bare host name"
            )));
        }

        Ok(Endpoints {
            base,
            version: version.clone(),
        })
    }

    /// `scheme://host:port/` of the homeserver.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The API version routes are built for.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// URL of the version discovery endpoint, independent of the configured
    /// version.
    pub fn versions(&self) -> Url {
        self.with_path(&format!("{CLIENT_PATH}versions"))
    }

    /// URL of a logical route under the configured version's prefix.
    pub fn route(&self, route: Route) -> Url {
        self.with_path(&format!("{}{}", self.version.path_prefix(), route.path()))
    }

    fn with_path(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}
