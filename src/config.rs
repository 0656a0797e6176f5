//! Configuration file structures for the matrix-client binary.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables. It is split into two sections: the homeserver to
//! talk to and, optionally, the account used by the `login` command.
//!
//! # Configuration File Format
//!
//! ```yaml
//! homeserver:
//!   # Host name of the homeserver
//!   host: "matrix.org"
//!   # Optional, defaults to 443
//!   port: 443
//!   # Optional, defaults to https
//!   scheme: "https"
//!   # Optional, defaults to r0.6.0
//!   version: "r0.6.0"
//!
//! account:
//!   user_id: "@alice:matrix.org"
//!   password: "secret-password"
//!   # Optional, defaults to matrix-client
//!   device_name: "laptop"
//!   # Optional, reuse an existing device
//!   device_id: "ABCDEFGH"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any value can be overridden with the `MATRIX_CLIENT_` prefix, nested keys
//! being separated by `__`:
//!
//! ```bash
//! export MATRIX_CLIENT_HOMESERVER__HOST="localhost"
//! export MATRIX_CLIENT_HOMESERVER__PORT=8008
//! export MATRIX_CLIENT_ACCOUNT__PASSWORD="secret-from-env"
//! ```

use std::{fmt, path::Path};

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use matrix_client::{endpoints::Homeserver, identifiers::MatrixId};
use serde::Deserialize;

/// Prefix of the environment variables overriding the file.
const ENV_PREFIX: &str = "MATRIX_CLIENT_";

/// Root configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Homeserver location and API version
    pub homeserver: Homeserver,
    /// Account used to log in, if any
    pub account: Option<Account>,
}

/// Matrix account credentials.
///
/// # YAML Section
///
/// ```yaml
/// account:
///   user_id: "@alice:matrix.org"
///   password: "your-password"
/// ```
#[derive(Deserialize)]
pub struct Account {
    /// Fully qualified Matrix ID, e.g. `@alice:matrix.org`.
    pub user_id: MatrixId,

    /// Account password. Never logged.
    pub password: String,

    /// Display name given to the device created at login.
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Existing device to log in with instead of creating a new one.
    #[serde(default)]
    pub device_id: Option<String>,
}

fn default_device_name() -> String {
    "matrix-client".to_owned()
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Account")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .field("device_name", &self.device_name)
            .field("device_id", &self.device_id)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from the YAML file at `path`, then applies
    /// `MATRIX_CLIENT_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist, is not valid YAML, or the merged
    /// values do not form a valid configuration (e.g. a malformed
    /// `user_id`).
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        if !path.is_file() {
            bail!("configuration file {} not found", path.display());
        }

        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}
