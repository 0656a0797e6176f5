//! User and room identifiers.
//!
//! Both identifiers share the same grammar: a one-character sigil, a local
//! name, a `:` and the server name. They travel over the wire as plain JSON
//! strings in that canonical form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::identifiers::IdentifierError;

const USER_SIGIL: char = '@';
const ROOM_SIGIL: char = '!';

/// Splits `<sigil><name>:<host>` into its name and host.
///
/// The host is everything after the first `:`, so server names carrying a
/// port (`example.org:8448`) are kept whole.
fn split_sigiled(value: &str, sigil: char) -> Result<(&str, &str), IdentifierError> {
    let invalid = || IdentifierError::InvalidFormat {
        value: value.to_owned(),
        sigil,
    };

    let rest = value.strip_prefix(sigil).ok_or_else(invalid)?;
    let (name, host) = rest.split_once(':').ok_or_else(invalid)?;
    if name.is_empty() || host.is_empty() {
        return Err(invalid());
    }

    Ok((name, host))
}

/// A fully qualified Matrix user ID, `@username:host`.
///
/// # Examples
///
/// ```
/// use matrix_client::identifiers::MatrixId;
///
/// let id: MatrixId = "@alice:matrix.org".parse().unwrap();
/// assert_eq!(id.host(), "matrix.org");
/// assert_eq!(id.to_string(), "@alice:matrix.org");
///
/// assert!("alice:matrix.org".parse::<MatrixId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatrixId {
    /// Local part of the user ID.
    username: String,
    /// Server name the user is registered on.
    host: String,
}

impl MatrixId {
    /// Creates a user ID from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] if either part is empty or
    /// the username contains a `:`, since the result would not parse back.
    pub fn new(username: &str, host: &str) -> Result<Self, IdentifierError> {
        let value = format!("{USER_SIGIL}{username}:{host}");
        if username.contains(':') {
            return Err(IdentifierError::InvalidFormat {
                value,
                sigil: USER_SIGIL,
            });
        }
        value.parse()
    }

    /// The local part of the user ID.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The server name of the user ID.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl FromStr for MatrixId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (username, host) = split_sigiled(value, USER_SIGIL)?;
        Ok(MatrixId {
            username: username.to_owned(),
            host: host.to_owned(),
        })
    }
}

impl TryFrom<String> for MatrixId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatrixId> for String {
    fn from(id: MatrixId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for MatrixId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}:{}", USER_SIGIL, self.username, self.host)
    }
}

/// A Matrix room ID, `!roomname:host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId {
    /// Opaque local part of the room ID.
    roomname: String,
    /// Server name that created the room.
    host: String,
}

impl RoomId {
    /// Creates a room ID from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] if either part is empty or
    /// the room name contains a `:`.
    pub fn new(roomname: &str, host: &str) -> Result<Self, IdentifierError> {
        let value = format!("{ROOM_SIGIL}{roomname}:{host}");
        if roomname.contains(':') {
            return Err(IdentifierError::InvalidFormat {
                value,
                sigil: ROOM_SIGIL,
            });
        }
        value.parse()
    }

    /// The local part of the room ID.
    pub fn roomname(&self) -> &str {
        &self.roomname
    }

    /// The server name of the room ID.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl FromStr for RoomId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (roomname, host) = split_sigiled(value, ROOM_SIGIL)?;
        Ok(RoomId {
            roomname: roomname.to_owned(),
            host: host.to_owned(),
        })
    }
}

impl TryFrom<String> for RoomId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}:{}", ROOM_SIGIL, self.roomname, self.host)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_matrix_id_round_trip() {
        for value in [
            "@alice:matrix.org",
            "@cli-testing:matrix.org",
            "@bot:example.org:8448",
        ] {
            let id: MatrixId = value.parse().unwrap();
            assert_eq!(id.to_string(), value);
        }
    }

    #[test]
    fn test_matrix_id_parts() {
        let id: MatrixId = "@alice:matrix.org".parse().unwrap();
        assert_eq!(id.username(), "alice");
        assert_eq!(id.host(), "matrix.org");
        assert_eq!(MatrixId::new("alice", "matrix.org").unwrap(), id);
    }

    #[test]
    fn test_matrix_id_host_keeps_port() {
        let id: MatrixId = "@bot:example.org:8448".parse().unwrap();
        assert_eq!(id.username(), "bot");
        assert_eq!(id.host(), "example.org:8448");
    }

    #[test]
    fn test_matrix_id_invalid_format() {
        for value in ["alice:matrix.org", "@alice", "", "@:matrix.org", "@alice:", "!room:host"] {
            let err = value.parse::<MatrixId>().unwrap_err();
            assert_eq!(
                err,
                IdentifierError::InvalidFormat {
                    value: value.to_owned(),
                    sigil: '@'
                }
            );
        }
    }

    #[test]
    fn test_matrix_id_new_rejects_colon_in_username() {
        let err = MatrixId::new("ali:ce", "matrix.org").unwrap_err();
        assert!(matches!(err, IdentifierError::InvalidFormat { sigil: '@', .. }));
    }

    #[test]
    fn test_matrix_id_equality_and_hash() {
        let a: MatrixId = "@alice:matrix.org".parse().unwrap();
        let b = MatrixId::new("alice", "matrix.org").unwrap();
        let c: MatrixId = "@alice:example.org".parse().unwrap();

        let set: HashSet<MatrixId> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_matrix_id_json() {
        let id: MatrixId = serde_json::from_str(r#""@alice:matrix.org""#).unwrap();
        assert_eq!(id.username(), "alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""@alice:matrix.org""#);

        assert!(serde_json::from_str::<MatrixId>(r#""alice""#).is_err());
    }

    #[test]
    fn test_room_id_round_trip() {
        let id: RoomId = "!jEsUZKDJdhlrceRyVU:example.org".parse().unwrap();
        assert_eq!(id.roomname(), "jEsUZKDJdhlrceRyVU");
        assert_eq!(id.host(), "example.org");
        assert_eq!(id.to_string(), "!jEsUZKDJdhlrceRyVU:example.org");
    }

    #[test]
    fn test_room_id_invalid_format() {
        let err = "@alice:matrix.org".parse::<RoomId>().unwrap_err();
        assert!(matches!(err, IdentifierError::InvalidFormat { sigil: '!', .. }));
        assert!("!room".parse::<RoomId>().is_err());
        assert!(RoomId::new("", "matrix.org").is_err());
    }

    #[test]
    fn test_room_id_json() {
        let rooms: Vec<RoomId> =
            serde_json::from_str(r#"["!a:matrix.org", "!b:example.org"]"#).unwrap();
        assert_eq!(rooms[0].roomname(), "a");
        assert_eq!(rooms[1].host(), "example.org");
    }
}
