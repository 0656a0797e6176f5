//! Matrix identifiers.
//!
//! This module provides the value types used to name users and rooms on a
//! homeserver, and the [`Identifier`] sum type clients send to tell a
//! homeserver which account they are authenticating as.
//!
//! # Modules
//!
//! - `matrix_id` - [`MatrixId`] (`@user:host`) and [`RoomId`] (`!room:host`)
//! - `identifier` - [`Identifier`] and its three variants, with the
//!   discriminator-aware JSON codec
//!
//! # Examples
//!
//! ```
//! use matrix_client::identifiers::{Identifier, MatrixId};
//!
//! let alice: MatrixId = "@alice:matrix.org".parse().unwrap();
//! assert_eq!(alice.username(), "alice");
//!
//! let identifier = Identifier::user(alice);
//! assert_eq!(identifier.identifier_type().as_str(), "m.id.user");
//! ```

mod identifier;
mod matrix_id;

use thiserror::Error;

pub use crate::identifiers::identifier::{
    CountryCode, Identifier, IdentifierType, Medium, PhoneIdentifier, ThirdPartyIdentifier,
    UserIdentifier,
};
pub use crate::identifiers::matrix_id::{MatrixId, RoomId};

/// Errors raised while building or decoding identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The textual identifier is missing its sigil or its `:` separator,
    /// or one of its two parts is empty.
    #[error("invalid identifier {value:?}: expected {sigil}<name>:<host>")]
    InvalidFormat {
        /// The rejected input.
        value: String,
        /// The sigil the identifier kind requires (`@` or `!`).
        sigil: char,
    },

    /// A user identifier object declared a `type` this client does not know.
    #[error("unknown identifier type {0:?}")]
    UnknownIdentifierType(String),

    /// The country of a phone identifier is not a two-letter uppercase code.
    #[error("invalid ISO-3166-1 alpha-2 country code {0:?}")]
    InvalidCountryCode(String),
}
