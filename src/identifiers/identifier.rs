//! User identifier objects sent during authentication.
//!
//! On the wire an identifier is a JSON object whose `type` field names the
//! kind of identifier and decides which other fields are present:
//!
//! ```text
//! { "type": "m.id.user",       "user": "@alice:matrix.org" }
//! { "type": "m.id.thirdparty", "medium": "email", "address": "alice@matrix.org" }
//! { "type": "m.id.phone",      "country": "GB", "phone": "07700900001" }
//! ```
//!
//! Decoding reads the `type` field first, then decodes the rest of the object
//! as the matching variant.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use crate::identifiers::{IdentifierError, MatrixId};

/// Discriminator values of the identifier object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    /// `m.id.user`: the user is identified by their Matrix ID.
    User,
    /// `m.id.thirdparty`: the user is identified by a canonicalised 3PID.
    ThirdParty,
    /// `m.id.phone`: the user is identified by a phone number.
    Phone,
}

impl IdentifierType {
    /// The wire value of the discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::User => "m.id.user",
            IdentifierType::ThirdParty => "m.id.thirdparty",
            IdentifierType::Phone => "m.id.phone",
        }
    }
}

impl FromStr for IdentifierType {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "m.id.user" => Ok(IdentifierType::User),
            "m.id.thirdparty" => Ok(IdentifierType::ThirdParty),
            "m.id.phone" => Ok(IdentifierType::Phone),
            other => Err(IdentifierError::UnknownIdentifierType(other.to_owned())),
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace of a third-party identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    /// E-mail address, `user@domain` with a lowercase domain.
    Email,
    /// Telephone number as an E.164 MSISDN, without the leading `+`.
    Msisdn,
}

/// Two-letter uppercase ISO-3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// The code, e.g. `"GB"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() == 2 && value.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(CountryCode(value.to_owned()))
        } else {
            Err(IdentifierError::InvalidCountryCode(value.to_owned()))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Identifies a user by Matrix ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentifier {
    /// The user's fully qualified Matrix ID.
    pub user: MatrixId,
}

/// Identifies a user by a third-party identifier previously bound to the
/// account through `/account/3pid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyIdentifier {
    /// Namespace of the address.
    pub medium: Medium,
    /// Canonicalised address in that namespace.
    pub address: String,
}

/// Identifies a user by a phone number as entered by the user. The homeserver
/// canonicalises it using `country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneIdentifier {
    /// Country the number should be parsed as if dialled from.
    pub country: CountryCode,
    /// The phone number.
    pub phone: String,
}

/// A user identifier object.
///
/// The `type` discriminator is implied by the variant and cannot be set
/// independently.
///
/// # Examples
///
/// ```
/// use matrix_client::identifiers::{Identifier, Medium};
///
/// let identifier = Identifier::third_party(Medium::Email, "alice@matrix.org");
/// let json = serde_json::to_value(&identifier).unwrap();
/// assert_eq!(json["type"], "m.id.thirdparty");
///
/// let decoded: Identifier = serde_json::from_value(json).unwrap();
/// assert_eq!(decoded, identifier);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Identifier {
    /// `m.id.user`
    #[serde(rename = "m.id.user")]
    User(UserIdentifier),
    /// `m.id.thirdparty`
    #[serde(rename = "m.id.thirdparty")]
    ThirdParty(ThirdPartyIdentifier),
    /// `m.id.phone`
    #[serde(rename = "m.id.phone")]
    Phone(PhoneIdentifier),
}

impl Identifier {
    /// Identifier for a Matrix user.
    pub fn user(user: MatrixId) -> Self {
        Identifier::User(UserIdentifier { user })
    }

    /// Identifier for a third-party address.
    pub fn third_party(medium: Medium, address: &str) -> Self {
        Identifier::ThirdParty(ThirdPartyIdentifier {
            medium,
            address: address.to_owned(),
        })
    }

    /// Identifier for a phone number.
    pub fn phone(country: CountryCode, phone: &str) -> Self {
        Identifier::Phone(PhoneIdentifier {
            country,
            phone: phone.to_owned(),
        })
    }

    /// The discriminator written to the `type` field.
    pub fn identifier_type(&self) -> IdentifierType {
        match self {
            Identifier::User(_) => IdentifierType::User,
            Identifier::ThirdParty(_) => IdentifierType::ThirdParty,
            Identifier::Phone(_) => IdentifierType::Phone,
        }
    }
}

/// Minimal projection used for the first decoding phase.
#[derive(Deserialize)]
struct Discriminator {
    #[serde(rename = "type")]
    kind: String,
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        let Discriminator { kind } = Discriminator::deserialize(&value).map_err(D::Error::custom)?;
        let identifier_type: IdentifierType = kind.parse().map_err(D::Error::custom)?;

        let identifier = match identifier_type {
            IdentifierType::User => UserIdentifier::deserialize(value).map(Identifier::User),
            IdentifierType::ThirdParty => {
                ThirdPartyIdentifier::deserialize(value).map(Identifier::ThirdParty)
            }
            IdentifierType::Phone => PhoneIdentifier::deserialize(value).map(Identifier::Phone),
        };

        identifier.map_err(D::Error::custom)
    }
}
