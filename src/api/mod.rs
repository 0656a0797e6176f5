//! Typed request and response bodies of the client-server API.
//!
//! This module contains the JSON shapes exchanged with a homeserver. They are
//! plain values: requests are built by the caller, responses by the decoding
//! step of the [`crate::client`] pipeline.
//!
//! # Modules
//!
//! - `login` - login flows and login types
//! - `requests` - request bodies, such as [`LoginPasswordRequest`]
//! - `responses` - success bodies, such as [`LoginResponse`]
//! - `error_response` - the standard error envelope, [`ErrorResponse`]

mod error_response;
mod login;
mod requests;
mod responses;

pub use crate::api::error_response::{ErrorCode, ErrorResponse};
pub use crate::api::login::{LoginFlow, LoginType};
pub use crate::api::requests::LoginPasswordRequest;
pub use crate::api::responses::{
    DiscoveryInformation, EmptyResponse, JoinedRoomResponse, LoginFlowsResponse, LoginResponse,
    ServerInformation, VersionsResponse, WhoAmIResponse,
};
