//! Client for the Matrix client-server API.
//!
//! Every operation follows the same pipeline:
//!
//! 1. Build the route URL from the client's [`crate::endpoints::Endpoints`].
//! 2. Encode the request body, if any, as JSON.
//! 3. Execute the exchange through a [`Transport`].
//! 4. Validate the raw response (presence, status, declared length, body).
//! 5. Decode the body as the expected type, or as the standard error envelope.
//!
//! Failures at every step are reported as a [`ClientError`]. Operations are
//! `async`; [`MatrixClient::spawn`] runs one as a tokio task and returns a
//! [`RequestHandle`] that can cancel it.
//!
//! # Modules
//!
//! - `client` - [`MatrixClient`] and its operations
//! - `transport` - the [`Transport`] seam and its reqwest implementation
//! - `response` - response validation and decoding
//! - `handle` - cancellable [`RequestHandle`]s
//! - `error` - [`ClientError`] and [`ApiError`]

#[allow(clippy::module_inception)]
mod client;
mod error;
mod handle;
mod response;
mod transport;

pub use crate::client::client::MatrixClient;
pub use crate::client::error::{ApiError, ClientError};
pub use crate::client::handle::RequestHandle;
pub use crate::client::transport::{
    AccessToken, HttpRequest, RawResponse, ReqwestTransport, Transport, TransportError,
};
