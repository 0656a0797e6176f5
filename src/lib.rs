//! matrix-client - A typed client for the Matrix client-server HTTP API.
//!
//! The library turns a homeserver location and an API version into route
//! URLs, sends requests through a pluggable HTTP transport and decodes the
//! answers into typed values or typed errors.
//!
//! # Overview
//!
//! - **Identifiers**: validated Matrix user IDs (`@user:host`), room IDs
//!   (`!room:host`) and the user identifier objects sent at login
//! - **Endpoints**: `r0` routes under `/_matrix/client/r0/`, other versions
//!   under `/_matrix/client/`, version discovery at `/_matrix/client/versions`
//! - **API models**: password login, login flows, joined rooms, discovery
//!   information and the standard error envelope
//! - **Client**: async operations with a validation pipeline that reports
//!   missing, corrupted, truncated or mismatching responses as distinct errors
//! - **Cancellation**: operations can be spawned and cancelled through a
//!   [`client::RequestHandle`]
//!
//! # Examples
//!
//! ```no_run
//! use matrix_client::{
//!     api::LoginPasswordRequest,
//!     client::MatrixClient,
//!     endpoints::Homeserver,
//!     identifiers::Identifier,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MatrixClient::new(&Homeserver::from_url("https://matrix.org")?)?;
//!
//! let request = LoginPasswordRequest::new(
//!     Identifier::user("@alice:matrix.org".parse()?),
//!     "secret",
//!     "laptop",
//! );
//! let session = client.login(&request).await?;
//! for room in client.joined_rooms(&session.access_token).await? {
//!     println!("{room}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`identifiers`] - Matrix ID, room ID and login identifier types
//! - [`endpoints`] - homeserver location, versions and route URLs
//! - [`api`] - request and response bodies
//! - [`client`] - transport, response validation, client and request handles
//!
//! # Logging
//!
//! The library logs through the [`log`] facade. Access tokens and passwords
//! never appear in log output or `Debug` representations.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod identifiers;
