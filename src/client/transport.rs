//! HTTP transport seam.
//!
//! The client hands a fully built [`HttpRequest`] to a [`Transport`] and gets
//! back the raw status, headers and body. [`ReqwestTransport`] is the
//! production implementation; the crate's tests substitute a mock.

use std::fmt;

use async_trait::async_trait;
use log::trace;
use mime::Mime;
#[cfg(test)]
use mockall::automock;
use reqwest::{
    Client, Method,
    header::{CONTENT_TYPE, HeaderMap},
};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// A bearer access token. Its `Debug` output never shows the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token.
    pub fn new(token: &str) -> Self {
        AccessToken(token.to_owned())
    }

    /// The token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully qualified URL.
    pub url: Url,
    /// Bearer token sent in the `Authorization` header.
    pub access_token: Option<AccessToken>,
    /// Media type of `body`.
    pub content_type: Option<Mime>,
    /// Serialized body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A body-less `GET`.
    pub fn get(url: Url) -> Self {
        HttpRequest {
            method: Method::GET,
            url,
            access_token: None,
            content_type: None,
            body: None,
        }
    }

    /// A `POST` carrying `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `body` cannot be encoded.
    pub fn post_json<B: Serialize>(url: Url, body: &B) -> Result<Self, serde_json::Error> {
        Ok(HttpRequest {
            method: Method::POST,
            url,
            access_token: None,
            content_type: Some(mime::APPLICATION_JSON),
            body: Some(serde_json::to_vec(body)?),
        })
    }

    /// Authenticates the request with `access_token`.
    pub fn with_access_token(mut self, access_token: &str) -> Self {
        self.access_token = Some(AccessToken::new(access_token));
        self
    }
}

/// What came back over the wire, before any validation.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// Numeric status code as received.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body, `None` when the server sent none.
    pub body: Option<Vec<u8>>,
}

/// The exchange itself failed: connection, TLS, timeout...
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failure reported by reqwest.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// Failure reported by another transport implementation.
    #[error("{0}")]
    Other(String),
}

/// Executes one HTTP exchange.
///
/// Implementations must be safe to share between concurrent requests.
/// Returning `Ok(None)` means the exchange completed without a response.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    async fn execute(&self, request: HttpRequest) -> Result<Option<RawResponse>, TransportError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
///
/// Timeouts, TLS and redirects follow the client's configuration.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    /// HTTP client
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default [`reqwest::Client`].
    pub fn new() -> Self {
        ReqwestTransport {
            client: Client::new(),
        }
    }

    /// Creates a transport around a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<Option<RawResponse>, TransportError> {
        let HttpRequest {
            method,
            url,
            access_token,
            content_type,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        if let Some(access_token) = &access_token {
            builder = builder.bearer_auth(access_token.as_str());
        }
        if let Some(content_type) = &content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_ref());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        trace!("received {} bytes with status {}", body.len(), status);

        Ok(Some(RawResponse {
            status,
            headers,
            body: (!body.is_empty()).then(|| body.to_vec()),
        }))
    }
}
