//! The Matrix client.
//!
//! This module provides [`MatrixClient`], which issues one HTTP exchange per
//! operation and decodes the answer into a typed value.

use std::{future::Future, sync::Arc};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::{
    api::{
        EmptyResponse, JoinedRoomResponse, LoginFlow, LoginFlowsResponse, LoginPasswordRequest,
        LoginResponse, VersionsResponse, WhoAmIResponse,
    },
    client::{
        error::ClientError,
        handle::RequestHandle,
        response::decode_response,
        transport::{HttpRequest, ReqwestTransport, Transport},
    },
    endpoints::{EndpointError, Endpoints, Homeserver, Route},
    identifiers::RoomId,
};

/// Client for a homeserver's client-server API.
///
/// The client holds no per-request state and never stores credentials:
/// authenticated operations take the access token as an argument. Clones
/// share the same transport, and operations can run concurrently.
///
/// # Examples
///
/// ```no_run
/// use matrix_client::{
///     api::LoginPasswordRequest,
///     client::MatrixClient,
///     endpoints::{Homeserver, Version},
///     identifiers::Identifier,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let homeserver = Homeserver::new("https", "matrix.org", 443, Version::R0_6_0);
/// let client = MatrixClient::new(&homeserver)?;
///
/// let flows = client.login_flows().await?;
/// println!("supported flows: {:?}", flows);
///
/// let request = LoginPasswordRequest::new(
///     Identifier::user("@alice:matrix.org".parse()?),
///     "secret",
///     "laptop",
/// );
/// let session = client.login(&request).await?;
/// let rooms = client.joined_rooms(&session.access_token).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MatrixClient<T: Transport = ReqwestTransport> {
    /// Route URLs of the homeserver
    endpoints: Endpoints,
    /// Transport shared between clones
    transport: Arc<T>,
}

impl<T: Transport> Clone for MatrixClient<T> {
    fn clone(&self) -> Self {
        MatrixClient {
            endpoints: self.endpoints.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl MatrixClient<ReqwestTransport> {
    /// Creates a client speaking to `homeserver` over reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidEndpoint`] if the homeserver location
    /// does not form a valid URL.
    pub fn new(homeserver: &Homeserver) -> Result<Self, EndpointError> {
        MatrixClient::with_transport(homeserver, ReqwestTransport::new())
    }
}

impl<T: Transport> MatrixClient<T> {
    /// Creates a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidEndpoint`] if the homeserver location
    /// does not form a valid URL.
    pub fn with_transport(homeserver: &Homeserver, transport: T) -> Result<Self, EndpointError> {
        let endpoints = Endpoints::new(homeserver)?;
        debug!(
            "client for {} using version {}",
            endpoints.base_url(),
            endpoints.version()
        );

        Ok(MatrixClient {
            endpoints,
            transport: Arc::new(transport),
        })
    }

    /// The endpoints this client sends requests to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Request `GET /_matrix/client/versions`, the versions and unstable
    /// features the homeserver supports.
    ///
    /// ```text
    /// { "versions": ["r0.5.0", "r0.6.0"], "unstable_features": { "m.lazy_load_members": true } }
    /// ```
    pub async fn versions(&self) -> Result<VersionsResponse, ClientError> {
        info!("request supported versions");
        self.send(HttpRequest::get(self.endpoints.versions())).await
    }

    /// Request `GET {prefix}login`, the login flows the homeserver supports.
    ///
    /// ```text
    /// { "flows": [ { "type": "m.login.password" } ] }
    /// ```
    pub async fn login_flows(&self) -> Result<Vec<LoginFlow>, ClientError> {
        info!("request login flows");
        let response: LoginFlowsResponse = self
            .send(HttpRequest::get(self.endpoints.route(Route::Login)))
            .await?;

        debug!("supported login flows {:?}", response.flows);
        Ok(response.flows)
    }

    /// Request `POST {prefix}login` to authenticate with a password.
    pub async fn login(&self, request: &LoginPasswordRequest) -> Result<LoginResponse, ClientError> {
        info!(
            "log in with identifier {}",
            request.identifier.identifier_type()
        );
        let http_request = HttpRequest::post_json(self.endpoints.route(Route::Login), request)
            .map_err(ClientError::Encode)?;

        let response: LoginResponse = self.send(http_request).await?;
        info!("logged in {}", response);
        Ok(response)
    }

    /// Request `GET {prefix}joined_rooms`, the rooms the token's owner has
    /// joined.
    pub async fn joined_rooms(&self, access_token: &str) -> Result<Vec<RoomId>, ClientError> {
        info!("request joined rooms");
        let http_request = HttpRequest::get(self.endpoints.route(Route::JoinedRooms))
            .with_access_token(access_token);

        let response: JoinedRoomResponse = self.send(http_request).await?;
        debug!("joined rooms {:?}", response.joined_rooms);
        Ok(response.joined_rooms)
    }

    /// Request `GET {prefix}account/whoami`, the owner of an access token.
    pub async fn whoami(&self, access_token: &str) -> Result<WhoAmIResponse, ClientError> {
        info!("request access token owner");
        let http_request = HttpRequest::get(self.endpoints.route(Route::WhoAmI))
            .with_access_token(access_token);

        self.send(http_request).await
    }

    /// Request `POST {prefix}logout`, invalidating the access token.
    pub async fn logout(&self, access_token: &str) -> Result<(), ClientError> {
        info!("log out");
        let http_request =
            HttpRequest::post_json(self.endpoints.route(Route::Logout), &serde_json::json!({}))
                .map_err(ClientError::Encode)?
                .with_access_token(access_token);

        let EmptyResponse {} = self.send(http_request).await?;
        Ok(())
    }

    /// Runs `operation` on a clone of the client as a spawned task and returns
    /// a cancellable handle to it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use matrix_client::{client::MatrixClient, endpoints::Homeserver};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = MatrixClient::new(&Homeserver::from_url("https://matrix.org")?)?;
    /// let handle = client.spawn(|client| async move { client.versions().await });
    /// let versions = handle.await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn<F, Fut, R>(&self, operation: F) -> RequestHandle<R>
    where
        T: 'static,
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<R, ClientError>> + Send + 'static,
        R: Send + 'static,
    {
        RequestHandle::spawn(operation(self.clone()))
    }

    /// Sends `request` and decodes the answer as `R`.
    async fn send<R>(&self, request: HttpRequest) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        debug!("request {} {}", request.method, request.url);
        let outcome = self.transport.execute(request).await;

        let decoded = decode_response(outcome);
        if let Err(e) = &decoded {
            warn!("request failed: {}", e);
        }
        decoded
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use reqwest::{
        StatusCode,
        header::{CONTENT_LENGTH, HeaderMap, HeaderValue},
    };

    use super::*;
    use crate::{
        api::{ErrorCode, LoginType},
        client::transport::{MockTransport, RawResponse, TransportError},
        endpoints::Version,
        identifiers::Identifier,
    };

    fn stub_homeserver(server: &mockito::Server) -> Homeserver {
        Homeserver::from_url(&server.url()).unwrap()
    }

    fn matrix_org() -> Homeserver {
        Homeserver::new("https", "matrix.org", 443, Version::R0_6_0)
    }

    #[tokio::test]
    async fn test_versions() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"versions": ["r0.5.0", "r0.6.0", "v1.1"], "unstable_features": {"m.lazy_load_members": true}}"#;

        server
            .mock("GET", "/_matrix/client/versions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let versions = client.versions().await.unwrap();

        let expected: HashSet<Version> = [
            Version::R0_5_0,
            Version::R0_6_0,
            Version::Other("v1.1".to_owned()),
        ]
        .into_iter()
        .collect();
        assert_eq!(versions.versions, expected);
        assert_eq!(
            versions.unstable_features.get("m.lazy_load_members"),
            Some(&true)
        );
    }

    #[tokio::test]
    async fn test_login_flows() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"flows": [{"type": "m.login.password"}, {"type": "m.login.sso"}]}"#;

        server
            .mock("GET", "/_matrix/client/r0/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let flows = client.login_flows().await.unwrap();

        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].login_type, LoginType::Password);
        assert_eq!(
            flows[1].login_type,
            LoginType::Unknown("m.login.sso".to_owned())
        );
    }

    #[tokio::test]
    async fn test_login() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"user_id": "@alice:matrix.org", "access_token": "syt_abc", "device_id": "STUBDEVICE", "home_server": "matrix.org"}"#;

        let mock = server
            .mock("POST", "/_matrix/client/r0/login")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "type": "m.login.password",
                "identifier": {"type": "m.id.user", "user": "@alice:matrix.org"},
                "password": "pw",
                "initial_device_display_name": "dev"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let request = LoginPasswordRequest::new(
            Identifier::user("@alice:matrix.org".parse().unwrap()),
            "pw",
            "dev",
        );
        let response = client.login(&request).await.unwrap();

        assert_eq!(response.user_id.to_string(), "@alice:matrix.org");
        assert_eq!(response.device_id, "STUBDEVICE");
        assert_eq!(response.access_token, "syt_abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_forbidden() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/_matrix/client/r0/login")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errcode": "M_FORBIDDEN", "error": "Invalid password"}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let request = LoginPasswordRequest::new(
            Identifier::user("@alice:matrix.org".parse().unwrap()),
            "wrong",
            "dev",
        );
        let err = client.login(&request).await.unwrap_err();

        let ClientError::Api(api_error) = err else {
            panic!("expected an api error, got {err:?}");
        };
        assert_eq!(api_error.status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.effective_code(), ErrorCode::Forbidden);
        assert_eq!(api_error.response.error, "Invalid password");
    }

    #[tokio::test]
    async fn test_joined_rooms() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/_matrix/client/r0/joined_rooms")
            .match_header("authorization", "Bearer syt_abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"joined_rooms": ["!foo:matrix.org", "!bar:example.org"]}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let rooms = client.joined_rooms("syt_abc").await.unwrap();

        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].to_string(), "!foo:matrix.org");
        assert_eq!(rooms[1].to_string(), "!bar:example.org");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_joined_rooms_unknown_token() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/_matrix/client/r0/joined_rooms")
            .with_status(401)
            .with_body(r#"{"errcode": "M_UNKNOWN_TOKEN", "error": "Invalid access token passed."}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let err = client.joined_rooms("expired").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api(ref api_error) if api_error.response.code == ErrorCode::UnknownToken
        ));
    }

    #[tokio::test]
    async fn test_whoami() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/_matrix/client/r0/account/whoami")
            .match_header("authorization", "Bearer syt_abc")
            .with_status(200)
            .with_body(r#"{"user_id": "@alice:matrix.org", "device_id": "STUBDEVICE"}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let whoami = client.whoami("syt_abc").await.unwrap();

        assert_eq!(whoami.user_id.username(), "alice");
        assert_eq!(whoami.device_id.as_deref(), Some("STUBDEVICE"));
    }

    #[tokio::test]
    async fn test_logout() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/_matrix/client/r0/logout")
            .match_header("authorization", "Bearer syt_abc")
            .match_body("{}")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        client.logout("syt_abc").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_logout_error_with_success_status() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/_matrix/client/r0/logout")
            .with_status(200)
            .with_body(r#"{"errcode": "M_UNKNOWN_TOKEN", "error": "bad"}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let err = client.logout("expired").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api(ref api_error) if api_error.effective_code() == ErrorCode::UnknownToken
        ));
    }

    #[test]
    fn test_client_endpoints_base() {
        let client = MatrixClient::new(&matrix_org()).unwrap();
        assert_eq!(client.endpoints().base_url().as_str(), "https://matrix.org/");
    }

    #[tokio::test]
    async fn test_bare_prefix_for_other_versions() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/_matrix/client/login")
            .with_status(200)
            .with_body(r#"{"flows": []}"#)
            .create_async()
            .await;

        let mut homeserver = stub_homeserver(&server);
        homeserver.version = Version::from("v1.1");
        let client = MatrixClient::new(&homeserver).unwrap();

        assert!(client.login_flows().await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn test_invalid_homeserver() {
        let homeserver = Homeserver::new("gopher", "matrix.org", 70, Version::R0_6_0);
        assert!(matches!(
            MatrixClient::new(&homeserver),
            Err(EndpointError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_request_shape_with_mock_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                request.method == reqwest::Method::GET
                    && request.url.as_str() == "https://matrix.org/_matrix/client/r0/joined_rooms"
                    && request
                        .access_token
                        .as_ref()
                        .is_some_and(|token| token.as_str() == "syt_abc")
            })
            .times(1)
            .returning(|_| {
                Ok(Some(RawResponse {
                    status: 200,
                    headers: HeaderMap::new(),
                    body: Some(br#"{"joined_rooms": []}"#.to_vec()),
                }))
            });

        let client = MatrixClient::with_transport(&matrix_org(), transport).unwrap();
        assert!(client.joined_rooms("syt_abc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payload_size_mismatch() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_LENGTH, HeaderValue::from_static("512"));
            Ok(Some(RawResponse {
                status: 200,
                headers,
                body: Some(br#"{"flows": [{"type": "m.lo"#.to_vec()),
            }))
        });

        let client = MatrixClient::with_transport(&matrix_org(), transport).unwrap();
        let err = client.login_flows().await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::PayloadSizeMismatch { expected: 512, .. }
        ));
    }

    #[tokio::test]
    async fn test_no_response() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| Ok(None));

        let client = MatrixClient::with_transport(&matrix_org(), transport).unwrap();
        assert!(matches!(
            client.versions().await,
            Err(ClientError::NoResponse)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Err(TransportError::Other("timed out".to_owned())));

        let client = MatrixClient::with_transport(&matrix_org(), transport).unwrap();
        let err = client.login_flows().await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Other(_))));
    }

    #[tokio::test]
    async fn test_concurrent_operations() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/_matrix/client/versions")
            .with_status(200)
            .with_body(r#"{"versions": ["r0.6.0"]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/_matrix/client/r0/login")
            .with_status(200)
            .with_body(r#"{"flows": [{"type": "m.login.password"}]}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let (versions, flows) = futures::join!(client.versions(), client.login_flows());

        assert!(versions.unwrap().versions.contains(&Version::R0_6_0));
        assert_eq!(flows.unwrap().len(), 1);
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> Result<Option<RawResponse>, TransportError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_spawned_request_can_be_cancelled() {
        let client = MatrixClient::with_transport(&matrix_org(), StalledTransport).unwrap();

        let handle = client.spawn(|client| async move { client.login_flows().await });
        handle.cancel();

        assert!(matches!(handle.await, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_spawned_request_completes() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/_matrix/client/r0/login")
            .with_status(200)
            .with_body(r#"{"flows": [{"type": "m.login.password"}]}"#)
            .create_async()
            .await;

        let client = MatrixClient::new(&stub_homeserver(&server)).unwrap();
        let handle = client.spawn(|client| async move { client.login_flows().await });

        assert_eq!(handle.await.unwrap().len(), 1);
    }
}
