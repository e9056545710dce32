//! Shared HTTP plumbing for the REST adapters
//!
//! Every adapter sends bearer-authenticated requests through
//! [`AuthorizedClient`] and maps non-success responses with
//! [`error_for_response`], so `reqwest` types never leave this layer.

use crate::adapters::auth::TokenProvider;
use crate::domain::{OffboardError, Result};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a client with a total request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| OffboardError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Builds a client for long streamed bodies: no total timeout, no redirects
///
/// Read stalls are bounded by the caller per chunk. Redirects stay off so a
/// resumable `308 Resume Incomplete` reaches the upload driver untouched.
pub(crate) fn build_streaming_client() -> Result<Client> {
    ClientBuilder::new()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| OffboardError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// HTTP client paired with the token provider of one delegated identity
#[derive(Clone)]
pub struct AuthorizedClient {
    http: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl AuthorizedClient {
    pub fn new(http: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { http, tokens }
    }

    /// Starts a request carrying a fresh bearer token
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token.expose_secret().as_ref()))
    }
}

/// Maps a transport failure to a connection error for `service`
pub(crate) fn connection_error(service: &'static str, err: reqwest::Error) -> OffboardError {
    if err.is_timeout() {
        OffboardError::Connection(format!("{service} request timed out: {err}"))
    } else {
        OffboardError::Connection(format!("{service} request failed: {err}"))
    }
}

/// Converts a non-success response into a domain error, consuming the body
pub(crate) async fn error_for_response(service: &'static str, response: Response) -> OffboardError {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() { url } else { format!("{url}: {body}") };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            OffboardError::Authorization(format!("{service} returned {status}: {message}"))
        }
        StatusCode::NOT_FOUND => OffboardError::NotFound(format!("{service}: {message}")),
        _ => OffboardError::Service {
            service,
            status: status.as_u16(),
            message,
        },
    }
}

/// Sends a request and returns the response if it is a success
pub(crate) async fn send_checked(service: &'static str, request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| connection_error(service, e))?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_for_response(service, response).await)
    }
}

/// Sends a request and decodes a JSON success body
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let response = send_checked(service, request).await?;
    response.json::<T>().await.map_err(|e| {
        OffboardError::Serialization(format!("{service} returned an unexpected body: {e}"))
    })
}

/// Percent-encodes one URL path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Deserializes an optional `u64` the APIs send either as a JSON number or
/// as a decimal string (int64 fields)
pub(crate) mod opt_u64 {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::String(s)) => s
                .parse()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid size '{s}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct SizedObject {
        #[serde(default, deserialize_with = "opt_u64::deserialize")]
        size: Option<u64>,
    }

    #[test]
    fn test_opt_u64_accepts_string_and_number() {
        let s: SizedObject = serde_json::from_str(r#"{"size": "1000"}"#).unwrap();
        assert_eq!(s.size, Some(1000));
        let n: SizedObject = serde_json::from_str(r#"{"size": 42}"#).unwrap();
        assert_eq!(n.size, Some(42));
        let missing: SizedObject = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.size, None);
        assert!(serde_json::from_str::<SizedObject>(r#"{"size": "big"}"#).is_err());
    }

    #[test]
    fn test_segment_encodes_slashes_and_at() {
        assert_eq!(segment("exp/a b.mbox"), "exp%2Fa%20b.mbox");
        assert_eq!(segment("a@x.com"), "a%40x.com");
    }

    #[tokio::test]
    async fn test_error_for_response_maps_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _forbidden = server
            .mock("GET", "/forbidden")
            .with_status(403)
            .with_body("no scope")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();

        let resp = client.get(format!("{}/forbidden", server.url())).send().await.unwrap();
        let err = error_for_response("Test", resp).await;
        assert!(matches!(err, OffboardError::Authorization(ref m) if m.contains("no scope")));

        let resp = client.get(format!("{}/missing", server.url())).send().await.unwrap();
        assert!(matches!(
            error_for_response("Test", resp).await,
            OffboardError::NotFound(_)
        ));

        let resp = client.get(format!("{}/broken", server.url())).send().await.unwrap();
        match error_for_response("Test", resp).await {
            OffboardError::Service { status, message, .. } => {
                assert_eq!(status, 500);
                assert!(message.contains("boom"));
            }
            other => panic!("Expected Service error, got {other:?}"),
        }
    }
}
