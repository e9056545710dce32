//! Service-account JWT bearer flow with domain-wide delegation
//!
//! The provider signs an RS256 assertion for the delegated subject, exchanges
//! it at the key's token endpoint and caches the access token until shortly
//! before it expires.

use super::TokenProvider;
use crate::adapters::http::{connection_error, error_for_response};
use crate::config::{secret_string, SecretString};
use crate::domain::{OffboardError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Fields of a service-account JSON key file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ServiceAccountKey {
    /// Reads and parses a key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OffboardError::Configuration(format!(
                "Failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            OffboardError::Configuration(format!(
                "Invalid service account key {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

/// Token provider impersonating `subject` through a service account
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    subject: String,
    scopes: Vec<String>,
    token_uri: String,
    http: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// Creates a provider
    ///
    /// `token_uri` overrides the endpoint named in the key.
    pub fn new(
        key: ServiceAccountKey,
        subject: impl Into<String>,
        scopes: &[&str],
        token_uri: Option<String>,
        http: Client,
    ) -> Self {
        let token_uri = token_uri
            .or_else(|| key.token_uri.clone())
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());
        Self {
            key,
            subject: subject.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            token_uri,
            http,
            cache: Mutex::new(None),
        }
    }

    /// Delegated subject this provider acts as
    pub fn subject(&self) -> &str {
        &self.subject
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.subject,
            scope: self.scopes.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_ref().as_bytes())
            .map_err(|e| {
                OffboardError::Authorization(format!(
                    "Service account private key for {} is not a valid RSA key: {e}",
                    self.key.client_email
                ))
            })?;

        encode(&header, &claims, &key).map_err(|e| {
            OffboardError::Authorization(format!("Failed to sign token assertion: {e}"))
        })
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.signed_assertion(now)?;

        tracing::debug!(
            subject = %self.subject,
            token_uri = %self.token_uri,
            "Exchanging service account assertion for access token"
        );

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| connection_error("Token endpoint", e))?;

        if !response.status().is_success() {
            // Any rejection here is a credential or delegation problem
            return Err(match error_for_response("Token endpoint", response).await {
                OffboardError::Service { status, message, .. } => OffboardError::Authorization(
                    format!("Token exchange for {} failed ({status}): {message}", self.subject),
                ),
                other => other,
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            OffboardError::Authorization(format!("Malformed token response: {e}"))
        })?;

        Ok(CachedToken {
            token: secret_string(body.access_token),
            expires_at: now + ChronoDuration::seconds(body.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<SecretString> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - ChronoDuration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
