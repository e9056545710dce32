//! Access-token acquisition
//!
//! Credential handling stays behind [`TokenProvider`]; the rest of the crate
//! only ever asks for a bearer token.

pub mod service_account;

pub use service_account::{ServiceAccountKey, ServiceAccountTokenProvider};

use crate::config::SecretString;
use crate::domain::Result;
use async_trait::async_trait;

/// Scopes used by the administrator delegation
pub const ADMIN_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/apps.licensing",
    "https://www.googleapis.com/auth/ediscovery",
    "https://www.googleapis.com/auth/devstorage.read_only",
];

/// Scopes used by the retention-store delegation
pub const RETENTION_SCOPES: &[&str] = &["https://www.googleapis.com/auth/drive"];

/// Source of OAuth bearer tokens for one delegated identity
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token valid for at least the next minute
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::OffboardError::Authorization`] when the
    /// credential is rejected.
    async fn access_token(&self) -> Result<SecretString>;
}

/// Provider returning one fixed, pre-issued token
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<SecretString> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_static_token_provider() {
        let provider = StaticTokenProvider::new(secret_string("fixed".to_string()));
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "fixed");
    }
}
