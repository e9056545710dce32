//! Adapter construction from configuration
//!
//! Builds the token providers for the two delegated identities and wires
//! them into the REST clients behind the collaborator traits.

use crate::adapters::auth::{
    ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
    ADMIN_SCOPES, RETENTION_SCOPES,
};
use crate::adapters::drive::{DriveClient, RetentionStore};
use crate::adapters::http::{build_client, build_streaming_client, AuthorizedClient};
use crate::adapters::licensing::{LicenseDirectory, LicensingClient};
use crate::adapters::storage::{ObjectStorage, StorageClient};
use crate::adapters::vault::{ExportService, VaultClient};
use crate::config::OffboardConfig;
use crate::domain::Result;
use std::sync::Arc;

/// The collaborators one offboarding run talks to
#[derive(Clone)]
pub struct Services {
    pub licenses: Arc<dyn LicenseDirectory>,
    pub exports: Arc<dyn ExportService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub retention: Arc<dyn RetentionStore>,
}

impl Services {
    /// Builds HTTP-backed services from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service-account key cannot be
    /// read or an HTTP client cannot be built.
    pub fn from_config(config: &OffboardConfig) -> Result<Self> {
        let endpoints = &config.endpoints;
        let api_http = build_client(endpoints.request_timeout())?;
        let streaming_http = build_streaming_client()?;

        let (admin_tokens, retention_tokens) = token_providers(config, api_http.clone())?;

        let admin = AuthorizedClient::new(api_http.clone(), admin_tokens.clone());
        let admin_streaming = AuthorizedClient::new(streaming_http.clone(), admin_tokens);
        let retention = AuthorizedClient::new(api_http, retention_tokens.clone());
        let retention_streaming = AuthorizedClient::new(streaming_http, retention_tokens);

        tracing::debug!(
            licensing = %endpoints.licensing,
            vault = %endpoints.vault,
            storage = %endpoints.storage,
            drive = %endpoints.drive,
            "Creating service clients"
        );

        Ok(Self {
            licenses: Arc::new(LicensingClient::new(admin.clone(), &endpoints.licensing)),
            exports: Arc::new(VaultClient::new(admin.clone(), &endpoints.vault)),
            storage: Arc::new(StorageClient::new(admin, admin_streaming, &endpoints.storage)),
            retention: Arc::new(DriveClient::new(
                retention,
                retention_streaming,
                &endpoints.drive,
                &endpoints.drive_upload,
            )),
        })
    }
}

fn token_providers(
    config: &OffboardConfig,
    http: reqwest::Client,
) -> Result<(Arc<dyn TokenProvider>, Arc<dyn TokenProvider>)> {
    let credentials = &config.credentials;

    if let Some(token) = &credentials.access_token {
        tracing::warn!("Using a pre-issued access token for every service");
        let provider: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new(token.clone()));
        return Ok((provider.clone(), provider));
    }

    let key = ServiceAccountKey::from_file(&credentials.service_account_file)?;
    tracing::info!(
        client_email = %key.client_email,
        admin_subject = %credentials.admin_subject,
        retention_subject = %credentials.retention_subject,
        "Loaded service account credentials"
    );

    let admin = ServiceAccountTokenProvider::new(
        key.clone(),
        &credentials.admin_subject,
        ADMIN_SCOPES,
        credentials.token_uri.clone(),
        http.clone(),
    );
    let retention = ServiceAccountTokenProvider::new(
        key,
        &credentials.retention_subject,
        RETENTION_SCOPES,
        credentials.token_uri.clone(),
        http,
    );

    Ok((Arc::new(admin), Arc::new(retention)))
}
