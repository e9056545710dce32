//! eDiscovery REST client

use super::models::{
    AccountInfo, DriveExportOptions, DriveQueryOptions, ExportBody, ExportOptions,
    ExportResponse, MailExportOptions, MatterBody, MatterResponse, Query,
};
use super::{ExportRequest, ExportService};
use crate::adapters::http::{segment, send_json, AuthorizedClient};
use crate::domain::{Corpus, ExportId, ExportSnapshot, MatterId, OffboardError, Result};
use async_trait::async_trait;
use reqwest::Method;

const SERVICE: &str = "Vault";

/// Export service backed by `vault.googleapis.com`
pub struct VaultClient {
    client: AuthorizedClient,
    base_url: String,
}

impl VaultClient {
    pub fn new(client: AuthorizedClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn exports_url(&self, matter: &MatterId) -> String {
        format!(
            "{}/v1/matters/{}/exports",
            self.base_url,
            segment(matter.as_str())
        )
    }
}

fn export_body(request: &ExportRequest) -> ExportBody<'_> {
    let (drive_options, export_options) = match request.corpus {
        Corpus::Mail => (
            None,
            ExportOptions {
                mail_options: Some(MailExportOptions {
                    export_format: request.mail_format.as_str(),
                    use_new_export: true,
                }),
                drive_options: None,
            },
        ),
        Corpus::Files => (
            Some(DriveQueryOptions {
                include_shared_drives: request.include_shared_drives,
                include_team_drives: request.include_shared_drives,
            }),
            ExportOptions {
                mail_options: None,
                drive_options: Some(DriveExportOptions {
                    include_access_info: true,
                }),
            },
        ),
    };

    ExportBody {
        name: &request.name,
        query: Query {
            corpus: request.corpus.wire_name(),
            data_scope: "ALL_DATA",
            search_method: "ACCOUNT",
            account_info: AccountInfo {
                emails: [request.user.as_str()],
            },
            drive_options,
        },
        export_options,
    }
}

#[async_trait]
impl ExportService for VaultClient {
    async fn create_matter(&self, name: &str, description: &str) -> Result<MatterId> {
        let url = format!("{}/v1/matters", self.base_url);
        let request = self
            .client
            .request(Method::POST, &url)
            .await?
            .json(&MatterBody {
                name,
                description,
                state: "OPEN",
            });

        let response: MatterResponse = send_json(SERVICE, request).await?;
        MatterId::new(response.matter_id).map_err(|e| {
            OffboardError::Serialization(format!("{SERVICE} returned an invalid matter id: {e}"))
        })
    }

    async fn create_export(&self, matter: &MatterId, request: &ExportRequest) -> Result<ExportId> {
        let url = self.exports_url(matter);
        let body = export_body(request);
        tracing::debug!(
            matter_id = %matter,
            corpus = %request.corpus,
            name = %request.name,
            "Creating export"
        );

        let http_request = self.client.request(Method::POST, &url).await?.json(&body);
        let response: ExportResponse = send_json(SERVICE, http_request).await?;
        ExportId::new(response.id).map_err(|e| {
            OffboardError::Serialization(format!("{SERVICE} returned an invalid export id: {e}"))
        })
    }

    async fn get_export(&self, matter: &MatterId, export: &ExportId) -> Result<ExportSnapshot> {
        let url = format!("{}/{}", self.exports_url(matter), segment(export.as_str()));
        let request = self.client.request(Method::GET, &url).await?;
        let response: ExportResponse = send_json(SERVICE, request).await?;
        Ok(response.into())
    }
}
