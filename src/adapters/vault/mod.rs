//! Data-governance export service integration
//!
//! [`ExportService`] is the seam the export requester and poller talk to;
//! [`VaultClient`] implements it over the eDiscovery REST API.

pub mod client;
pub(crate) mod models;

pub use client::VaultClient;

use crate::config::MailExportFormat;
use crate::domain::{Corpus, ExportId, ExportSnapshot, MatterId, Result, UserEmail};
use async_trait::async_trait;

/// Parameters of one export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub name: String,
    pub corpus: Corpus,
    pub user: UserEmail,
    /// Format of mail exports
    pub mail_format: MailExportFormat,
    /// Whether file exports include shared drives
    pub include_shared_drives: bool,
}

/// Export service
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Creates an open matter and returns its id
    async fn create_matter(&self, name: &str, description: &str) -> Result<MatterId>;

    /// Starts an export inside `matter`
    async fn create_export(&self, matter: &MatterId, request: &ExportRequest) -> Result<ExportId>;

    /// Fetches an export's current status and storage manifest
    async fn get_export(&self, matter: &MatterId, export: &ExportId) -> Result<ExportSnapshot>;
}
