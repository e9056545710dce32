//! Export job creation
//!
//! One matter per corpus, one export per matter. Job creation is never
//! retried: a retry after a partial creation would leave duplicate matters.

use crate::adapters::vault::{ExportRequest, ExportService};
use crate::config::ExportConfig;
use crate::domain::{Corpus, ExportJob, Result, UserEmail};
use chrono::Utc;
use std::sync::Arc;

/// Name of the matter holding `corpus` exports for `user`
pub fn matter_name(user: &UserEmail, corpus: Corpus) -> String {
    match corpus {
        Corpus::Mail => format!("Archive Matter: {user}"),
        Corpus::Files => format!("Drive Archive Matter: {user}"),
    }
}

/// Description attached to the `corpus` matter
pub fn matter_description(user: &UserEmail, corpus: Corpus) -> String {
    match corpus {
        Corpus::Mail => format!("Automated export for offboarding {user}"),
        Corpus::Files => format!("Automated Drive export for offboarding {user}"),
    }
}

/// Name of one export, unique per second
pub fn export_name(user: &UserEmail, corpus: Corpus, unix_secs: i64) -> String {
    format!("{}_Export_{}_{}", corpus.display_prefix(), user, unix_secs)
}

/// Creates export jobs
pub struct ExportRequester {
    service: Arc<dyn ExportService>,
    config: ExportConfig,
}

impl ExportRequester {
    pub fn new(service: Arc<dyn ExportService>, config: ExportConfig) -> Self {
        Self { service, config }
    }

    /// Creates a matter and an export job for `user`'s `corpus`
    ///
    /// # Errors
    ///
    /// Any failure from the export service propagates unchanged.
    pub async fn request_export(&self, user: &UserEmail, corpus: Corpus) -> Result<ExportJob> {
        let matter_id = self
            .service
            .create_matter(&matter_name(user, corpus), &matter_description(user, corpus))
            .await?;
        tracing::info!(user = %user, corpus = %corpus, matter_id = %matter_id, "Matter created");

        let created_at = Utc::now();
        let request = ExportRequest {
            name: export_name(user, corpus, created_at.timestamp()),
            corpus,
            user: user.clone(),
            mail_format: self.config.mail_format,
            include_shared_drives: self.config.include_shared_drives,
        };
        let export_id = self.service.create_export(&matter_id, &request).await?;

        let job = ExportJob {
            matter_id,
            export_id,
            corpus,
            user: user.clone(),
            created_at,
        };
        crate::log_export_created!(job);
        Ok(job)
    }
}
