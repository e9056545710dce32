//! Offboarding run summary
//!
//! Collected by the orchestrator as the run progresses and printed by the
//! CLI at the end.

use crate::domain::{
    Corpus, ExportJob, FolderId, ItemId, LicenseReconciliation, LicenseRevocation, UserEmail,
};
use std::path::PathBuf;
use std::time::Duration;

/// Result of one corpus sub-pipeline
#[derive(Debug, Clone)]
pub struct CorpusSummary {
    pub corpus: Corpus,
    pub job: ExportJob,
    /// Files downloaded from the manifest
    pub artifacts: usize,
    pub bytes_downloaded: u64,
}

/// One file created in the retention store
#[derive(Debug, Clone)]
pub struct UploadedItem {
    pub local_path: PathBuf,
    pub item_id: ItemId,
    pub bytes: u64,
}

/// Summary of an offboarding run
#[derive(Debug, Clone)]
pub struct OffboardingSummary {
    pub user: UserEmail,
    pub dry_run: bool,
    pub license: Option<LicenseReconciliation>,
    pub corpora: Vec<CorpusSummary>,
    pub folder: Option<FolderId>,
    pub uploaded: Vec<UploadedItem>,
    pub revocation: Option<LicenseRevocation>,
    /// Whether the staging directory was purged at the end
    pub staging_purged: bool,
    pub duration: Duration,
}

impl OffboardingSummary {
    pub fn new(user: UserEmail, dry_run: bool) -> Self {
        Self {
            user,
            dry_run,
            license: None,
            corpora: Vec::new(),
            folder: None,
            uploaded: Vec::new(),
            revocation: None,
            staging_purged: false,
            duration: Duration::from_secs(0),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn total_artifacts(&self) -> usize {
        self.corpora.iter().map(|c| c.artifacts).sum()
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.corpora.iter().map(|c| c.bytes_downloaded).sum()
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.uploaded.iter().map(|u| u.bytes).sum()
    }
}
