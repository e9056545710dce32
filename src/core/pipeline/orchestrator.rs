//! Offboarding pipeline
//!
//! Runs strictly in sequence on one task:
//!
//! 1. reconcile the license, then wait for the directory to propagate
//! 2. per configured corpus: request, await, locate, download into staging
//! 3. upload every staged file into a retention folder named after the user
//! 4. revoke the license
//! 5. purge the staging directory
//!
//! Every step is fatal on error. Revocation is only reached after all
//! uploads succeeded, so a failed run never leaves the user unlicensed
//! with data still uncaptured.

use super::staging::StagingArea;
use super::summary::{CorpusSummary, OffboardingSummary, UploadedItem};
use crate::adapters::drive::RetentionStore;
use crate::adapters::Services;
use crate::config::OffboardConfig;
use crate::core::export::{requester, ArtifactLocator, ExportPoller, ExportRequester};
use crate::core::license::LicenseReconciler;
use crate::core::shutdown::ShutdownSignal;
use crate::core::transfer::{ChunkedDownloader, ChunkedUploader, ProgressObserver};
use crate::domain::{Corpus, Result, UserEmail};
use std::sync::Arc;
use std::time::Instant;

/// Drives one offboarding run
pub struct Orchestrator {
    config: OffboardConfig,
    reconciler: LicenseReconciler,
    requester: ExportRequester,
    poller: ExportPoller,
    locator: ArtifactLocator,
    downloader: ChunkedDownloader,
    uploader: ChunkedUploader,
    retention: Arc<dyn RetentionStore>,
    staging: StagingArea,
    shutdown: ShutdownSignal,
}

impl Orchestrator {
    pub fn new(
        services: &Services,
        config: OffboardConfig,
        shutdown: ShutdownSignal,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            reconciler: LicenseReconciler::new(
                services.licenses.clone(),
                config.license.clone(),
                config.application.dry_run,
            ),
            requester: ExportRequester::new(services.exports.clone(), config.export.clone()),
            poller: ExportPoller::new(services.exports.clone(), &config.export, shutdown.clone()),
            locator: ArtifactLocator::new(services.storage.clone()),
            downloader: ChunkedDownloader::new(
                services.storage.clone(),
                &config.transfer,
                progress.clone(),
            ),
            uploader: ChunkedUploader::new(services.retention.clone(), &config.transfer, progress),
            retention: services.retention.clone(),
            staging: StagingArea::new(&config.transfer.staging_dir),
            shutdown,
            config,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Offboards `user`
    ///
    /// # Errors
    ///
    /// The first failing step's error, unchanged. Steps after it, including
    /// license revocation, do not run.
    pub async fn run(&self, user: &UserEmail) -> Result<OffboardingSummary> {
        let started = Instant::now();
        let dry_run = self.config.application.dry_run;
        let mut summary = OffboardingSummary::new(user.clone(), dry_run);

        tracing::info!(
            user = %user,
            dry_run,
            corpora = ?self.config.export.corpora,
            staging = %self.staging.root().display(),
            "Offboarding started"
        );

        summary.license = Some(self.reconciler.check_and_fix(user).await?);

        if dry_run {
            self.log_plan(user);
            summary.revocation = Some(self.reconciler.revoke(user).await?);
            return Ok(summary.with_duration(started.elapsed()));
        }

        let delay = self.config.license.settle_delay();
        tracing::info!(
            settle_secs = delay.as_secs(),
            "Waiting for license assignment to propagate"
        );
        self.shutdown.sleep(delay, "license propagation").await?;

        let leftovers = self.staging.staged_files().await?;
        if !leftovers.is_empty() {
            tracing::warn!(
                files = leftovers.len(),
                staging = %self.staging.root().display(),
                "Staging directory is not empty; existing files will be uploaded too"
            );
        }

        for corpus in &self.config.export.corpora {
            self.shutdown.check(&format!("{corpus} export"))?;
            let corpus_summary = self.export_corpus(user, *corpus).await?;
            summary.corpora.push(corpus_summary);
        }

        self.shutdown.check("upload")?;
        let folder = self.retention.find_or_create_folder(user.as_str()).await?;
        tracing::info!(folder = %user, folder_id = %folder, "Uploading staged files");

        for path in self.staging.staged_files().await? {
            self.shutdown.check("upload")?;
            let bytes = tokio::fs::metadata(&path).await?.len();
            let item_id = self.uploader.upload(&path, &folder).await?;
            summary.uploaded.push(UploadedItem {
                local_path: path,
                item_id,
                bytes,
            });
        }
        summary.folder = Some(folder);

        self.shutdown.check("license revocation")?;
        summary.revocation = Some(self.reconciler.revoke(user).await?);

        if self.config.transfer.keep_staging {
            tracing::info!(
                staging = %self.staging.root().display(),
                "Keeping staging directory"
            );
        } else {
            self.staging.purge().await?;
            summary.staging_purged = true;
        }

        let summary = summary.with_duration(started.elapsed());
        tracing::info!(
            user = %user,
            artifacts = summary.total_artifacts(),
            bytes_downloaded = summary.bytes_downloaded(),
            uploaded = summary.uploaded.len(),
            duration_secs = summary.duration.as_secs(),
            "Offboarding completed"
        );
        Ok(summary)
    }

    async fn export_corpus(&self, user: &UserEmail, corpus: Corpus) -> Result<CorpusSummary> {
        let job = self.requester.request_export(user, corpus).await?;
        let manifest = self.poller.await_completion(&job).await?;

        let artifacts = self.locator.list_artifacts(&manifest).await;
        if artifacts.is_empty() {
            tracing::warn!(
                corpus = %corpus,
                export_id = %job.export_id,
                "Export produced no files; nothing to transfer"
            );
        }

        let mut bytes_downloaded = 0;
        for artifact in &artifacts {
            self.shutdown.check("download")?;
            let destination = self.staging.path_for(corpus, &job.export_id, artifact)?;
            bytes_downloaded += self.downloader.download(artifact, &destination).await?;
        }

        Ok(CorpusSummary {
            corpus,
            artifacts: artifacts.len(),
            bytes_downloaded,
            job,
        })
    }

    fn log_plan(&self, user: &UserEmail) {
        for corpus in &self.config.export.corpora {
            tracing::info!(
                corpus = %corpus,
                matter = %requester::matter_name(user, *corpus),
                "Dry run: would export"
            );
        }
        tracing::info!(
            folder = %user,
            staging = %self.staging.root().display(),
            "Dry run: would upload staged files"
        );
    }
}
