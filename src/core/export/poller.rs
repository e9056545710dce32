//! Export completion polling
//!
//! PENDING and IN_PROGRESS re-poll after a fixed interval. COMPLETED waits a
//! settle delay so the storage manifest is final, then fetches the export
//! once more and returns that manifest. Any other status is terminal.

use crate::adapters::vault::ExportService;
use crate::config::ExportConfig;
use crate::core::shutdown::ShutdownSignal;
use crate::domain::{ExportJob, ExportStatus, Manifest, OffboardError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Waits for export jobs to finish
pub struct ExportPoller {
    service: Arc<dyn ExportService>,
    poll_interval: Duration,
    settle_delay: Duration,
    max_attempts: Option<u32>,
    shutdown: ShutdownSignal,
}

impl ExportPoller {
    pub fn new(service: Arc<dyn ExportService>, config: &ExportConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            service,
            poll_interval: config.poll_interval(),
            settle_delay: config.settle_delay(),
            max_attempts: config.max_poll_attempts,
            shutdown,
        }
    }

    /// Polls `job` until it reaches a terminal status
    ///
    /// # Errors
    ///
    /// - [`OffboardError::ExportFailed`] on a terminal status other than
    ///   COMPLETED, carrying the raw status
    /// - [`OffboardError::PollTimeout`] when `max_poll_attempts` polls all
    ///   saw a running job
    /// - [`OffboardError::Cancelled`] when shutdown interrupts a wait
    /// - any transport error from a single poll, unretried
    pub async fn await_completion(&self, job: &ExportJob) -> Result<Manifest> {
        let mut attempts: u32 = 0;

        loop {
            let snapshot = self.service.get_export(&job.matter_id, &job.export_id).await?;
            attempts += 1;

            match snapshot.status {
                ExportStatus::Completed => break,
                status if status.is_running() => {
                    tracing::info!(
                        corpus = %job.corpus,
                        export_id = %job.export_id,
                        status = %status,
                        attempt = attempts,
                        "Export still running"
                    );

                    if let Some(max) = self.max_attempts {
                        if attempts >= max {
                            return Err(OffboardError::PollTimeout {
                                matter_id: job.matter_id.to_string(),
                                export_id: job.export_id.to_string(),
                                attempts,
                            });
                        }
                    }

                    self.shutdown.sleep(self.poll_interval, "export poll").await?;
                }
                status => return Err(failed(job, status)),
            }
        }

        tracing::info!(
            corpus = %job.corpus,
            export_id = %job.export_id,
            settle_secs = self.settle_delay.as_secs(),
            "Export completed, waiting for manifest to settle"
        );
        self.shutdown.sleep(self.settle_delay, "manifest settle").await?;

        let snapshot = self.service.get_export(&job.matter_id, &job.export_id).await?;
        if snapshot.status != ExportStatus::Completed {
            return Err(failed(job, snapshot.status));
        }

        tracing::info!(
            corpus = %job.corpus,
            export_id = %job.export_id,
            files = snapshot.manifest.files.len(),
            "Export manifest ready"
        );
        Ok(snapshot.manifest)
    }
}

fn failed(job: &ExportJob, status: ExportStatus) -> OffboardError {
    tracing::error!(
        corpus = %job.corpus,
        matter_id = %job.matter_id,
        export_id = %job.export_id,
        status = %status,
        "Export ended in a non-success state"
    );
    OffboardError::ExportFailed {
        matter_id: job.matter_id.to_string(),
        export_id: job.export_id.to_string(),
        status: status.as_str().to_string(),
    }
}
