//! Transfer progress reporting

use crate::domain::UploadProgress;

/// Receives progress events from the downloader and uploader
pub trait ProgressObserver: Send + Sync {
    /// One chunk of `delta` bytes was written to disk
    ///
    /// `total` is `None` when neither the artifact nor the response carried
    /// a size; observers then report counts only.
    fn download_chunk(&self, object: &str, delta: u64, downloaded: u64, total: Option<u64>);

    /// The service acknowledged more of an upload
    fn upload_progress(&self, name: &str, progress: UploadProgress);
}

/// Logs progress as `tracing` debug events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn download_chunk(&self, object: &str, delta: u64, downloaded: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => tracing::debug!(
                object,
                delta,
                downloaded,
                total,
                percent = %format!("{:.1}", downloaded as f64 * 100.0 / total as f64),
                "Download progress"
            ),
            _ => tracing::debug!(object, delta, downloaded, "Download progress"),
        }
    }

    fn upload_progress(&self, name: &str, progress: UploadProgress) {
        tracing::debug!(
            name,
            bytes_sent = progress.bytes_sent,
            total = progress.total_bytes,
            percent = %format!("{:.1}", progress.percent()),
            "Upload progress"
        );
    }
}

/// Discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn download_chunk(&self, _object: &str, _delta: u64, _downloaded: u64, _total: Option<u64>) {}

    fn upload_progress(&self, _name: &str, _progress: UploadProgress) {}
}
