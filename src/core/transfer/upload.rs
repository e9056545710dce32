//! Resumable upload into the retention store
//!
//! Progress follows the service-reported cumulative byte count, not a local
//! chunk count, since the service may retry a chunk internally. Chunk
//! failures are not retried here.

use super::ProgressObserver;
use crate::adapters::drive::{RetentionStore, UploadRequest};
use crate::config::TransferConfig;
use crate::domain::{FolderId, ItemId, OffboardError, Result, TransferError, UploadProgress};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Uploads local files through resumable sessions
pub struct ChunkedUploader {
    store: Arc<dyn RetentionStore>,
    chunk_size: usize,
    max_stalled_chunks: u32,
    progress: Arc<dyn ProgressObserver>,
}

impl ChunkedUploader {
    pub fn new(
        store: Arc<dyn RetentionStore>,
        config: &TransferConfig,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            store,
            chunk_size: config.upload_chunk_size,
            max_stalled_chunks: config.max_stalled_chunks,
            progress,
        }
    }

    /// Uploads `local_path` into `folder` under its file name
    ///
    /// Returns the id of the created item.
    ///
    /// # Errors
    ///
    /// Chunk-level failures propagate unretried.
    /// [`TransferError::NoFinalResponse`] is raised after
    /// `max_stalled_chunks` answers in a row without progress or a created
    /// item.
    pub async fn upload(&self, local_path: &Path, folder: &FolderId) -> Result<ItemId> {
        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                OffboardError::Validation(format!(
                    "Cannot upload {}: no usable file name",
                    local_path.display()
                ))
            })?;
        let mime_type = mime_guess::from_path(local_path)
            .first()
            .map(|m| m.essence_str().to_string());

        let started = Instant::now();
        let mut session = self
            .store
            .start_resumable_upload(UploadRequest {
                local_path: local_path.to_path_buf(),
                name: name.clone(),
                parent: folder.clone(),
                mime_type: mime_type.clone(),
                chunk_size: self.chunk_size,
            })
            .await?;
        let total = session.total_bytes();

        tracing::info!(
            path = %local_path.display(),
            folder_id = %folder,
            mime_type = ?mime_type,
            total_bytes = total,
            "Uploading file"
        );

        let mut reported: u64 = 0;
        let mut stalled: u32 = 0;

        loop {
            let outcome = session.next_chunk().await?;

            let mut advanced = false;
            if let Some(progress) = outcome.progress {
                let bytes_sent = progress.bytes_sent.min(total).max(reported);
                if bytes_sent > reported {
                    reported = bytes_sent;
                    advanced = true;
                    self.progress.upload_progress(
                        &name,
                        UploadProgress {
                            bytes_sent,
                            total_bytes: total,
                        },
                    );
                }
            }

            if let Some(item) = outcome.response {
                if reported < total {
                    self.progress.upload_progress(
                        &name,
                        UploadProgress {
                            bytes_sent: total,
                            total_bytes: total,
                        },
                    );
                }
                crate::log_transfer_complete!("upload", local_path.display(), total, started.elapsed());
                tracing::info!(name = %name, item_id = %item, "File uploaded");
                return Ok(item);
            }

            if advanced {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.max_stalled_chunks {
                    return Err(TransferError::NoFinalResponse { object: name }.into());
                }
            }
        }
    }
}
