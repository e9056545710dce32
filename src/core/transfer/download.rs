//! Streamed artifact download
//!
//! The body is consumed as a stream and re-chunked into fixed-size writes;
//! the object is never held in memory. Each read waits at most the
//! configured download timeout. There is no resume: a failed download
//! removes its partial file and the caller starts over.

use super::ProgressObserver;
use crate::adapters::storage::ObjectStorage;
use crate::config::TransferConfig;
use crate::domain::{ArtifactRef, OffboardError, Result, TransferError};
use bytes::BytesMut;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Downloads artifacts from object storage to local files
pub struct ChunkedDownloader {
    storage: Arc<dyn ObjectStorage>,
    chunk_size: usize,
    read_timeout: Duration,
    progress: Arc<dyn ProgressObserver>,
}

impl ChunkedDownloader {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        config: &TransferConfig,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            storage,
            chunk_size: config.download_chunk_size,
            read_timeout: config.download_timeout(),
            progress,
        }
    }

    /// Streams `artifact` into `destination`, creating parent directories
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`TransferError::HttpStatus`] on a non-2xx response
    /// - [`TransferError::Stream`] when the stream breaks or a read times out
    /// - [`TransferError::Incomplete`] when fewer bytes than the known size arrive
    pub async fn download(&self, artifact: &ArtifactRef, destination: &Path) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                OffboardError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let started = Instant::now();
        match self.stream_to_file(artifact, destination).await {
            Ok(written) => {
                crate::log_transfer_complete!("download", artifact, written, started.elapsed());
                Ok(written)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %destination.display(),
                            error = %remove_err,
                            "Failed to remove partial download"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(&self, artifact: &ArtifactRef, destination: &Path) -> Result<u64> {
        let object = artifact.to_string();
        let stream = tokio::time::timeout(
            self.read_timeout,
            self.storage.open_read(&artifact.bucket, &artifact.object_key),
        )
        .await
        .map_err(|_| stalled(&object, self.read_timeout))??;

        let total = artifact.size_bytes.or(stream.content_length);
        tracing::info!(
            object = %object,
            destination = %destination.display(),
            size = ?total,
            "Downloading artifact"
        );

        let mut file = File::create(destination).await.map_err(|e| {
            OffboardError::Io(format!("Failed to create {}: {}", destination.display(), e))
        })?;
        let mut body = stream.body;
        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        let mut written: u64 = 0;

        loop {
            let next = tokio::time::timeout(self.read_timeout, body.next())
                .await
                .map_err(|_| stalled(&object, self.read_timeout))?;

            let Some(chunk) = next else { break };
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }

            buffer.extend_from_slice(&chunk);
            while buffer.len() >= self.chunk_size {
                let block = buffer.split_to(self.chunk_size);
                written += self.write_block(&mut file, &block, &object, written, total).await?;
            }
        }

        if !buffer.is_empty() {
            let block = buffer.split();
            written += self.write_block(&mut file, &block, &object, written, total).await?;
        }
        file.flush().await?;

        if let Some(expected) = artifact.size_bytes {
            if written != expected {
                return Err(TransferError::Incomplete {
                    object,
                    expected,
                    received: written,
                }
                .into());
            }
        }

        Ok(written)
    }

    async fn write_block(
        &self,
        file: &mut File,
        block: &[u8],
        object: &str,
        written_before: u64,
        total: Option<u64>,
    ) -> Result<u64> {
        file.write_all(block).await?;
        let delta = block.len() as u64;
        self.progress
            .download_chunk(object, delta, written_before + delta, total);
        Ok(delta)
    }
}

fn stalled(object: &str, timeout: Duration) -> OffboardError {
    TransferError::Stream {
        object: object.to_string(),
        message: format!("no data received for {}s", timeout.as_secs()),
    }
    .into()
}
