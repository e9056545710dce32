//! Resumable upload session driver
//!
//! Each call to [`ResumableUpload::next_chunk`] sends one `Content-Range`
//! PUT to the session URI. The service answers `308 Resume Incomplete` with a
//! `Range: bytes=0-N` header while more data is expected, and `200`/`201`
//! with the created file once the last byte has been committed. The next
//! chunk always starts at the offset the service acknowledged, so a chunk the
//! service only partly accepted is re-sent from there.

use super::{ChunkOutcome, ResumableUpload};
use crate::adapters::http::{connection_error, AuthorizedClient};
use crate::domain::{ItemId, OffboardError, Result, TransferError, UploadProgress};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const SERVICE: &str = "Drive";
const RESUME_INCOMPLETE: u16 = 308;

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Parses the acknowledged byte count from a `Range: bytes=0-N` header
fn acknowledged_bytes(range: Option<&str>) -> Option<u64> {
    let (_, end) = range?.strip_prefix("bytes=")?.split_once('-')?;
    end.trim().parse::<u64>().ok().map(|last| last + 1)
}

/// Formats the `Content-Range` header of a chunk starting at `offset`
fn content_range(offset: u64, len: u64, total: u64) -> String {
    if len == 0 {
        format!("bytes */{total}")
    } else {
        format!("bytes {}-{}/{}", offset, offset + len - 1, total)
    }
}

/// Resumable upload of one local file to a Drive session URI
pub struct DriveResumableUpload {
    client: AuthorizedClient,
    session_uri: String,
    file: File,
    name: String,
    total_bytes: u64,
    chunk_size: usize,
    /// Bytes the service has acknowledged so far
    committed: u64,
}

impl DriveResumableUpload {
    pub fn new(
        client: AuthorizedClient,
        session_uri: String,
        file: File,
        name: String,
        total_bytes: u64,
        chunk_size: usize,
    ) -> Self {
        Self {
            client,
            session_uri,
            file,
            name,
            total_bytes,
            chunk_size,
            committed: 0,
        }
    }

    async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(self.committed)).await?;
        let remaining = self.total_bytes.saturating_sub(self.committed);
        let len = remaining.min(self.chunk_size as u64);

        let mut buffer = Vec::with_capacity(len as usize);
        (&mut self.file).take(len).read_to_end(&mut buffer).await?;
        Ok(buffer)
    }

    fn progress(&self) -> UploadProgress {
        UploadProgress {
            bytes_sent: self.committed,
            total_bytes: self.total_bytes,
        }
    }
}

#[async_trait]
impl ResumableUpload for DriveResumableUpload {
    fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    async fn next_chunk(&mut self) -> Result<ChunkOutcome> {
        let chunk = self.read_chunk().await?;
        let len = chunk.len() as u64;

        let response = self
            .client
            .request(Method::PUT, &self.session_uri)
            .await?
            .header(CONTENT_LENGTH, len)
            .header(CONTENT_RANGE, content_range(self.committed, len, self.total_bytes))
            .body(chunk)
            .send()
            .await
            .map_err(|e| connection_error(SERVICE, e))?;

        let status = response.status();
        if status.as_u16() == RESUME_INCOMPLETE {
            let range = response.headers().get(RANGE).and_then(|v| v.to_str().ok());
            let acknowledged = acknowledged_bytes(range).unwrap_or(0);
            self.committed = acknowledged.min(self.total_bytes);

            tracing::trace!(
                name = %self.name,
                bytes_sent = self.committed,
                total_bytes = self.total_bytes,
                "Chunk acknowledged"
            );

            return Ok(ChunkOutcome {
                progress: Some(self.progress()),
                response: None,
            });
        }

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let created: CreatedFile = response.json().await.map_err(|e| {
                OffboardError::Serialization(format!(
                    "{SERVICE} returned an unexpected upload response for {}: {e}",
                    self.name
                ))
            })?;
            self.committed = self.total_bytes;
            let item = ItemId::new(created.id).map_err(OffboardError::Serialization)?;

            return Ok(ChunkOutcome {
                progress: Some(self.progress()),
                response: Some(item),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransferError::HttpStatus {
            object: self.name.clone(),
            status: status.as_u16(),
            body,
        }
        .into())
    }
}
