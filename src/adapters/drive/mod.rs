//! Retention store integration
//!
//! Staged artifacts are re-uploaded into a folder of the retention user's
//! document store. Uploads use the resumable protocol: the store hands out a
//! [`ResumableUpload`] session that the uploader advances one chunk at a
//! time.

pub mod client;
pub mod resumable;

pub use client::DriveClient;
pub use resumable::DriveResumableUpload;

use crate::domain::{FolderId, ItemId, Result, UploadProgress};
use async_trait::async_trait;
use std::path::PathBuf;

/// Parameters of one resumable create-with-media call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub local_path: PathBuf,
    /// Name of the created item
    pub name: String,
    pub parent: FolderId,
    /// Absent when the type could not be guessed
    pub mime_type: Option<String>,
    /// Bytes per chunk; a multiple of the store's chunk granularity
    pub chunk_size: usize,
}

/// Result of advancing an upload session by one chunk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkOutcome {
    /// Cumulative progress reported by the service after this chunk
    pub progress: Option<UploadProgress>,
    /// Id of the created item, set once the upload has finished
    pub response: Option<ItemId>,
}

/// One open resumable upload session
#[async_trait]
pub trait ResumableUpload: Send {
    /// Size of the file being uploaded
    fn total_bytes(&self) -> u64;

    /// Sends the next chunk
    async fn next_chunk(&mut self) -> Result<ChunkOutcome>;
}

/// Document/retention store
#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// Returns the id of the folder called `name`, creating it when absent
    async fn find_or_create_folder(&self, name: &str) -> Result<FolderId>;

    /// Opens a resumable upload session for `request`
    async fn start_resumable_upload(
        &self,
        request: UploadRequest,
    ) -> Result<Box<dyn ResumableUpload>>;
}
