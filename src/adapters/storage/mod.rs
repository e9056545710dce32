//! Object storage integration
//!
//! Export artifacts live in the export service's storage bucket. The core
//! reads them through [`ObjectStorage`] as a byte stream and never buffers a
//! whole object.

pub mod client;

pub use client::StorageClient;

use crate::domain::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// An open streamed read of one object
pub struct ObjectStream {
    /// `Content-Length` of the response, when sent
    pub content_length: Option<u64>,
    /// Body chunks as they arrive; the stream ends when the transport closes
    pub body: BoxStream<'static, Result<Bytes>>,
}

/// Object storage
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Authoritative size from the object's metadata
    ///
    /// `Ok(None)` means the metadata carries no size.
    async fn object_size(&self, bucket: &str, key: &str) -> Result<Option<u64>>;

    /// Opens a streamed read of the object's media
    ///
    /// A non-2xx response fails with
    /// [`crate::domain::TransferError::HttpStatus`].
    async fn open_read(&self, bucket: &str, key: &str) -> Result<ObjectStream>;
}
