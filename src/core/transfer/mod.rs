//! Chunked transfers between object storage, local disk and the retention store

pub mod download;
pub mod progress;
pub mod upload;

pub use download::ChunkedDownloader;
pub use progress::{NoProgress, ProgressObserver, TracingProgress};
pub use upload::ChunkedUploader;
