//! Export acquisition: request, await, locate
//!
//! - [`requester::ExportRequester`] creates a matter and an export job
//! - [`poller::ExportPoller`] waits for the job to finish and returns its manifest
//! - [`locator::ArtifactLocator`] resolves manifest entries to sized artifacts

pub mod locator;
pub mod poller;
pub mod requester;

pub use locator::ArtifactLocator;
pub use poller::ExportPoller;
pub use requester::ExportRequester;
