//! Offboarding pipeline: orchestration, staging and the run summary

pub mod orchestrator;
pub mod staging;
pub mod summary;

pub use orchestrator::Orchestrator;
pub use staging::StagingArea;
pub use summary::{CorpusSummary, OffboardingSummary, UploadedItem};
