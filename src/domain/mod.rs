//! Domain models and types for offboard.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`UserEmail`], [`MatterId`], [`ExportId`], [`FolderId`])
//! - **Export models** ([`ExportJob`], [`ExportStatus`], [`Manifest`], [`ArtifactRef`])
//! - **License models** ([`LicenseAssignment`])
//! - **Transfer progress** ([`UploadProgress`])
//! - **Error types** ([`OffboardError`], [`TransferError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, OffboardError>`]:
//!
//! ```rust
//! use offboard::domain::{OffboardError, Result, UserEmail};
//!
//! fn parse_user(raw: &str) -> Result<UserEmail> {
//!     UserEmail::new(raw).map_err(OffboardError::Validation)
//! }
//! ```

pub mod errors;
pub mod export;
pub mod ids;
pub mod license;
pub mod result;
pub mod transfer;

pub use errors::{OffboardError, TransferError};
pub use export::{
    monitor_url, ArtifactRef, Corpus, ExportJob, ExportSnapshot, ExportStatus, Manifest,
    ManifestFile,
};
pub use ids::{ExportId, FolderId, ItemId, MatterId, UserEmail};
pub use license::{LicenseAssignment, LicenseReconciliation, LicenseRevocation};
pub use result::Result;
pub use transfer::UploadProgress;
