//! Export job, status and artifact models

use super::ids::{ExportId, MatterId, UserEmail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data corpus an export job covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    /// Mailbox contents
    Mail,
    /// File-store contents
    Files,
}

impl Corpus {
    /// All corpora in pipeline order
    pub const ALL: [Corpus; 2] = [Corpus::Mail, Corpus::Files];

    /// Name the export service uses for this corpus
    pub fn wire_name(&self) -> &'static str {
        match self {
            Corpus::Mail => "MAIL",
            Corpus::Files => "DRIVE",
        }
    }

    /// Directory name used inside the staging area
    pub fn staging_name(&self) -> &'static str {
        match self {
            Corpus::Mail => "mail",
            Corpus::Files => "files",
        }
    }

    /// Prefix used for matter and export names
    pub fn display_prefix(&self) -> &'static str {
        match self {
            Corpus::Mail => "Gmail",
            Corpus::Files => "Drive",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Corpus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mail" => Ok(Corpus::Mail),
            "files" | "drive" => Ok(Corpus::Files),
            other => Err(format!(
                "Unknown corpus '{other}'. Must be one of: mail, files"
            )),
        }
    }
}

/// Handle to a created export job
///
/// Immutable once created; the poller only borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    pub matter_id: MatterId,
    pub export_id: ExportId,
    pub corpus: Corpus,
    pub user: UserEmail,
    pub created_at: DateTime<Utc>,
}

impl ExportJob {
    /// Console URL where an operator can watch the export
    pub fn monitor_url(&self) -> String {
        monitor_url(&self.matter_id)
    }
}

/// Console URL listing the exports of `matter_id`
pub fn monitor_url(matter_id: &MatterId) -> String {
    format!(
        "https://vault.google.com/matter/{}/exports",
        matter_id.as_str()
    )
}

/// Export status as read on one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Pending,
    InProgress,
    Completed,
    /// Any other status, kept verbatim
    Other(String),
}

impl ExportStatus {
    /// Parses the status string reported by the export service
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("PENDING") => ExportStatus::Pending,
            Some("IN_PROGRESS") => ExportStatus::InProgress,
            Some("COMPLETED") => ExportStatus::Completed,
            Some(other) => ExportStatus::Other(other.to_string()),
            None => ExportStatus::Other("UNKNOWN".to_string()),
        }
    }

    /// Whether the job is still running
    pub fn is_running(&self) -> bool {
        matches!(self, ExportStatus::Pending | ExportStatus::InProgress)
    }

    /// Status as the service spells it
    pub fn as_str(&self) -> &str {
        match self {
            ExportStatus::Pending => "PENDING",
            ExportStatus::InProgress => "IN_PROGRESS",
            ExportStatus::Completed => "COMPLETED",
            ExportStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file listed in a completed export's storage sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub bucket_name: String,
    pub object_name: String,
    /// Size reported by the export service, if any
    pub size: Option<u64>,
}

/// Files produced by a completed export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<ManifestFile>,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Export state returned by one status fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSnapshot {
    pub status: ExportStatus,
    pub manifest: Manifest,
}

/// Concrete object-storage location of one export artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub bucket: String,
    pub object_key: String,
    /// Authoritative size when known. Best effort.
    pub size_bytes: Option<u64>,
}

impl ArtifactRef {
    pub fn new(bucket: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object_key: object_key.into(),
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    /// Final path segment of the object key
    pub fn file_name(&self) -> &str {
        self.object_key
            .rsplit('/')
            .next()
            .unwrap_or(&self.object_key)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.object_key)
    }
}
