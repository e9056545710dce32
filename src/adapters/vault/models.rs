//! Wire models for the eDiscovery REST API

use crate::adapters::http::opt_u64;
use crate::domain::{ExportSnapshot, ExportStatus, Manifest, ManifestFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatterBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub state: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatterResponse {
    pub matter_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportBody<'a> {
    pub name: &'a str,
    pub query: Query<'a>,
    pub export_options: ExportOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Query<'a> {
    pub corpus: &'static str,
    pub data_scope: &'static str,
    pub search_method: &'static str,
    pub account_info: AccountInfo<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_options: Option<DriveQueryOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountInfo<'a> {
    pub emails: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveQueryOptions {
    pub include_shared_drives: bool,
    pub include_team_drives: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_options: Option<MailExportOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_options: Option<DriveExportOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MailExportOptions {
    pub export_format: &'static str,
    pub use_new_export: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveExportOptions {
    pub include_access_info: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cloud_storage_sink: Option<CloudStorageSink>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CloudStorageSink {
    #[serde(default)]
    pub files: Vec<CloudStorageFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CloudStorageFile {
    pub bucket_name: String,
    pub object_name: String,
    #[serde(default, deserialize_with = "opt_u64::deserialize")]
    pub size: Option<u64>,
}

impl From<ExportResponse> for ExportSnapshot {
    fn from(response: ExportResponse) -> Self {
        let files = response
            .cloud_storage_sink
            .unwrap_or_default()
            .files
            .into_iter()
            .map(|f| ManifestFile {
                bucket_name: f.bucket_name,
                object_name: f.object_name,
                size: f.size,
            })
            .collect();

        ExportSnapshot {
            status: ExportStatus::parse(response.status.as_deref()),
            manifest: Manifest { files },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_export_converts_to_snapshot() {
        let json = r#"{
            "id": "exportly-1",
            "matterId": "m-1",
            "status": "COMPLETED",
            "cloudStorageSink": {
                "files": [
                    {"bucketName": "b1", "objectName": "exp/a.mbox", "size": "1000", "md5Hash": "abc"}
                ]
            }
        }"#;
        let response: ExportResponse = serde_json::from_str(json).unwrap();
        let snapshot = ExportSnapshot::from(response);
        assert_eq!(snapshot.status, ExportStatus::Completed);
        assert_eq!(snapshot.manifest.files.len(), 1);
        assert_eq!(snapshot.manifest.files[0].bucket_name, "b1");
        assert_eq!(snapshot.manifest.files[0].size, Some(1000));
    }

    #[test]
    fn test_running_export_has_empty_manifest() {
        let response: ExportResponse =
            serde_json::from_str(r#"{"id": "e", "status": "IN_PROGRESS"}"#).unwrap();
        let snapshot = ExportSnapshot::from(response);
        assert_eq!(snapshot.status, ExportStatus::InProgress);
        assert!(snapshot.manifest.is_empty());
    }
}
