//! Drive v3 REST client

use super::resumable::DriveResumableUpload;
use super::{ResumableUpload, RetentionStore, UploadRequest};
use crate::adapters::http::{send_checked, send_json, AuthorizedClient};
use crate::domain::{FolderId, OffboardError, Result};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Method;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "Drive";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

/// Escapes a literal for a Drive `q` expression
fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Retention store backed by the Drive v3 API
pub struct DriveClient {
    client: AuthorizedClient,
    upload_client: AuthorizedClient,
    base_url: String,
    upload_base_url: String,
}

impl DriveClient {
    /// Creates a client
    ///
    /// `upload_client` carries the chunk PUTs and must not follow redirects.
    pub fn new(
        client: AuthorizedClient,
        upload_client: AuthorizedClient,
        base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            upload_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn find_folder(&self, name: &str) -> Result<Option<FolderId>> {
        let query = format!(
            "name = {} and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false",
            quote_literal(name)
        );
        let url = format!("{}/drive/v3/files", self.base_url);
        let request = self.client.request(Method::GET, &url).await?.query(&[
            ("q", query.as_str()),
            ("spaces", "drive"),
            ("fields", "files(id,name)"),
        ]);

        let list: FileList = send_json(SERVICE, request).await?;
        list.files
            .into_iter()
            .next()
            .map(|entry| FolderId::new(entry.id).map_err(OffboardError::Serialization))
            .transpose()
    }

    async fn create_folder(&self, name: &str) -> Result<FolderId> {
        let url = format!("{}/drive/v3/files", self.base_url);
        let request = self
            .client
            .request(Method::POST, &url)
            .await?
            .query(&[("fields", "id")])
            .json(&FileMetadata {
                name,
                mime_type: Some(FOLDER_MIME_TYPE),
                parents: Vec::new(),
            });

        let entry: FileEntry = send_json(SERVICE, request).await?;
        FolderId::new(entry.id).map_err(OffboardError::Serialization)
    }
}

#[async_trait]
impl RetentionStore for DriveClient {
    async fn find_or_create_folder(&self, name: &str) -> Result<FolderId> {
        if let Some(folder) = self.find_folder(name).await? {
            tracing::debug!(folder = name, folder_id = %folder, "Using existing retention folder");
            return Ok(folder);
        }

        let folder = self.create_folder(name).await?;
        tracing::info!(folder = name, folder_id = %folder, "Created retention folder");
        Ok(folder)
    }

    async fn start_resumable_upload(
        &self,
        request: UploadRequest,
    ) -> Result<Box<dyn ResumableUpload>> {
        let file = tokio::fs::File::open(&request.local_path).await.map_err(|e| {
            OffboardError::Io(format!(
                "Failed to open {} for upload: {}",
                request.local_path.display(),
                e
            ))
        })?;
        let total_bytes = file.metadata().await?.len();

        let url = format!("{}/drive/v3/files", self.upload_base_url);
        let mut http_request = self
            .upload_client
            .request(Method::POST, &url)
            .await?
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .header("X-Upload-Content-Length", total_bytes)
            .json(&FileMetadata {
                name: &request.name,
                mime_type: request.mime_type.as_deref(),
                parents: vec![request.parent.as_str()],
            });
        if let Some(mime_type) = &request.mime_type {
            http_request = http_request.header("X-Upload-Content-Type", mime_type);
        }

        let response = send_checked(SERVICE, http_request).await?;
        let session_uri = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                OffboardError::Serialization(format!(
                    "{SERVICE} did not return an upload session for {}",
                    request.name
                ))
            })?;

        tracing::debug!(
            name = %request.name,
            total_bytes,
            chunk_size = request.chunk_size,
            "Opened resumable upload session"
        );

        Ok(Box::new(DriveResumableUpload::new(
            self.upload_client.clone(),
            session_uri,
            file,
            request.name,
            total_bytes,
            request.chunk_size,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::StaticTokenProvider;
    use crate::adapters::http::{build_client, build_streaming_client};
    use crate::config::secret_string;
    use mockito::Matcher;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(base_url: &str) -> DriveClient {
        let tokens = Arc::new(StaticTokenProvider::new(secret_string("t0k".to_string())));
        let api = AuthorizedClient::new(build_client(Duration::from_secs(5)).unwrap(), tokens.clone());
        let upload = AuthorizedClient::new(build_streaming_client().unwrap(), tokens);
        DriveClient::new(api, upload, base_url, format!("{base_url}/upload"))
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("a@x.com"), "'a@x.com'");
        assert_eq!(quote_literal("o'brien"), r"'o\'brien'");
        assert_eq!(quote_literal(r"back\slash"), r"'back\\slash'");
    }

    #[tokio::test]
    async fn test_find_existing_folder() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                format!("name = 'a@x.com' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false"),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files": [{"id": "f-1", "name": "a@x.com"}]}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let folder = client(&server.url()).find_or_create_folder("a@x.com").await.unwrap();
        assert_eq!(folder.as_str(), "f-1");
        list.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_missing_folder() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files": []}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(serde_json::json!({
                "name": "a@x.com",
                "mimeType": FOLDER_MIME_TYPE
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "f-new"}"#)
            .create_async()
            .await;

        let folder = client(&server.url()).find_or_create_folder("a@x.com").await.unwrap();
        assert_eq!(folder.as_str(), "f-new");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_resumable_upload_reads_session_uri() {
        let mut server = mockito::Server::new_async().await;
        let session_uri = format!("{}/session/abc", server.url());
        let start = server
            .mock("POST", "/upload/drive/v3/files")
            .match_query(Matcher::UrlEncoded("uploadType".into(), "resumable".into()))
            .match_header("x-upload-content-length", "5")
            .match_header("x-upload-content-type", "text/plain")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "notes.txt",
                "parents": ["f-1"]
            })))
            .with_status(200)
            .with_header("location", &session_uri)
            .create_async()
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let session = client(&server.url())
            .start_resumable_upload(UploadRequest {
                local_path: file.path().to_path_buf(),
                name: "notes.txt".to_string(),
                parent: FolderId::new("f-1").unwrap(),
                mime_type: Some("text/plain".to_string()),
                chunk_size: 256 * 1024,
            })
            .await
            .unwrap();

        assert_eq!(session.total_bytes(), 5);
        start.assert_async().await;
    }
}
