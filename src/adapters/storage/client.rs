//! Cloud Storage JSON API client

use super::{ObjectStorage, ObjectStream};
use crate::adapters::http::{connection_error, opt_u64, segment, send_json, AuthorizedClient};
use crate::domain::{OffboardError, Result, TransferError};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde::Deserialize;

const SERVICE: &str = "Storage";

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(default, deserialize_with = "opt_u64::deserialize")]
    size: Option<u64>,
}

/// Object storage backed by `storage.googleapis.com`
///
/// Metadata lookups go through a client with a total request timeout; media
/// reads use a streaming client whose stalls are bounded by the downloader.
pub struct StorageClient {
    metadata: AuthorizedClient,
    media: AuthorizedClient,
    base_url: String,
}

impl StorageClient {
    pub fn new(
        metadata: AuthorizedClient,
        media: AuthorizedClient,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            media,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            segment(bucket),
            segment(key)
        )
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn object_size(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        let url = self.object_url(bucket, key);
        let request = self.metadata.request(Method::GET, &url).await?;
        let metadata: ObjectMetadata = send_json(SERVICE, request).await?;
        Ok(metadata.size)
    }

    async fn open_read(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        let url = format!("{}?alt=media", self.object_url(bucket, key));
        let object = format!("{bucket}/{key}");

        let response = self
            .media
            .request(Method::GET, &url)
            .await?
            .send()
            .await
            .map_err(|e| connection_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::HttpStatus {
                object,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map_err(move |e| -> OffboardError {
                TransferError::Stream {
                    object: object.clone(),
                    message: e.to_string(),
                }
                .into()
            })
            .boxed();

        Ok(ObjectStream {
            content_length,
            body,
        })
    }
}
