//! Resolves manifest entries to storage artifacts

use crate::adapters::storage::ObjectStorage;
use crate::domain::{ArtifactRef, Manifest};
use std::sync::Arc;

/// Turns an export manifest into downloadable artifact references
pub struct ArtifactLocator {
    storage: Arc<dyn ObjectStorage>,
}

impl ArtifactLocator {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Lists the artifacts of `manifest`, in manifest order
    ///
    /// Sizes come from object metadata. A failed lookup falls back to the
    /// size the manifest reported, and otherwise leaves the size unknown.
    /// An empty manifest yields an empty list.
    pub async fn list_artifacts(&self, manifest: &Manifest) -> Vec<ArtifactRef> {
        let mut artifacts = Vec::with_capacity(manifest.files.len());

        for file in &manifest.files {
            let mut artifact = ArtifactRef::new(&file.bucket_name, &file.object_name);

            match self
                .storage
                .object_size(&file.bucket_name, &file.object_name)
                .await
            {
                Ok(Some(size)) => artifact = artifact.with_size(size),
                Ok(None) => {
                    artifact.size_bytes = file.size;
                }
                Err(e) => {
                    tracing::warn!(
                        bucket = %file.bucket_name,
                        object = %file.object_name,
                        manifest_size = ?file.size,
                        error = %e,
                        "Metadata lookup failed, using manifest size"
                    );
                    artifact.size_bytes = file.size;
                }
            }

            artifacts.push(artifact);
        }

        artifacts
    }
}
