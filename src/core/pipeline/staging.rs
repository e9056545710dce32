//! Local staging directory
//!
//! Downloads land at `<root>/<corpus>/<export id>/<file name>`, so artifacts
//! from different corpora or jobs never overwrite each other. The staging
//! area only touches paths under its root.

use crate::domain::{ArtifactRef, Corpus, ExportId, OffboardError, Result};
use std::path::{Path, PathBuf};

/// Staging directory owned by one run
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for one artifact of an export
    ///
    /// # Errors
    ///
    /// Returns a validation error when the object key has no usable final
    /// segment (empty, `.` or `..`).
    pub fn path_for(
        &self,
        corpus: Corpus,
        export_id: &ExportId,
        artifact: &ArtifactRef,
    ) -> Result<PathBuf> {
        let file_name = artifact.file_name();
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return Err(OffboardError::Validation(format!(
                "Artifact {artifact} has no usable file name"
            )));
        }

        Ok(self
            .root
            .join(corpus.staging_name())
            .join(sanitize_component(export_id.as_str()))
            .join(sanitize_component(file_name)))
    }

    /// Every regular file under the root, recursively, in path order
    ///
    /// A missing root yields an empty list.
    pub async fn staged_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if !path_exists(&self.root).await? {
            return Ok(files);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                OffboardError::Io(format!("Failed to list {}: {}", dir.display(), e))
            })?;

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Removes everything under the root, keeping the root itself
    ///
    /// A missing root is a no-op. Removal continues past individual
    /// failures, which are reported together at the end.
    pub async fn purge(&self) -> Result<()> {
        if !path_exists(&self.root).await? {
            tracing::debug!(path = %self.root.display(), "Staging directory absent, nothing to purge");
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            OffboardError::Io(format!("Failed to list {}: {}", self.root.display(), e))
        })?;

        let mut removed = 0usize;
        let mut failures = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            let result = if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged entry");
                    failures.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(OffboardError::Io(format!(
                "Failed to purge staging directory: {}",
                failures.join("; ")
            )));
        }

        tracing::info!(path = %self.root.display(), entries = removed, "Staging directory purged");
        Ok(())
    }
}

async fn path_exists(path: &Path) -> Result<bool> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OffboardError::Io(format!("Failed to stat {}: {}", path.display(), e))),
    }
}

/// Replaces characters that would escape or split a path component
fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
