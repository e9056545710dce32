//! In-memory collaborators for unit tests

use crate::adapters::drive::{ChunkOutcome, ResumableUpload, RetentionStore, UploadRequest};
use crate::adapters::licensing::LicenseDirectory;
use crate::adapters::storage::{ObjectStorage, ObjectStream};
use crate::adapters::vault::{ExportRequest, ExportService};
use crate::core::transfer::ProgressObserver;
use crate::domain::{
    ExportId, ExportSnapshot, ExportStatus, FolderId, ItemId, LicenseAssignment, Manifest,
    ManifestFile, MatterId, OffboardError, Result, TransferError, UploadProgress,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub fn snapshot(status: &str, manifest: Manifest) -> ExportSnapshot {
    ExportSnapshot {
        status: ExportStatus::parse(Some(status)),
        manifest,
    }
}

pub fn completed_manifest(bucket: &str, object: &str, size: Option<u64>) -> Manifest {
    Manifest {
        files: vec![ManifestFile {
            bucket_name: bucket.to_string(),
            object_name: object.to_string(),
            size,
        }],
    }
}

/// Export service replaying a scripted status sequence; the last entry repeats
#[derive(Default)]
pub struct FakeExportService {
    snapshots: Mutex<VecDeque<ExportSnapshot>>,
    matters: Mutex<Vec<String>>,
    export_requests: Mutex<Vec<(MatterId, ExportRequest)>>,
    get_calls: Mutex<u32>,
    fail_create_export: bool,
    fail_get_export: bool,
}

impl FakeExportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(self, snapshots: Vec<ExportSnapshot>) -> Self {
        *self.snapshots.lock().unwrap() = snapshots.into();
        self
    }

    pub fn failing_create_export(mut self) -> Self {
        self.fail_create_export = true;
        self
    }

    pub fn failing_get_export(mut self) -> Self {
        self.fail_get_export = true;
        self
    }

    pub fn matters(&self) -> Vec<String> {
        self.matters.lock().unwrap().clone()
    }

    pub fn export_requests(&self) -> Vec<(MatterId, ExportRequest)> {
        self.export_requests.lock().unwrap().clone()
    }

    pub fn get_export_calls(&self) -> u32 {
        *self.get_calls.lock().unwrap()
    }
}

#[async_trait]
impl ExportService for FakeExportService {
    async fn create_matter(&self, name: &str, _description: &str) -> Result<MatterId> {
        let mut matters = self.matters.lock().unwrap();
        matters.push(name.to_string());
        MatterId::new(format!("m-{}", matters.len())).map_err(OffboardError::Validation)
    }

    async fn create_export(&self, matter: &MatterId, request: &ExportRequest) -> Result<ExportId> {
        let mut requests = self.export_requests.lock().unwrap();
        requests.push((matter.clone(), request.clone()));
        if self.fail_create_export {
            return Err(OffboardError::Service {
                service: "Vault",
                status: 429,
                message: "quota exceeded".to_string(),
            });
        }
        ExportId::new(format!("e-{}", requests.len())).map_err(OffboardError::Validation)
    }

    async fn get_export(&self, _matter: &MatterId, _export: &ExportId) -> Result<ExportSnapshot> {
        *self.get_calls.lock().unwrap() += 1;
        if self.fail_get_export {
            return Err(OffboardError::Connection("connection reset".to_string()));
        }
        let mut snapshots = self.snapshots.lock().unwrap();
        let next = if snapshots.len() > 1 {
            snapshots.pop_front()
        } else {
            snapshots.front().cloned()
        };
        next.ok_or_else(|| OffboardError::Other("no scripted snapshot".to_string()))
    }
}

/// License directory holding assignments as (sku, user) pairs
#[derive(Default)]
pub struct FakeLicenseDirectory {
    assigned: Mutex<HashSet<(String, String)>>,
    inserts: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    fail_lookups: bool,
}

impl FakeLicenseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignment(self, sku: &str, user: &str) -> Self {
        self.assigned
            .lock()
            .unwrap()
            .insert((sku.to_string(), user.to_string()));
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn inserts(&self) -> Vec<String> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseDirectory for FakeLicenseDirectory {
    async fn get_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<Option<LicenseAssignment>> {
        if self.fail_lookups {
            return Err(OffboardError::Authorization("missing scope".to_string()));
        }
        let assigned = self.assigned.lock().unwrap();
        Ok(assigned
            .contains(&(sku_id.to_string(), user_id.to_string()))
            .then(|| LicenseAssignment {
                product_id: product_id.to_string(),
                sku_id: sku_id.to_string(),
                user_id: user_id.to_string(),
                sku_name: None,
            }))
    }

    async fn insert_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<LicenseAssignment> {
        self.inserts.lock().unwrap().push(sku_id.to_string());
        self.assigned
            .lock()
            .unwrap()
            .insert((sku_id.to_string(), user_id.to_string()));
        Ok(LicenseAssignment {
            product_id: product_id.to_string(),
            sku_id: sku_id.to_string(),
            user_id: user_id.to_string(),
            sku_name: None,
        })
    }

    async fn delete_assignment(&self, _product_id: &str, sku_id: &str, user_id: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(sku_id.to_string());
        let removed = self
            .assigned
            .lock()
            .unwrap()
            .remove(&(sku_id.to_string(), user_id.to_string()));
        if removed {
            Ok(())
        } else {
            Err(OffboardError::NotFound(format!("{sku_id}/{user_id}")))
        }
    }
}

/// One object served by [`FakeObjectStorage`]
#[derive(Clone, Default)]
pub struct FakeObject {
    pub data: Vec<u8>,
    /// Size returned by the metadata lookup; `None` makes the lookup fail
    pub metadata_size: Option<u64>,
    /// Whether the response carries `Content-Length`
    pub send_length: bool,
    /// Bytes per streamed chunk
    pub chunk_len: usize,
    /// Inject an empty chunk between every data chunk
    pub empty_chunks: bool,
    /// Respond with this status instead of streaming
    pub status: Option<u16>,
    /// Break the stream after this many bytes
    pub fail_after: Option<usize>,
}

impl FakeObject {
    pub fn new(data: Vec<u8>) -> Self {
        let len = data.len() as u64;
        Self {
            data,
            metadata_size: Some(len),
            send_length: true,
            chunk_len: 300,
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct FakeObjectStorage {
    objects: Mutex<HashMap<(String, String), FakeObject>>,
    reads: Mutex<Vec<String>>,
}

impl FakeObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, object: FakeObject) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), object);
        self
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    fn object(&self, bucket: &str, key: &str) -> Result<FakeObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| OffboardError::NotFound(format!("{bucket}/{key}")))
    }
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn object_size(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        let object = self.object(bucket, key)?;
        object
            .metadata_size
            .map(Some)
            .ok_or_else(|| OffboardError::Authorization("metadata read denied".to_string()))
    }

    async fn open_read(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        self.reads.lock().unwrap().push(format!("{bucket}/{key}"));
        let object = self.object(bucket, key)?;
        let name = format!("{bucket}/{key}");

        if let Some(status) = object.status {
            return Err(TransferError::HttpStatus {
                object: name,
                status,
                body: "denied".to_string(),
            }
            .into());
        }

        let readable = object.fail_after.unwrap_or(object.data.len());
        let mut items: Vec<Result<Bytes>> = Vec::new();
        for chunk in object.data[..readable].chunks(object.chunk_len.max(1)) {
            if object.empty_chunks {
                items.push(Ok(Bytes::new()));
            }
            items.push(Ok(Bytes::copy_from_slice(chunk)));
        }
        if object.fail_after.is_some() {
            items.push(Err(TransferError::Stream {
                object: name,
                message: "connection reset".to_string(),
            }
            .into()));
        }

        Ok(ObjectStream {
            content_length: object.send_length.then_some(object.data.len() as u64),
            body: futures::stream::iter(items).boxed(),
        })
    }
}

/// How a [`FakeUpload`] reports progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadBehavior {
    /// Advances one chunk per call
    #[default]
    Normal,
    /// Reports less than the previous call once, as after a service-side retry
    Regressing,
    /// Never advances and never finishes
    Stalled,
    /// Fails on the first chunk
    Failing,
}

pub struct FakeUpload {
    name: String,
    total: u64,
    chunk: u64,
    sent: u64,
    calls: u32,
    chunk_calls: Arc<AtomicU32>,
    behavior: UploadBehavior,
    item: String,
}

#[async_trait]
impl ResumableUpload for FakeUpload {
    fn total_bytes(&self) -> u64 {
        self.total
    }

    async fn next_chunk(&mut self) -> Result<ChunkOutcome> {
        self.calls += 1;
        self.chunk_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            UploadBehavior::Failing => {
                return Err(TransferError::HttpStatus {
                    object: self.name.clone(),
                    status: 503,
                    body: "backend error".to_string(),
                }
                .into())
            }
            UploadBehavior::Stalled => {
                return Ok(ChunkOutcome {
                    progress: Some(UploadProgress {
                        bytes_sent: 0,
                        total_bytes: self.total,
                    }),
                    response: None,
                })
            }
            UploadBehavior::Regressing if self.calls == 2 => {
                return Ok(ChunkOutcome {
                    progress: Some(UploadProgress {
                        bytes_sent: self.sent / 2,
                        total_bytes: self.total,
                    }),
                    response: None,
                })
            }
            _ => {}
        }

        self.sent = (self.sent + self.chunk).min(self.total);
        if self.sent >= self.total {
            // Service over-reports on the final chunk
            return Ok(ChunkOutcome {
                progress: Some(UploadProgress {
                    bytes_sent: self.total + 7,
                    total_bytes: self.total,
                }),
                response: Some(ItemId::new(self.item.clone()).map_err(OffboardError::Validation)?),
            });
        }
        Ok(ChunkOutcome {
            progress: Some(UploadProgress {
                bytes_sent: self.sent,
                total_bytes: self.total,
            }),
            response: None,
        })
    }
}

/// One recorded upload: the request and the bytes found at its path
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub request: UploadRequest,
    pub contents: Vec<u8>,
}

#[derive(Default)]
pub struct FakeRetentionStore {
    folders: Mutex<Vec<String>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    chunk_calls: Arc<AtomicU32>,
    behavior: UploadBehavior,
}

impl FakeRetentionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, behavior: UploadBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn folders(&self) -> Vec<String> {
        self.folders.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Chunks sent across every session
    pub fn chunk_calls(&self) -> u32 {
        self.chunk_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetentionStore for FakeRetentionStore {
    async fn find_or_create_folder(&self, name: &str) -> Result<FolderId> {
        self.folders.lock().unwrap().push(name.to_string());
        FolderId::new(format!("folder:{name}")).map_err(OffboardError::Validation)
    }

    async fn start_resumable_upload(
        &self,
        request: UploadRequest,
    ) -> Result<Box<dyn ResumableUpload>> {
        let contents = tokio::fs::read(&request.local_path).await?;
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(RecordedUpload {
            request: request.clone(),
            contents: contents.clone(),
        });

        Ok(Box::new(FakeUpload {
            name: request.name,
            total: contents.len() as u64,
            chunk: request.chunk_size as u64,
            sent: 0,
            calls: 0,
            chunk_calls: self.chunk_calls.clone(),
            behavior: self.behavior,
            item: format!("item-{}", uploads.len()),
        }))
    }
}

/// Progress observer keeping every event
#[derive(Default)]
pub struct RecordingProgress {
    pub download_deltas: Mutex<Vec<(u64, Option<u64>)>>,
    pub upload_progress: Mutex<Vec<UploadProgress>>,
}

impl RecordingProgress {
    pub fn downloaded(&self) -> u64 {
        self.download_deltas.lock().unwrap().iter().map(|(d, _)| d).sum()
    }

    pub fn uploads(&self) -> Vec<UploadProgress> {
        self.upload_progress.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingProgress {
    fn download_chunk(&self, _object: &str, delta: u64, _downloaded: u64, total: Option<u64>) {
        self.download_deltas.lock().unwrap().push((delta, total));
    }

    fn upload_progress(&self, _name: &str, progress: UploadProgress) {
        self.upload_progress.lock().unwrap().push(progress);
    }
}
