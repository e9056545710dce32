//! Shared helpers for integration tests that run the pipeline against a
//! local mock server.

#![allow(dead_code)]

use offboard::config::{load_config_from_str, OffboardConfig};
use std::path::Path;

pub const USER: &str = "a@x.com";
pub const LICENSE_BASE: &str = "/apps/licensing/v1/product/Google-Apps/sku";
pub const TARGET_SKU: &str = "1010020026";
pub const ARCHIVE_SKU: &str = "1010340004";

/// Path of one license assignment for [`USER`]
pub fn assignment_path(sku: &str) -> String {
    format!("{LICENSE_BASE}/{sku}/user/a%40x.com")
}

/// Mail-only configuration with every endpoint at `base_url`
pub fn mail_config(base_url: &str, staging: &Path, extra: &str) -> OffboardConfig {
    let toml = format!(
        r#"
[credentials]
admin_subject = "admin@x.com"
retention_subject = "archive@x.com"
access_token = "t0k"

[license]
settle_delay_secs = 0

[export]
corpora = ["mail"]
poll_interval_secs = 1
settle_delay_secs = 0
max_poll_attempts = 5

[transfer]
staging_dir = "{staging}"
download_chunk_size = 256

[endpoints]
licensing = "{base_url}"
vault = "{base_url}"
storage = "{base_url}"
drive = "{base_url}"
drive_upload = "{base_url}/upload"

{extra}
"#,
        staging = staging.display().to_string().replace('\\', "/"),
    );

    load_config_from_str(&toml).expect("test configuration should load")
}

/// Export resource JSON as the export service returns it
pub fn export_json(status: &str, files: &[(&str, &str, u64)]) -> String {
    let files: Vec<String> = files
        .iter()
        .map(|(bucket, object, size)| {
            format!(r#"{{"bucketName": "{bucket}", "objectName": "{object}", "size": "{size}"}}"#)
        })
        .collect();
    format!(
        r#"{{"id": "exp-1", "status": "{status}", "cloudStorageSink": {{"files": [{}]}}}}"#,
        files.join(", ")
    )
}
