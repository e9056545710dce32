//! Configuration schema types
//!
//! Every component receives the section it needs at construction time; there
//! is no ambient global configuration.

use crate::config::SecretString;
use crate::domain::Corpus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Granularity the retention store requires for resumable chunk sizes
pub const UPLOAD_CHUNK_GRANULARITY: usize = 256 * 1024;

/// Main offboard configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffboardConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Service-account credentials and delegated identities
    pub credentials: CredentialsConfig,

    /// License reconciliation settings
    #[serde(default)]
    pub license: LicenseConfig,

    /// Export job settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Download/upload settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Remote API base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OffboardConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.credentials.validate()?;
        self.license.validate()?;
        self.export.validate()?;
        self.transfer.validate()?;
        self.endpoints.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode: look up state but change nothing remotely
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Service-account credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Path to the service-account JSON key
    #[serde(default = "default_service_account_file")]
    pub service_account_file: PathBuf,

    /// Administrator impersonated for licensing, export and storage calls
    pub admin_subject: String,

    /// User impersonated for retention-store calls
    pub retention_subject: String,

    /// Pre-issued access token; bypasses the key file when set
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Token endpoint override (defaults to the key file's `token_uri`)
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl CredentialsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.admin_subject.trim().is_empty() {
            return Err("credentials.admin_subject cannot be empty".to_string());
        }
        if self.retention_subject.trim().is_empty() {
            return Err("credentials.retention_subject cannot be empty".to_string());
        }
        if self.access_token.is_none() && self.service_account_file.as_os_str().is_empty() {
            return Err(
                "credentials.service_account_file is required when no access_token is set"
                    .to_string(),
            );
        }
        if let Some(ref uri) = self.token_uri {
            validate_url("credentials.token_uri", uri)?;
        }
        Ok(())
    }
}

/// License reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Product the SKUs belong to
    #[serde(default = "default_product_id")]
    pub product_id: String,

    /// SKU assigned when the user holds none of the tracked SKUs
    #[serde(default = "default_target_sku")]
    pub target_sku: String,

    /// SKUs that count as "already licensed", with their labels
    #[serde(default = "default_tracked_skus")]
    pub tracked_skus: BTreeMap<String, String>,

    /// Wait after reconciliation for the directory to propagate
    #[serde(default = "default_license_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

impl LicenseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.product_id.trim().is_empty() {
            return Err("license.product_id cannot be empty".to_string());
        }
        if !self.tracked_skus.contains_key(&self.target_sku) {
            return Err(format!(
                "license.target_sku '{}' must be listed in license.tracked_skus",
                self.target_sku
            ));
        }
        Ok(())
    }

    /// Label of the target SKU
    pub fn target_label(&self) -> &str {
        self.tracked_skus
            .get(&self.target_sku)
            .map(String::as_str)
            .unwrap_or(self.target_sku.as_str())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            product_id: default_product_id(),
            target_sku: default_target_sku(),
            tracked_skus: default_tracked_skus(),
            settle_delay_secs: default_license_settle_delay_secs(),
        }
    }
}

/// Export format for the mail corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MailExportFormat {
    #[default]
    Mbox,
    Pst,
}

impl MailExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailExportFormat::Mbox => "MBOX",
            MailExportFormat::Pst => "PST",
        }
    }
}

/// Export job settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Corpora to export, in order
    #[serde(default = "default_corpora")]
    pub corpora: Vec<Corpus>,

    /// Wait between status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Wait after COMPLETED before the final manifest fetch
    #[serde(default = "default_export_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Poll ceiling; unbounded when absent
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,

    /// Mail export format
    #[serde(default)]
    pub mail_format: MailExportFormat,

    /// Include shared drives in the files export
    #[serde(default)]
    pub include_shared_drives: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.corpora.is_empty() {
            return Err("export.corpora must name at least one corpus".to_string());
        }
        let mut seen = Vec::new();
        for corpus in &self.corpora {
            if seen.contains(corpus) {
                return Err(format!("export.corpora lists {corpus} twice"));
            }
            seen.push(*corpus);
        }
        if self.poll_interval_secs == 0 {
            return Err("export.poll_interval_secs must be greater than 0".to_string());
        }
        if self.max_poll_attempts == Some(0) {
            return Err("export.max_poll_attempts must be greater than 0 when set".to_string());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            corpora: default_corpora(),
            poll_interval_secs: default_poll_interval_secs(),
            settle_delay_secs: default_export_settle_delay_secs(),
            max_poll_attempts: None,
            mail_format: MailExportFormat::default(),
            include_shared_drives: false,
        }
    }
}

/// Download/upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Local staging directory shared by all corpora in one run
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Write size for downloads, in bytes
    #[serde(default = "default_download_chunk_size")]
    pub download_chunk_size: usize,

    /// Resumable upload chunk size, in bytes
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,

    /// Timeout for streamed reads
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Leave the staging directory in place after the run
    #[serde(default)]
    pub keep_staging: bool,

    /// Consecutive upload chunks answered without progress before an
    /// upload is abandoned
    #[serde(default = "default_max_stalled_chunks")]
    pub max_stalled_chunks: u32,
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if self.staging_dir.as_os_str().is_empty() {
            return Err("transfer.staging_dir cannot be empty".to_string());
        }
        if self.download_chunk_size == 0 {
            return Err("transfer.download_chunk_size must be greater than 0".to_string());
        }
        if self.upload_chunk_size == 0 || self.upload_chunk_size % UPLOAD_CHUNK_GRANULARITY != 0 {
            return Err(format!(
                "transfer.upload_chunk_size must be a positive multiple of {UPLOAD_CHUNK_GRANULARITY} bytes, got {}",
                self.upload_chunk_size
            ));
        }
        if self.download_timeout_secs == 0 {
            return Err("transfer.download_timeout_secs must be greater than 0".to_string());
        }
        if self.max_stalled_chunks == 0 {
            return Err("transfer.max_stalled_chunks must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            download_chunk_size: default_download_chunk_size(),
            upload_chunk_size: default_upload_chunk_size(),
            download_timeout_secs: default_download_timeout_secs(),
            keep_staging: false,
            max_stalled_chunks: default_max_stalled_chunks(),
        }
    }
}

/// Remote API base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_licensing_url")]
    pub licensing: String,

    #[serde(default = "default_vault_url")]
    pub vault: String,

    #[serde(default = "default_storage_url")]
    pub storage: String,

    #[serde(default = "default_drive_url")]
    pub drive: String,

    #[serde(default = "default_drive_upload_url")]
    pub drive_upload: String,

    /// Timeout for non-streaming API calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl EndpointsConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("endpoints.licensing", &self.licensing)?;
        validate_url("endpoints.vault", &self.vault)?;
        validate_url("endpoints.storage", &self.storage)?;
        validate_url("endpoints.drive", &self.drive)?;
        validate_url("endpoints.drive_upload", &self.drive_upload)?;
        if self.request_timeout_secs == 0 {
            return Err("endpoints.request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Every endpoint pointed at one base URL, for local test servers
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            licensing: base.to_string(),
            vault: base.to_string(),
            storage: base.to_string(),
            drive: base.to_string(),
            drive_upload: base.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            licensing: default_licensing_url(),
            vault: default_vault_url(),
            storage: default_storage_url(),
            drive: default_drive_url(),
            drive_upload: default_drive_upload_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid = ["daily", "hourly", "never"];
        if !valid.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let parsed =
        url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL '{value}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "{field} must use http or https, got scheme '{other}'"
        )),
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_account_file() -> PathBuf {
    PathBuf::from("service_account.json")
}

fn default_product_id() -> String {
    "Google-Apps".to_string()
}

fn default_target_sku() -> String {
    "1010020026".to_string()
}

fn default_tracked_skus() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("1010020026".to_string(), "Enterprise Standard".to_string()),
        ("1010340004".to_string(), "Archive License".to_string()),
    ])
}

fn default_license_settle_delay_secs() -> u64 {
    60
}

fn default_corpora() -> Vec<Corpus> {
    Corpus::ALL.to_vec()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_export_settle_delay_secs() -> u64 {
    10
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_download_chunk_size() -> usize {
    8 * 1024 * 1024
}

fn default_upload_chunk_size() -> usize {
    32 * 1024 * 1024
}

fn default_download_timeout_secs() -> u64 {
    600
}

fn default_max_stalled_chunks() -> u32 {
    3
}

fn default_licensing_url() -> String {
    "https://licensing.googleapis.com".to_string()
}

fn default_vault_url() -> String {
    "https://vault.googleapis.com".to_string()
}

fn default_storage_url() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_drive_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_drive_upload_url() -> String {
    "https://www.googleapis.com/upload".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
