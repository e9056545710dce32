//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::OffboardConfig;
use super::secret::secret_string;
use crate::domain::errors::OffboardError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OffboardConfig
/// 4. Applies environment variable overrides (OFFBOARD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`OffboardError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use offboard::config::loader::load_config;
///
/// let config = load_config("offboard.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OffboardConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OffboardError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        OffboardError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] for an in-memory TOML document
pub fn load_config_from_str(contents: &str) -> Result<OffboardConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: OffboardConfig = toml::from_str(&contents)
        .map_err(|e| OffboardError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        OffboardError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| OffboardError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(OffboardError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the OFFBOARD_* prefix
///
/// Environment variables follow the pattern: OFFBOARD_<SECTION>_<KEY>,
/// for example OFFBOARD_TRANSFER_STAGING_DIR. Unparseable numeric values are
/// ignored and the file value is kept.
fn apply_env_overrides(config: &mut OffboardConfig) {
    fn var(name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
        var(name).and_then(|v| v.parse().ok())
    }

    // Application
    if let Some(val) = var("OFFBOARD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parsed("OFFBOARD_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // Credentials
    if let Some(val) = var("OFFBOARD_CREDENTIALS_SERVICE_ACCOUNT_FILE") {
        config.credentials.service_account_file = PathBuf::from(val);
    }
    if let Some(val) = var("OFFBOARD_CREDENTIALS_ADMIN_SUBJECT") {
        config.credentials.admin_subject = val;
    }
    if let Some(val) = var("OFFBOARD_CREDENTIALS_RETENTION_SUBJECT") {
        config.credentials.retention_subject = val;
    }
    if let Some(val) = var("OFFBOARD_CREDENTIALS_ACCESS_TOKEN") {
        config.credentials.access_token = Some(secret_string(val));
    }

    // License
    if let Some(val) = var("OFFBOARD_LICENSE_TARGET_SKU") {
        config.license.target_sku = val;
    }
    if let Some(val) = parsed("OFFBOARD_LICENSE_SETTLE_DELAY_SECS") {
        config.license.settle_delay_secs = val;
    }

    // Export
    if let Some(val) = parsed("OFFBOARD_EXPORT_POLL_INTERVAL_SECS") {
        config.export.poll_interval_secs = val;
    }
    if let Some(val) = parsed("OFFBOARD_EXPORT_SETTLE_DELAY_SECS") {
        config.export.settle_delay_secs = val;
    }
    if let Some(val) = parsed("OFFBOARD_EXPORT_MAX_POLL_ATTEMPTS") {
        config.export.max_poll_attempts = Some(val);
    }

    // Transfer
    if let Some(val) = var("OFFBOARD_TRANSFER_STAGING_DIR") {
        config.transfer.staging_dir = PathBuf::from(val);
    }
    if let Some(val) = parsed("OFFBOARD_TRANSFER_DOWNLOAD_CHUNK_SIZE") {
        config.transfer.download_chunk_size = val;
    }
    if let Some(val) = parsed("OFFBOARD_TRANSFER_UPLOAD_CHUNK_SIZE") {
        config.transfer.upload_chunk_size = val;
    }
    if let Some(val) = parsed("OFFBOARD_TRANSFER_KEEP_STAGING") {
        config.transfer.keep_staging = val;
    }
    if let Some(val) = parsed("OFFBOARD_TRANSFER_MAX_STALLED_CHUNKS") {
        config.transfer.max_stalled_chunks = val;
    }

    // Logging
    if let Some(val) = parsed("OFFBOARD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = var("OFFBOARD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
