//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the offboard configuration file.

use crate::config::{load_config, OffboardConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);

        for warning in warnings(&config) {
            println!("⚠️  {warning}");
        }
        println!();
        Ok(0)
    }
}

fn print_summary(config: &OffboardConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    if config.credentials.access_token.is_some() {
        println!("  Credentials: pre-issued access token");
    } else {
        println!(
            "  Credentials: {}",
            config.credentials.service_account_file.display()
        );
    }
    println!("  Admin Subject: {}", config.credentials.admin_subject);
    println!("  Retention Subject: {}", config.credentials.retention_subject);
    println!(
        "  Target License: {} ({})",
        config.license.target_label(),
        config.license.target_sku
    );
    println!(
        "  Tracked SKUs: {:?}",
        config.license.tracked_skus.keys().collect::<Vec<_>>()
    );
    println!(
        "  Corpora: {}",
        config
            .export
            .corpora
            .iter()
            .map(|c| c.staging_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Poll Interval: {}s", config.export.poll_interval_secs);
    match config.export.max_poll_attempts {
        Some(max) => println!("  Max Poll Attempts: {max}"),
        None => println!("  Max Poll Attempts: unbounded"),
    }
    println!("  Mail Format: {}", config.export.mail_format.as_str());
    println!(
        "  Staging Directory: {}",
        config.transfer.staging_dir.display()
    );
    println!(
        "  Chunk Sizes: download {} / upload {} bytes",
        config.transfer.download_chunk_size, config.transfer.upload_chunk_size
    );
}

/// Non-fatal problems worth reporting before a run
fn warnings(config: &OffboardConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.credentials.access_token.is_none()
        && !config.credentials.service_account_file.exists()
    {
        warnings.push(format!(
            "Service account key not found: {}",
            config.credentials.service_account_file.display()
        ));
    }
    if config.export.max_poll_attempts.is_none() {
        warnings.push("export.max_poll_attempts is unset; polling never gives up".to_string());
    }
    warnings
}
