//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "offboard.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing offboard configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Place the service account key next to it (service_account.json)");
                println!("  3. Grant the key domain-wide delegation for the licensing,");
                println!("     ediscovery, storage and drive scopes");
                println!("  4. Validate configuration: offboard validate-config");
                println!("  5. Offboard a user: offboard run --user someone@example.com");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

/// Sample configuration with every section and its defaults
pub fn sample_config() -> &'static str {
    r#"# Offboard Configuration File
# Export, retain and unlicense a departing user

[application]
log_level = "info"
dry_run = false

[credentials]
# Service-account key with domain-wide delegation
service_account_file = "service_account.json"
# Administrator impersonated for licensing, export and storage calls
admin_subject = "admin@example.com"
# Account that owns the retention folders
retention_subject = "archive@example.com"
# Pre-issued bearer token; bypasses the key file when set
# access_token = "${OFFBOARD_ACCESS_TOKEN}"

[license]
product_id = "Google-Apps"
target_sku = "1010020026"
settle_delay_secs = 60

[license.tracked_skus]
"1010020026" = "Enterprise Standard"
"1010340004" = "Archive License"

[export]
corpora = ["mail", "files"]
poll_interval_secs = 10
settle_delay_secs = 10
# Give up after this many status checks (unset: poll until done)
max_poll_attempts = 720
mail_format = "MBOX"
include_shared_drives = true

[transfer]
staging_dir = "./downloads"
download_chunk_size = 8388608
upload_chunk_size = 33554432
download_timeout_secs = 600
keep_staging = false
max_stalled_chunks = 3

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
}
