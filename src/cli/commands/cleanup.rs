//! Cleanup command implementation
//!
//! This module implements the `cleanup` command, which purges the staging
//! directory left behind by a failed or `--keep-staging` run.

use crate::config::load_config;
use crate::core::pipeline::StagingArea;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the cleanup command
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Staging directory to purge (defaults to transfer.staging_dir)
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,
}

impl CleanupArgs {
    /// Execute the cleanup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let root = match &self.staging_dir {
            Some(dir) => dir.clone(),
            None => match load_config(config_path) {
                Ok(config) => config.transfer.staging_dir,
                Err(e) => {
                    println!("❌ Failed to load configuration file");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            },
        };

        tracing::info!(path = %root.display(), "Purging staging directory");
        let staging = StagingArea::new(root);

        let staged = match staging.staged_files().await {
            Ok(files) => files,
            Err(e) => {
                println!("❌ Failed to list staging directory");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if staged.is_empty() {
            println!("✅ Nothing to clean up in {}", staging.root().display());
            return Ok(0);
        }

        println!(
            "🧹 Removing {} staged file(s) from {}",
            staged.len(),
            staging.root().display()
        );
        match staging.purge().await {
            Ok(()) => {
                println!("✅ Staging directory purged");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to purge staging directory");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}
