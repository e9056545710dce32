//! Run command implementation
//!
//! This module implements the `run` command, which offboards one user end
//! to end.

use crate::adapters::Services;
use crate::cli::exit_code;
use crate::config::load_config;
use crate::core::pipeline::{OffboardingSummary, Orchestrator};
use crate::core::shutdown::ShutdownSignal;
use crate::core::transfer::TracingProgress;
use crate::domain::{LicenseReconciliation, LicenseRevocation, UserEmail};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Email of the user to offboard (prompted for when omitted)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - check the license and print the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the staging directory after a successful run
    #[arg(long)]
    pub keep_staging: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if self.keep_staging {
            config.transfer.keep_staging = true;
        }

        let raw_user = match &self.user {
            Some(user) => user.clone(),
            None => prompt("Enter the email address of the user to offboard: ")?,
        };
        let user = match UserEmail::new(raw_user) {
            Ok(u) => u,
            Err(e) => {
                eprintln!("Invalid user: {e}");
                return Ok(2);
            }
        };

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - No licenses, exports or uploads will be changed");
            println!();
        }

        if !self.yes && !dry_run {
            println!("Offboarding plan:");
            println!("  User: {user}");
            println!("  Corpora: {:?}", config.export.corpora);
            println!("  Target license: {}", config.license.target_label());
            println!("  Staging directory: {}", config.transfer.staging_dir.display());
            println!("  Retention account: {}", config.credentials.retention_subject);
            println!();
            let answer = prompt("Proceed? The user's license will be revoked at the end. [y/N]: ")?;
            if !answer.trim().eq_ignore_ascii_case("y") {
                println!("Offboarding cancelled.");
                return Ok(0);
            }
        }

        let services = match Services::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize service clients");
                eprintln!("Failed to initialize service clients: {e}");
                return Ok(exit_code(&e));
            }
        };

        let orchestrator = Orchestrator::new(
            &services,
            config,
            ShutdownSignal::new(shutdown_signal),
            Arc::new(TracingProgress),
        );

        println!("🚀 Offboarding {user}...");
        println!();

        match orchestrator.run(&user).await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) => {
                tracing::error!(user = %user, error = %e, "Offboarding failed");
                eprintln!();
                eprintln!("❌ Offboarding failed: {e}");
                if e.is_state_error() {
                    eprintln!("   The export did not complete; the license was not revoked.");
                } else {
                    eprintln!("   The license was not revoked. Re-run once the cause is fixed.");
                }
                Ok(exit_code(&e))
            }
        }
    }
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn print_summary(summary: &OffboardingSummary) {
    println!();
    println!("📊 Offboarding Summary for {}:", summary.user);

    match &summary.license {
        Some(LicenseReconciliation::AlreadyLicensed { sku_id }) => {
            println!("  License: already held ({sku_id})")
        }
        Some(LicenseReconciliation::Assigned { sku_id }) => println!("  License: assigned {sku_id}"),
        Some(LicenseReconciliation::WouldAssign { sku_id }) => {
            println!("  License: would assign {sku_id}")
        }
        None => {}
    }

    for corpus in &summary.corpora {
        println!(
            "  {}: {} file(s), {} bytes (matter {}, export {})",
            corpus.corpus,
            corpus.artifacts,
            corpus.bytes_downloaded,
            corpus.job.matter_id,
            corpus.job.export_id
        );
    }

    if let Some(folder) = &summary.folder {
        println!(
            "  Uploaded: {} file(s), {} bytes into folder {}",
            summary.uploaded.len(),
            summary.bytes_uploaded(),
            folder
        );
    }

    match &summary.revocation {
        Some(LicenseRevocation::Revoked { sku_id }) => println!("  Revoked: {sku_id}"),
        Some(LicenseRevocation::NotAssigned { sku_id }) => {
            println!("  Revoked: nothing to revoke ({sku_id} not assigned)")
        }
        Some(LicenseRevocation::Skipped { sku_id }) => println!("  Revoked: skipped ({sku_id})"),
        None => {}
    }

    println!(
        "  Staging: {}",
        if summary.staging_purged { "purged" } else { "kept" }
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.dry_run {
        println!("✅ Dry run completed");
    } else {
        println!("✅ Offboarding completed successfully!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_defaults() {
        let args = RunArgs {
            user: None,
            yes: false,
            dry_run: false,
            keep_staging: false,
        };

        assert!(args.user.is_none());
        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(!args.keep_staging);
    }

    #[tokio::test]
    async fn test_missing_config_exits_with_configuration_code() {
        let args = RunArgs {
            user: Some("a@x.com".to_string()),
            yes: true,
            dry_run: false,
            keep_staging: false,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args.execute("/nonexistent/offboard.toml", rx).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_invalid_user_exits_with_configuration_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("offboard.toml");
        std::fs::write(
            &path,
            "[credentials]\nadmin_subject = \"admin@x.com\"\nretention_subject = \"archive@x.com\"\n",
        )
        .unwrap();

        let args = RunArgs {
            user: Some("not-an-email".to_string()),
            yes: true,
            dry_run: false,
            keep_staging: false,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args.execute(path.to_str().unwrap(), rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
