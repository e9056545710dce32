//! Status command implementation
//!
//! This module implements the `status` command, which reports the status
//! and manifest of one previously created export.

use crate::adapters::vault::ExportService;
use crate::adapters::Services;
use crate::cli::exit_code;
use crate::config::load_config;
use crate::domain::{monitor_url, ExportId, ExportSnapshot, MatterId, Result};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Matter the export belongs to
    #[arg(long)]
    pub matter_id: String,

    /// Export to inspect
    #[arg(long)]
    pub export_id: String,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(matter_id = %self.matter_id, export_id = %self.export_id, "Checking export status");

        println!("📊 Export Status");
        println!();

        let (matter, export) = match (
            MatterId::new(self.matter_id.clone()),
            ExportId::new(self.export_id.clone()),
        ) {
            (Ok(m), Ok(e)) => (m, e),
            (Err(e), _) | (_, Err(e)) => {
                println!("❌ Invalid identifier: {e}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let services = match Services::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to initialize service clients");
                println!("   Error: {e}");
                return Ok(exit_code(&e));
            }
        };

        match fetch(services.exports.as_ref(), &matter, &export).await {
            Ok(snapshot) => {
                print_snapshot(&matter, &export, &snapshot);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to fetch export status");
                println!("   Error: {e}");
                Ok(exit_code(&e))
            }
        }
    }
}

async fn fetch(
    service: &dyn ExportService,
    matter: &MatterId,
    export: &ExportId,
) -> Result<ExportSnapshot> {
    service.get_export(matter, export).await
}

fn print_snapshot(matter: &MatterId, export: &ExportId, snapshot: &ExportSnapshot) {
    println!("  Matter: {matter}");
    println!("  Export: {export}");
    println!("  Status: {}", snapshot.status);
    println!("  Monitor: {}", monitor_url(matter));

    if snapshot.manifest.is_empty() {
        println!("  Files: none listed");
    } else {
        println!("  Files:");
        for file in &snapshot.manifest.files {
            match file.size {
                Some(size) => println!(
                    "    {}/{} ({} bytes)",
                    file.bucket_name, file.object_name, size
                ),
                None => println!("    {}/{}", file.bucket_name, file.object_name),
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{completed_manifest, snapshot, FakeExportService};
    use crate::domain::ExportStatus;

    #[tokio::test]
    async fn test_fetch_returns_snapshot() {
        let service = FakeExportService::new().with_snapshots(vec![snapshot(
            "COMPLETED",
            completed_manifest("b1", "exp/a.mbox", Some(1000)),
        )]);
        let matter = MatterId::new("m-1").unwrap();
        let export = ExportId::new("e-1").unwrap();

        let snap = fetch(&service, &matter, &export).await.unwrap();
        assert_eq!(snap.status, ExportStatus::Completed);
        assert_eq!(snap.manifest.files.len(), 1);
        assert_eq!(service.get_export_calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_ids_return_configuration_code() {
        let args = StatusArgs {
            matter_id: " ".to_string(),
            export_id: "e-1".to_string(),
        };
        assert_eq!(args.execute("offboard.toml").await.unwrap(), 2);
    }
}
