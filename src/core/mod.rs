//! Core business logic for offboard.
//!
//! # Modules
//!
//! - [`license`] - License check, fix and revoke
//! - [`export`] - Export job creation, completion polling and artifact lookup
//! - [`transfer`] - Chunked download and resumable upload with progress reporting
//! - [`pipeline`] - Orchestration, staging directory and run summary
//! - [`shutdown`] - Cancelable waits driven by the shutdown signal
//!
//! # Offboarding Workflow
//!
//! 1. **Reconcile license**: make sure the user holds a tracked SKU
//! 2. **Export**: per corpus, create a matter and export, wait for completion
//! 3. **Download**: stream every manifest file into the staging directory
//! 4. **Retain**: upload staged files into a folder named after the user
//! 5. **Revoke**: remove the license once every upload succeeded
//! 6. **Clean up**: purge the staging directory
//!
//! # Example
//!
//! ```rust,no_run
//! use offboard::adapters::Services;
//! use offboard::config::load_config;
//! use offboard::core::pipeline::Orchestrator;
//! use offboard::core::shutdown::ShutdownSignal;
//! use offboard::core::transfer::TracingProgress;
//! use offboard::domain::UserEmail;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("offboard.toml")?;
//! let services = Services::from_config(&config)?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let orchestrator = Orchestrator::new(
//!     &services,
//!     config,
//!     ShutdownSignal::new(shutdown_rx),
//!     Arc::new(TracingProgress),
//! );
//!
//! let user = UserEmail::new("departing@example.com")?;
//! let summary = orchestrator.run(&user).await?;
//! println!("Uploaded {} files", summary.uploaded.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod license;
pub mod pipeline;
pub mod shutdown;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;
