// Offboard - Departing-user data export and retention tool
// Copyright (c) 2025 Offboard Contributors
// Licensed under the MIT License

//! # Offboard - departing-user data export and retention
//!
//! Offboard exports a departing user's mailbox and file store through the
//! organization's data-governance service, copies the exported archives into
//! a long-term retention folder, and then releases the user's license.
//!
//! ## Overview
//!
//! One run, strictly in order:
//! - **Reconciling** the user's license so the export service can see the data
//! - **Exporting** each corpus (mail, files) and waiting for completion
//! - **Downloading** every exported archive into a local staging directory
//! - **Uploading** the staged archives into a folder named after the user
//! - **Revoking** the license once every upload has been confirmed
//! - **Purging** the staging directory
//!
//! The license is never revoked unless every export, download and upload
//! succeeded.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (license, export, transfer, pipeline)
//! - [`adapters`] - Remote APIs (licensing, export, object storage, retention store, OAuth)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
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
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("offboard.toml")?;
//!     let services = Services::from_config(&config)?;
//!
//!     let orchestrator = Orchestrator::new(
//!         &services,
//!         config,
//!         ShutdownSignal::never(),
//!         Arc::new(TracingProgress),
//!     );
//!
//!     let summary = orchestrator.run(&UserEmail::new("departing@example.com")?).await?;
//!     println!("Retained {} files", summary.uploaded.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], carrying a
//! [`domain::OffboardError`]; byte-moving failures are wrapped in
//! [`domain::TransferError`].
//!
//! ## Logging
//!
//! Offboard uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(user = "departing@example.com", "Offboarding started");
//! warn!(corpus = "MAIL", "Export produced no files");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
