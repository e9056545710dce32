//! External system integrations for offboard.
//!
//! Each remote collaborator sits behind a trait so the pipeline can run
//! against in-memory fakes in tests:
//!
//! - [`licensing`] - license directory ([`licensing::LicenseDirectory`])
//! - [`vault`] - export service ([`vault::ExportService`])
//! - [`storage`] - object storage holding export artifacts ([`storage::ObjectStorage`])
//! - [`drive`] - retention store with resumable uploads ([`drive::RetentionStore`])
//! - [`auth`] - bearer tokens for the delegated identities
//!
//! [`factory::Services`] wires the HTTP implementations from configuration:
//!
//! ```rust,no_run
//! use offboard::adapters::factory::Services;
//! use offboard::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("offboard.toml")?;
//! let services = Services::from_config(&config)?;
//! let folder = services.retention.find_or_create_folder("a@x.com").await?;
//! println!("Retention folder {folder}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod drive;
pub mod factory;
pub mod http;
pub mod licensing;
pub mod storage;
pub mod vault;

pub use factory::Services;
