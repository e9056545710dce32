//! Configuration management for offboard.
//!
//! Configuration is a TOML file with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `OFFBOARD_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [credentials]
//! service_account_file = "service_account.json"
//! admin_subject = "admin@example.com"
//! retention_subject = "archive@example.com"
//!
//! [license]
//! target_sku = "1010020026"
//! settle_delay_secs = 60
//!
//! [export]
//! poll_interval_secs = 10
//! max_poll_attempts = 720
//!
//! [transfer]
//! staging_dir = "./downloads"
//! ```
//!
//! ```rust,no_run
//! use offboard::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("offboard.toml")?;
//! println!("Staging in {}", config.transfer.staging_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, CredentialsConfig, EndpointsConfig, ExportConfig, LicenseConfig,
    LoggingConfig, MailExportFormat, OffboardConfig, TransferConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
