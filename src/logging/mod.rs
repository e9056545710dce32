//! Logging and observability
//!
//! Structured logging via `tracing`:
//! - Console output with configurable level (or `RUST_LOG`)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use offboard::logging::init_logging;
//! use offboard::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(user = "a@x.com", "Offboarding started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the creation of an export job
///
/// ```no_run
/// # use offboard::domain::ExportJob;
/// # fn example(job: &ExportJob) {
/// offboard::log_export_created!(job);
/// # }
/// ```
#[macro_export]
macro_rules! log_export_created {
    ($job:expr) => {
        tracing::info!(
            user = %$job.user,
            corpus = %$job.corpus,
            matter_id = %$job.matter_id,
            export_id = %$job.export_id,
            monitor_url = %$job.monitor_url(),
            "Export started"
        );
    };
}

/// Log a finished file transfer with its byte count and duration
///
/// ```no_run
/// use std::time::Duration;
///
/// offboard::log_transfer_complete!("download", "b1/exp/a.mbox", 1024u64, Duration::from_secs(2));
/// ```
#[macro_export]
macro_rules! log_transfer_complete {
    ($direction:expr, $object:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            direction = $direction,
            object = %$object,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "Transfer completed"
        );
    };
}
