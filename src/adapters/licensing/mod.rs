//! License directory integration
//!
//! The [`LicenseDirectory`] trait covers the three calls the reconciler
//! makes; [`LicensingClient`] implements them against the Enterprise License
//! Manager REST API.

pub mod client;

pub use client::LicensingClient;

use crate::domain::{LicenseAssignment, Result};
use async_trait::async_trait;

/// Identity/licensing directory
#[async_trait]
pub trait LicenseDirectory: Send + Sync {
    /// Looks up one assignment
    ///
    /// Returns `Ok(None)` when the user holds no license under `sku`. Any
    /// other failure is an error.
    async fn get_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<Option<LicenseAssignment>>;

    /// Assigns `sku` to the user
    async fn insert_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<LicenseAssignment>;

    /// Removes the user's `sku` assignment
    ///
    /// Fails with [`crate::domain::OffboardError::NotFound`] when there is
    /// nothing to remove.
    async fn delete_assignment(&self, product_id: &str, sku_id: &str, user_id: &str)
        -> Result<()>;
}
