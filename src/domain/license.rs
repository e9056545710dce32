//! License assignment model

use serde::{Deserialize, Serialize};

/// One user's entitlement under one product SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseAssignment {
    pub product_id: String,
    pub sku_id: String,
    pub user_id: String,
    /// Human readable SKU name when the directory reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,
}

/// Outcome of reconciling a user's license
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseReconciliation {
    /// The user already held one of the tracked SKUs
    AlreadyLicensed { sku_id: String },
    /// The target SKU was assigned
    Assigned { sku_id: String },
    /// Dry run: the target SKU would have been assigned
    WouldAssign { sku_id: String },
}

impl LicenseReconciliation {
    /// Whether a new assignment was written
    pub fn changed(&self) -> bool {
        matches!(self, LicenseReconciliation::Assigned { .. })
    }
}

/// Outcome of revoking the target license
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseRevocation {
    Revoked { sku_id: String },
    /// The user did not hold the target SKU
    NotAssigned { sku_id: String },
    /// Dry run: nothing was removed
    Skipped { sku_id: String },
}
