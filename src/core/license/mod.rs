//! License entitlement reconciliation

pub mod reconciler;

pub use reconciler::LicenseReconciler;
