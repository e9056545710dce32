//! License check, fix and revoke
//!
//! A user holding any tracked SKU counts as licensed. Otherwise the target
//! SKU is assigned. The read-then-write is not atomic with respect to
//! concurrent directory changes.

use crate::adapters::licensing::LicenseDirectory;
use crate::config::LicenseConfig;
use crate::domain::{
    LicenseReconciliation, LicenseRevocation, OffboardError, Result, UserEmail,
};
use std::sync::Arc;

/// Reconciles and revokes a user's license
pub struct LicenseReconciler {
    directory: Arc<dyn LicenseDirectory>,
    config: LicenseConfig,
    dry_run: bool,
}

impl LicenseReconciler {
    pub fn new(directory: Arc<dyn LicenseDirectory>, config: LicenseConfig, dry_run: bool) -> Self {
        Self {
            directory,
            config,
            dry_run,
        }
    }

    /// Tracked SKUs in lookup order: the target first, then the rest
    fn lookup_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.config.target_sku.as_str()).chain(
            self.config
                .tracked_skus
                .keys()
                .map(String::as_str)
                .filter(move |sku| *sku != self.config.target_sku),
        )
    }

    /// Ensures the user holds a tracked SKU, assigning the target if not
    ///
    /// # Errors
    ///
    /// Any lookup failure other than "not assigned", and any insert failure.
    pub async fn check_and_fix(&self, user: &UserEmail) -> Result<LicenseReconciliation> {
        let product = &self.config.product_id;

        for sku in self.lookup_order() {
            if let Some(assignment) = self
                .directory
                .get_assignment(product, sku, user.as_str())
                .await?
            {
                tracing::info!(
                    user = %user,
                    sku_id = %assignment.sku_id,
                    sku = self.config.tracked_skus.get(sku).map(String::as_str).unwrap_or(sku),
                    "User already licensed"
                );
                return Ok(LicenseReconciliation::AlreadyLicensed {
                    sku_id: assignment.sku_id,
                });
            }
        }

        let target = self.config.target_sku.clone();
        if self.dry_run {
            tracing::info!(
                user = %user,
                sku_id = %target,
                sku = self.config.target_label(),
                "Dry run: would assign license"
            );
            return Ok(LicenseReconciliation::WouldAssign { sku_id: target });
        }

        let assignment = self
            .directory
            .insert_assignment(product, &target, user.as_str())
            .await?;
        tracing::info!(
            user = %user,
            sku_id = %assignment.sku_id,
            sku = self.config.target_label(),
            "License assigned"
        );
        Ok(LicenseReconciliation::Assigned {
            sku_id: assignment.sku_id,
        })
    }

    /// Removes the target SKU from the user
    ///
    /// A user who no longer holds it is reported, not failed.
    pub async fn revoke(&self, user: &UserEmail) -> Result<LicenseRevocation> {
        let sku_id = self.config.target_sku.clone();

        if self.dry_run {
            tracing::info!(user = %user, sku_id = %sku_id, "Dry run: would revoke license");
            return Ok(LicenseRevocation::Skipped { sku_id });
        }

        match self
            .directory
            .delete_assignment(&self.config.product_id, &sku_id, user.as_str())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    user = %user,
                    sku_id = %sku_id,
                    sku = self.config.target_label(),
                    "License revoked"
                );
                Ok(LicenseRevocation::Revoked { sku_id })
            }
            Err(OffboardError::NotFound(_)) => {
                tracing::warn!(user = %user, sku_id = %sku_id, "User did not hold the license");
                Ok(LicenseRevocation::NotAssigned { sku_id })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeLicenseDirectory;

    const TARGET: &str = "1010020026";
    const ARCHIVE: &str = "1010340004";

    fn user() -> UserEmail {
        UserEmail::new("a@x.com").unwrap()
    }

    fn reconciler(directory: Arc<FakeLicenseDirectory>, dry_run: bool) -> LicenseReconciler {
        LicenseReconciler::new(directory, LicenseConfig::default(), dry_run)
    }

    #[tokio::test]
    async fn test_unlicensed_user_gets_target_once() {
        let directory = Arc::new(FakeLicenseDirectory::new());
        let outcome = reconciler(directory.clone(), false)
            .check_and_fix(&user())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            LicenseReconciliation::Assigned {
                sku_id: TARGET.to_string()
            }
        );
        assert_eq!(directory.inserts(), vec![TARGET.to_string()]);
    }

    #[tokio::test]
    async fn test_user_with_target_sku_is_untouched() {
        let directory = Arc::new(FakeLicenseDirectory::new().with_assignment(TARGET, "a@x.com"));
        let outcome = reconciler(directory.clone(), false)
            .check_and_fix(&user())
            .await
            .unwrap();

        assert!(!outcome.changed());
        assert!(directory.inserts().is_empty());
    }

    #[tokio::test]
    async fn test_user_with_other_tracked_sku_is_untouched() {
        let directory = Arc::new(FakeLicenseDirectory::new().with_assignment(ARCHIVE, "a@x.com"));
        let outcome = reconciler(directory.clone(), false)
            .check_and_fix(&user())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            LicenseReconciliation::AlreadyLicensed {
                sku_id: ARCHIVE.to_string()
            }
        );
        assert!(directory.inserts().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_fatal() {
        let directory = Arc::new(FakeLicenseDirectory::new().failing_lookups());
        let err = reconciler(directory.clone(), false)
            .check_and_fix(&user())
            .await
            .unwrap_err();

        assert!(matches!(err, OffboardError::Authorization(_)));
        assert!(directory.inserts().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_does_not_insert() {
        let directory = Arc::new(FakeLicenseDirectory::new());
        let outcome = reconciler(directory.clone(), true)
            .check_and_fix(&user())
            .await
            .unwrap();

        assert!(matches!(outcome, LicenseReconciliation::WouldAssign { .. }));
        assert!(directory.inserts().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_removes_target() {
        let directory = Arc::new(FakeLicenseDirectory::new().with_assignment(TARGET, "a@x.com"));
        let outcome = reconciler(directory.clone(), false).revoke(&user()).await.unwrap();

        assert!(matches!(outcome, LicenseRevocation::Revoked { .. }));
        assert_eq!(directory.deletes(), vec![TARGET.to_string()]);
    }

    #[tokio::test]
    async fn test_revoke_missing_assignment_is_soft() {
        let directory = Arc::new(FakeLicenseDirectory::new());
        let outcome = reconciler(directory, false).revoke(&user()).await.unwrap();
        assert!(matches!(outcome, LicenseRevocation::NotAssigned { .. }));
    }
}
