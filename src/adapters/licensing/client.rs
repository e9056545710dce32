//! Enterprise License Manager REST client

use super::LicenseDirectory;
use crate::adapters::http::{segment, send_checked, send_json, AuthorizedClient};
use crate::domain::{LicenseAssignment, OffboardError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

const SERVICE: &str = "Licensing";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertBody<'a> {
    user_id: &'a str,
}

/// License directory backed by `licensing.googleapis.com`
pub struct LicensingClient {
    client: AuthorizedClient,
    base_url: String,
}

impl LicensingClient {
    pub fn new(client: AuthorizedClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn sku_url(&self, product_id: &str, sku_id: &str) -> String {
        format!(
            "{}/apps/licensing/v1/product/{}/sku/{}/user",
            self.base_url,
            segment(product_id),
            segment(sku_id)
        )
    }

    fn assignment_url(&self, product_id: &str, sku_id: &str, user_id: &str) -> String {
        format!("{}/{}", self.sku_url(product_id, sku_id), segment(user_id))
    }
}

#[async_trait]
impl LicenseDirectory for LicensingClient {
    async fn get_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<Option<LicenseAssignment>> {
        let url = self.assignment_url(product_id, sku_id, user_id);
        tracing::debug!(sku_id, user = user_id, "Looking up license assignment");

        let request = self.client.request(Method::GET, &url).await?;
        match send_json::<LicenseAssignment>(SERVICE, request).await {
            Ok(assignment) => Ok(Some(assignment)),
            Err(OffboardError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert_assignment(
        &self,
        product_id: &str,
        sku_id: &str,
        user_id: &str,
    ) -> Result<LicenseAssignment> {
        let url = self.sku_url(product_id, sku_id);
        tracing::debug!(sku_id, user = user_id, "Inserting license assignment");

        let request = self
            .client
            .request(Method::POST, &url)
            .await?
            .json(&InsertBody { user_id });
        send_json(SERVICE, request).await
    }

    async fn delete_assignment(&self, product_id: &str, sku_id: &str, user_id: &str) -> Result<()> {
        let url = self.assignment_url(product_id, sku_id, user_id);
        tracing::debug!(sku_id, user = user_id, "Deleting license assignment");

        let request = self.client.request(Method::DELETE, &url).await?;
        send_checked(SERVICE, request).await?;
        Ok(())
    }
}
