use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::Result;
use crate::schemas::Tenant;
use crate::services::search;

/// Lease-state facet of the tenant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantFacet {
    InProgress,
    Stopped,
}

#[derive(Debug)]
pub struct TenantStore {
    client: Arc<ApiClient>,
    items: Vec<Tenant>,
    text: String,
    facet: Option<TenantFacet>,
    selected_id: Option<String>,
}

impl TenantStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            items: Vec::new(),
            text: String::new(),
            facet: None,
            selected_id: None,
        }
    }

    pub fn items(&self) -> &[Tenant] {
        &self.items
    }

    pub async fn fetch(&mut self) -> Result<&[Tenant]> {
        self.items = self.client.get_json("/tenants").await?;
        tracing::debug!(count = self.items.len(), "Fetched tenants");
        Ok(&self.items)
    }

    pub fn set_filter(&mut self, text: &str, facet: Option<TenantFacet>) {
        self.text = search::fold(text);
        self.facet = facet;
    }

    pub fn filtered(&self) -> Vec<&Tenant> {
        self.filtered_at(Utc::now().date_naive())
    }

    /// Facet first, then folded text, fetch order preserved.
    pub fn filtered_at(&self, today: NaiveDate) -> Vec<&Tenant> {
        self.items
            .iter()
            .filter(|tenant| match self.facet {
                Some(TenantFacet::InProgress) => !tenant.lease_ended(today),
                Some(TenantFacet::Stopped) => tenant.lease_ended(today),
                None => true,
            })
            .filter(|tenant| search::tenant_matches(tenant, &self.text))
            .collect()
    }

    pub fn select(&mut self, tenant_id: &str) -> Option<&Tenant> {
        let found = self.items.iter().find(|tenant| tenant.id == tenant_id)?;
        self.selected_id = Some(found.id.clone());
        Some(found)
    }

    pub fn selected(&self) -> Option<&Tenant> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|tenant| tenant.id == id)
    }

    pub async fn create(&mut self, payload: &Value) -> Result<&Tenant> {
        let tenant: Tenant = self.client.post_json("/tenants", payload).await?;
        tracing::info!(tenant = %tenant.name, "Tenant created");
        Ok(self.splice(tenant))
    }

    pub async fn update(&mut self, tenant_id: &str, payload: &Value) -> Result<&Tenant> {
        let tenant: Tenant = self
            .client
            .put_json(&format!("/tenants/{tenant_id}"), payload)
            .await?;
        Ok(self.splice(tenant))
    }

    pub async fn remove(&mut self, tenant_id: &str) -> Result<()> {
        self.client.delete(&format!("/tenants/{tenant_id}")).await?;
        self.items.retain(|tenant| tenant.id != tenant_id);
        if self.selected_id.as_deref() == Some(tenant_id) {
            self.selected_id = None;
        }
        Ok(())
    }

    fn splice(&mut self, tenant: Tenant) -> &Tenant {
        match self.items.iter().position(|item| item.id == tenant.id) {
            Some(index) => {
                self.items[index] = tenant;
                &self.items[index]
            }
            None => {
                self.items.push(tenant);
                self.items.last().expect("just pushed")
            }
        }
    }
}
