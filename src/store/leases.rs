use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::schemas::Lease;

/// Lease contract catalog (duration templates tenants are attached to).
#[derive(Debug)]
pub struct LeaseStore {
    client: Arc<ApiClient>,
    items: Vec<Lease>,
    selected_id: Option<String>,
}

impl LeaseStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            items: Vec::new(),
            selected_id: None,
        }
    }

    pub fn items(&self) -> &[Lease] {
        &self.items
    }

    pub async fn fetch(&mut self) -> Result<&[Lease]> {
        self.items = self.client.get_json("/leases").await?;
        tracing::debug!(count = self.items.len(), "Fetched leases");
        Ok(&self.items)
    }

    pub fn select(&mut self, lease_id: &str) -> Option<&Lease> {
        let found = self.items.iter().find(|lease| lease.id == lease_id)?;
        self.selected_id = Some(found.id.clone());
        Some(found)
    }

    pub fn selected(&self) -> Option<&Lease> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|lease| lease.id == id)
    }

    pub async fn create(&mut self, payload: &Value) -> Result<&Lease> {
        let lease: Lease = self.client.post_json("/leases", payload).await?;
        Ok(self.splice(lease))
    }

    pub async fn update(&mut self, lease_id: &str, payload: &Value) -> Result<&Lease> {
        self.assert_editable(lease_id)?;
        let lease: Lease = self
            .client
            .put_json(&format!("/leases/{lease_id}"), payload)
            .await?;
        Ok(self.splice(lease))
    }

    /// System leases ship with the realm and cannot be removed.
    pub async fn remove(&mut self, lease_id: &str) -> Result<()> {
        self.assert_editable(lease_id)?;
        self.client.delete(&format!("/leases/{lease_id}")).await?;
        self.items.retain(|lease| lease.id != lease_id);
        if self.selected_id.as_deref() == Some(lease_id) {
            self.selected_id = None;
        }
        Ok(())
    }

    fn assert_editable(&self, lease_id: &str) -> Result<()> {
        let system = self
            .items
            .iter()
            .any(|lease| lease.id == lease_id && lease.system);
        if system {
            return Err(Error::Forbidden(
                "system leases cannot be modified".to_string(),
            ));
        }
        Ok(())
    }

    fn splice(&mut self, lease: Lease) -> &Lease {
        match self.items.iter().position(|item| item.id == lease.id) {
            Some(index) => {
                self.items[index] = lease;
                &self.items[index]
            }
            None => {
                self.items.push(lease);
                self.items.last().expect("just pushed")
            }
        }
    }
}
