use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::schemas::Organization;

/// Realms (landlord organizations) the signed-in user belongs to, with the
/// currently selected one driving locale and currency for every page.
#[derive(Debug)]
pub struct OrganizationStore {
    client: Arc<ApiClient>,
    items: Vec<Organization>,
    selected_id: Option<String>,
}

impl OrganizationStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            items: Vec::new(),
            selected_id: None,
        }
    }

    pub fn items(&self) -> &[Organization] {
        &self.items
    }

    /// Fetch the realms; when exactly one exists it becomes selected.
    pub async fn fetch(&mut self) -> Result<&[Organization]> {
        self.items = self.client.get_json("/realms").await?;
        tracing::debug!(count = self.items.len(), "Fetched realms");
        if self.items.len() == 1 {
            self.selected_id = Some(self.items[0].id.clone());
        } else if let Some(selected) = self.selected_id.clone() {
            if !self.items.iter().any(|org| org.id == selected) {
                self.selected_id = None;
            }
        }
        Ok(&self.items)
    }

    pub fn select(&mut self, organization_id: &str) -> Result<&Organization> {
        let found = self
            .items
            .iter()
            .find(|org| org.id == organization_id)
            .ok_or_else(|| Error::NotFound(format!("unknown realm {organization_id}")))?;
        self.selected_id = Some(found.id.clone());
        tracing::info!(realm = %found.name, "Realm selected");
        Ok(found)
    }

    pub fn selected(&self) -> Option<&Organization> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|org| org.id == id)
    }

    pub async fn create(&mut self, payload: &Value) -> Result<&Organization> {
        let organization: Organization = self.client.post_json("/realms", payload).await?;
        self.items.push(organization);
        let created = self.items.last().expect("just pushed");
        Ok(created)
    }

    pub async fn update(&mut self, organization_id: &str, payload: &Value) -> Result<&Organization> {
        let organization: Organization = self
            .client
            .put_json(&format!("/realms/{organization_id}"), payload)
            .await?;
        match self.items.iter().position(|org| org.id == organization.id) {
            Some(index) => {
                self.items[index] = organization;
                Ok(&self.items[index])
            }
            None => {
                self.items.push(organization);
                Ok(self.items.last().expect("just pushed"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn store_with(orgs: Vec<Organization>) -> OrganizationStore {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let mut store = OrganizationStore::new(client);
        store.items = orgs;
        store
    }

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn selecting_unknown_realm_fails() {
        let mut store = store_with(vec![org("1", "Main")]);
        assert!(matches!(store.select("nope"), Err(Error::NotFound(_))));
        assert!(store.select("1").is_ok());
        assert_eq!(store.selected().unwrap().id, "1");
    }
}
