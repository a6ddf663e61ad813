use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::Result;
use crate::schemas::{Template, TemplateField};

/// Contract and letter templates. The rich-text document trees inside are
/// opaque blobs here; only the catalog, its linkage and the merge-field
/// list the editor inserts from are managed.
#[derive(Debug)]
pub struct TemplateStore {
    client: Arc<ApiClient>,
    items: Vec<Template>,
    fields: Vec<TemplateField>,
    selected_id: Option<String>,
}

impl TemplateStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            items: Vec::new(),
            fields: Vec::new(),
            selected_id: None,
        }
    }

    pub fn items(&self) -> &[Template] {
        &self.items
    }

    pub async fn fetch(&mut self) -> Result<&[Template]> {
        self.items = self.client.get_json("/templates").await?;
        tracing::debug!(count = self.items.len(), "Fetched templates");
        Ok(&self.items)
    }

    /// Fetch the merge fields templates may reference (tenant name,
    /// property address, rent amount, ...). Server-owned like everything
    /// else; the editor only reads markers from this list.
    pub async fn fetch_fields(&mut self) -> Result<&[TemplateField]> {
        self.fields = self.client.get_json("/templates/fields").await?;
        tracing::debug!(count = self.fields.len(), "Fetched template fields");
        Ok(&self.fields)
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    pub fn field(&self, marker: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|field| field.marker == marker)
    }

    pub fn of_type<'a>(&'a self, template_type: &str) -> Vec<&'a Template> {
        self.items
            .iter()
            .filter(|template| template.template_type.as_deref() == Some(template_type))
            .collect()
    }

    /// Templates linked to a given lease (used when a tenant signs up for
    /// that lease and contract documents get generated).
    pub fn linked_to<'a>(&'a self, resource_id: &str) -> Vec<&'a Template> {
        self.items
            .iter()
            .filter(|template| {
                template
                    .linked_resource_ids
                    .iter()
                    .any(|id| id == resource_id)
            })
            .collect()
    }

    pub fn select(&mut self, template_id: &str) -> Option<&Template> {
        let found = self.items.iter().find(|t| t.id == template_id)?;
        self.selected_id = Some(found.id.clone());
        Some(found)
    }

    pub fn selected(&self) -> Option<&Template> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|t| t.id == id)
    }

    pub async fn create(&mut self, payload: &Value) -> Result<&Template> {
        let template: Template = self.client.post_json("/templates", payload).await?;
        Ok(self.splice(template))
    }

    pub async fn update(&mut self, template_id: &str, payload: &Value) -> Result<&Template> {
        let template: Template = self
            .client
            .put_json(&format!("/templates/{template_id}"), payload)
            .await?;
        Ok(self.splice(template))
    }

    pub async fn remove(&mut self, template_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/templates/{template_id}"))
            .await?;
        self.items.retain(|t| t.id != template_id);
        if self.selected_id.as_deref() == Some(template_id) {
            self.selected_id = None;
        }
        Ok(())
    }

    fn splice(&mut self, template: Template) -> &Template {
        match self.items.iter().position(|item| item.id == template.id) {
            Some(index) => {
                self.items[index] = template;
                &self.items[index]
            }
            None => {
                self.items.push(template);
                self.items.last().expect("just pushed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn type_and_linkage_lookups() {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let mut store = TemplateStore::new(client);
        store.items = vec![
            Template {
                id: "1".to_string(),
                name: "Standard contract".to_string(),
                template_type: Some("contract".to_string()),
                linked_resource_ids: vec!["lease-369".to_string()],
                ..Default::default()
            },
            Template {
                id: "2".to_string(),
                name: "Late letter".to_string(),
                template_type: Some("letter".to_string()),
                ..Default::default()
            },
        ];
        assert_eq!(store.of_type("contract").len(), 1);
        assert_eq!(store.of_type("letter").len(), 1);
        assert_eq!(store.linked_to("lease-369").len(), 1);
        assert!(store.linked_to("lease-123").is_empty());
    }

    #[test]
    fn merge_fields_resolve_by_marker() {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let mut store = TemplateStore::new(client);
        assert!(store.fields().is_empty());

        store.fields = vec![
            TemplateField {
                marker: "tenant.name".to_string(),
                label: Some("Tenant name".to_string()),
                field_type: Some("text".to_string()),
            },
            TemplateField {
                marker: "rent.totalAmount".to_string(),
                label: None,
                field_type: Some("amount".to_string()),
            },
        ];
        assert_eq!(store.fields().len(), 2);
        assert_eq!(
            store.field("tenant.name").unwrap().label.as_deref(),
            Some("Tenant name")
        );
        assert!(store.field("tenant.unknown").is_none());
    }
}
