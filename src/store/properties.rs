use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::Result;
use crate::schemas::Property;
use crate::services::search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFacet {
    Vacant,
    Occupied,
}

#[derive(Debug)]
pub struct PropertyStore {
    client: Arc<ApiClient>,
    items: Vec<Property>,
    text: String,
    facet: Option<PropertyFacet>,
    selected_id: Option<String>,
}

impl PropertyStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            items: Vec::new(),
            text: String::new(),
            facet: None,
            selected_id: None,
        }
    }

    pub fn items(&self) -> &[Property] {
        &self.items
    }

    pub async fn fetch(&mut self) -> Result<&[Property]> {
        self.items = self.client.get_json("/properties").await?;
        tracing::debug!(count = self.items.len(), "Fetched properties");
        Ok(&self.items)
    }

    pub fn set_filter(&mut self, text: &str, facet: Option<PropertyFacet>) {
        self.text = search::fold(text);
        self.facet = facet;
    }

    pub fn filtered(&self) -> Vec<&Property> {
        self.items
            .iter()
            .filter(|property| match self.facet {
                Some(PropertyFacet::Vacant) => property.available,
                Some(PropertyFacet::Occupied) => !property.available,
                None => true,
            })
            .filter(|property| search::property_matches(property, &self.text))
            .collect()
    }

    pub fn select(&mut self, property_id: &str) -> Option<&Property> {
        let found = self.items.iter().find(|p| p.id == property_id)?;
        self.selected_id = Some(found.id.clone());
        Some(found)
    }

    pub fn selected(&self) -> Option<&Property> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|p| p.id == id)
    }

    pub async fn create(&mut self, payload: &Value) -> Result<&Property> {
        let property: Property = self.client.post_json("/properties", payload).await?;
        tracing::info!(property = %property.name, "Property created");
        Ok(self.splice(property))
    }

    pub async fn update(&mut self, property_id: &str, payload: &Value) -> Result<&Property> {
        let property: Property = self
            .client
            .put_json(&format!("/properties/{property_id}"), payload)
            .await?;
        Ok(self.splice(property))
    }

    pub async fn remove(&mut self, property_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/properties/{property_id}"))
            .await?;
        self.items.retain(|p| p.id != property_id);
        if self.selected_id.as_deref() == Some(property_id) {
            self.selected_id = None;
        }
        Ok(())
    }

    fn splice(&mut self, property: Property) -> &Property {
        match self.items.iter().position(|item| item.id == property.id) {
            Some(index) => {
                self.items[index] = property;
                &self.items[index]
            }
            None => {
                self.items.push(property);
                self.items.last().expect("just pushed")
            }
        }
    }
}
