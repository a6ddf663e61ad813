pub mod dashboard;
pub mod documents;
pub mod leases;
pub mod organizations;
pub mod properties;
pub mod rents;
pub mod templates;
pub mod tenants;

use std::sync::Arc;

use crate::api::ApiClient;

/// The client-side mirror of server state: one sub-store per collection,
/// all sharing a single API client. Everything in here is a cache the
/// server may invalidate at any time.
#[derive(Debug)]
pub struct Store {
    client: Arc<ApiClient>,
    pub organizations: organizations::OrganizationStore,
    pub tenants: tenants::TenantStore,
    pub properties: properties::PropertyStore,
    pub leases: leases::LeaseStore,
    pub rents: rents::RentStore,
    pub templates: templates::TemplateStore,
    pub dashboard: dashboard::DashboardStore,
    pub documents: documents::DocumentStore,
}

impl Store {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            organizations: organizations::OrganizationStore::new(client.clone()),
            tenants: tenants::TenantStore::new(client.clone()),
            properties: properties::PropertyStore::new(client.clone()),
            leases: leases::LeaseStore::new(client.clone()),
            rents: rents::RentStore::new(client.clone()),
            templates: templates::TemplateStore::new(client.clone()),
            dashboard: dashboard::DashboardStore::new(client.clone()),
            documents: documents::DocumentStore::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }
}
