use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::Result;
use crate::schemas::DashboardData;

#[derive(Debug)]
pub struct DashboardStore {
    client: Arc<ApiClient>,
    data: Option<DashboardData>,
}

impl DashboardStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client, data: None }
    }

    pub async fn fetch(&mut self) -> Result<&DashboardData> {
        let data: DashboardData = self.client.get_json("/dashboard").await?;
        tracing::debug!(
            tenants = data.overview.tenant_count,
            properties = data.overview.property_count,
            "Fetched dashboard"
        );
        self.data = Some(data);
        Ok(self.data.as_ref().expect("just set"))
    }

    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }
}
