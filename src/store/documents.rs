use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::{Error, Result};

/// Access to generated documents (contracts, notices, receipts). The server
/// owns rendering; the client only addresses and downloads them.
#[derive(Debug)]
pub struct DocumentStore {
    client: Arc<ApiClient>,
}

impl DocumentStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// API path of a rendered document, e.g.
    /// `document_path("rentcall", "tenant-1", "202608")`.
    pub fn document_path(&self, document: &str, tenant_id: &str, term: &str) -> Result<String> {
        for (label, value) in [
            ("document", document),
            ("tenant id", tenant_id),
            ("term", term),
        ] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(Error::Validation(format!("invalid {label} '{value}'")));
            }
        }
        Ok(format!("/documents/{document}/{tenant_id}/{term}"))
    }

    pub async fn download(&self, document: &str, tenant_id: &str, term: &str) -> Result<Vec<u8>> {
        let path = self.document_path(document, tenant_id, term)?;
        let bytes = self.client.download(&path).await?;
        tracing::debug!(path, size = bytes.len(), "Downloaded document");
        Ok(bytes)
    }

    /// Upload a scanned or signed document against a tenant's term. The
    /// bytes pass through untouched; the server stores and indexes them.
    pub async fn upload(
        &self,
        document: &str,
        tenant_id: &str,
        term: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<serde_json::Value> {
        let path = self.document_path(document, tenant_id, term)?;
        let uploaded = self
            .client
            .upload(&path, file_name, content_type, bytes)
            .await?;
        tracing::info!(path, file_name, "Uploaded document");
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn builds_and_rejects_paths() {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let store = DocumentStore::new(client);
        assert_eq!(
            store.document_path("rentcall", "t1", "202608").unwrap(),
            "/documents/rentcall/t1/202608"
        );
        assert!(store.document_path("", "t1", "202608").is_err());
        assert!(store.document_path("a/b", "t1", "202608").is_err());
    }

    #[tokio::test]
    async fn upload_rejects_bad_arguments_before_any_request() {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let store = DocumentStore::new(client);

        let result = store
            .upload("scan", "t1", "202608", "", "application/pdf", vec![1, 2, 3])
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = store
            .upload("a/b", "t1", "202608", "scan.pdf", "application/pdf", vec![])
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
