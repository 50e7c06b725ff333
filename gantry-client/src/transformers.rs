//! Transformer catalog endpoints

use crate::BackendClient;
use crate::error::Result;
use gantry_core::domain::catalog::TransformerInfo;
use gantry_core::domain::schema::ConfigSchema;

impl BackendClient {
    /// List all available transformers
    pub async fn list_transformers(&self) -> Result<Vec<TransformerInfo>> {
        let url = format!("{}/transformers", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Config schema for one transformer type
    pub async fn transformer_schema(&self, plugin_type: &str) -> Result<ConfigSchema> {
        let url = format!("{}/transformers/{}/schema", self.base_url, plugin_type);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
