//! Connector catalog endpoints

use crate::BackendClient;
use crate::error::Result;
use gantry_core::domain::catalog::ConnectorInfo;
use gantry_core::domain::schema::ConfigSchema;
use gantry_core::dto::connector::{TestConnectionRequest, TestConnectionResponse};

impl BackendClient {
    /// List all available connectors
    pub async fn list_connectors(&self) -> Result<Vec<ConnectorInfo>> {
        let url = format!("{}/connectors", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Config schema for one connector type
    pub async fn connector_schema(&self, plugin_type: &str) -> Result<ConfigSchema> {
        let url = format!("{}/connectors/{}/schema", self.base_url, plugin_type);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Probe connectivity with a candidate configuration
    pub async fn test_connection(
        &self,
        req: &TestConnectionRequest,
    ) -> Result<TestConnectionResponse> {
        let url = format!("{}/connectors/test", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }
}
