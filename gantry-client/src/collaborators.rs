//! Editor collaborator implementations
//!
//! The editor core defines the ports it needs (catalog, schemas,
//! connectivity probe, pipeline store); this module adapts
//! [`BackendClient`] to all four, so wiring the real backend in is a
//! single client value.

use async_trait::async_trait;
use gantry_core::domain::catalog::{ConnectorInfo, TransformerInfo};
use gantry_core::domain::execution::ExecutionResult;
use gantry_core::domain::pipeline::Pipeline;
use gantry_core::domain::schema::ConfigSchema;
use gantry_core::dto::connector::{TestConnectionRequest, TestConnectionResponse};
use gantry_core::dto::pipeline::CreatePipelineRequest;
use gantry_editor::catalog::CatalogService;
use gantry_editor::controller::{ConnectorProbe, SchemaService};
use gantry_editor::session::PipelineStore;

use crate::BackendClient;

#[async_trait]
impl CatalogService for BackendClient {
    async fn list_connectors(&self) -> anyhow::Result<Vec<ConnectorInfo>> {
        Ok(BackendClient::list_connectors(self).await?)
    }

    async fn list_transformers(&self) -> anyhow::Result<Vec<TransformerInfo>> {
        Ok(BackendClient::list_transformers(self).await?)
    }
}

#[async_trait]
impl SchemaService for BackendClient {
    async fn connector_schema(&self, plugin_type: &str) -> anyhow::Result<ConfigSchema> {
        Ok(BackendClient::connector_schema(self, plugin_type).await?)
    }

    async fn transformer_schema(&self, plugin_type: &str) -> anyhow::Result<ConfigSchema> {
        Ok(BackendClient::transformer_schema(self, plugin_type).await?)
    }
}

#[async_trait]
impl ConnectorProbe for BackendClient {
    async fn test_connection(
        &self,
        request: TestConnectionRequest,
    ) -> anyhow::Result<TestConnectionResponse> {
        Ok(BackendClient::test_connection(self, &request).await?)
    }
}

#[async_trait]
impl PipelineStore for BackendClient {
    async fn list(&self) -> anyhow::Result<Vec<Pipeline>> {
        Ok(self.list_pipelines().await?)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Pipeline> {
        Ok(self.get_pipeline(id).await?)
    }

    async fn create(&self, request: CreatePipelineRequest) -> anyhow::Result<Pipeline> {
        Ok(self.create_pipeline(request).await?)
    }

    async fn update(&self, id: &str, pipeline: &Pipeline) -> anyhow::Result<Pipeline> {
        Ok(self.update_pipeline(id, pipeline).await?)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        Ok(self.delete_pipeline(id).await?)
    }

    async fn execute(&self, id: &str) -> anyhow::Result<ExecutionResult> {
        Ok(self.execute_pipeline(id).await?)
    }

    async fn executions(&self, id: &str) -> anyhow::Result<Vec<ExecutionResult>> {
        Ok(self.list_executions(id).await?)
    }
}
