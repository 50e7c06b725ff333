//! Pipeline persistence and execution endpoints

use crate::BackendClient;
use crate::error::Result;
use gantry_core::domain::execution::ExecutionResult;
use gantry_core::domain::pipeline::Pipeline;
use gantry_core::dto::pipeline::CreatePipelineRequest;

impl BackendClient {
    // =============================================================================
    // Pipeline Persistence
    // =============================================================================

    /// List all pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = format!("{}/pipelines", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a full pipeline definition by id
    pub async fn get_pipeline(&self, id: &str) -> Result<Pipeline> {
        let url = format!("{}/pipelines/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Create a new pipeline
    ///
    /// # Returns
    /// The created pipeline, with backend-assigned id and status
    pub async fn create_pipeline(&self, req: CreatePipelineRequest) -> Result<Pipeline> {
        let url = format!("{}/pipelines", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Update a pipeline definition, keyed by its id
    ///
    /// # Returns
    /// The stored pipeline, with a fresh `updatedAt`
    pub async fn update_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<Pipeline> {
        let url = format!("{}/pipelines/{}", self.base_url, id);
        let response = self.client.put(&url).json(pipeline).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, id: &str) -> Result<()> {
        let url = format!("{}/pipelines/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Pipeline Execution
    // =============================================================================

    /// Request execution of the persisted definition
    ///
    /// The backend runs against the stored copy; callers are expected to
    /// save first (the session orchestrator enforces this ordering).
    pub async fn execute_pipeline(&self, id: &str) -> Result<ExecutionResult> {
        let url = format!("{}/pipelines/{}/execute", self.base_url, id);
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    /// Execution history for a pipeline
    pub async fn list_executions(&self, id: &str) -> Result<Vec<ExecutionResult>> {
        let url = format!("{}/pipelines/{}/executions", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
