//! Pipeline session orchestrator
//!
//! Owns the current pipeline's lifecycle: create, open, save, execute,
//! delete. The one hard ordering contract lives here: execution always
//! re-saves the in-memory snapshot first, so the backend never runs a
//! stale definition.

use async_trait::async_trait;
use gantry_core::domain::execution::{ExecutionResult, ExecutionStatus};
use gantry_core::domain::pipeline::Pipeline;
use gantry_core::dto::pipeline::CreatePipelineRequest;
use tokio::time::{self, Duration};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::graph::Graph;

/// Persistence and execution collaborator (the remote backend).
#[async_trait]
pub trait PipelineStore {
    async fn list(&self) -> anyhow::Result<Vec<Pipeline>>;
    async fn get(&self, id: &str) -> anyhow::Result<Pipeline>;
    async fn create(&self, request: CreatePipelineRequest) -> anyhow::Result<Pipeline>;
    async fn update(&self, id: &str, pipeline: &Pipeline) -> anyhow::Result<Pipeline>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
    async fn execute(&self, id: &str) -> anyhow::Result<ExecutionResult>;
    async fn executions(&self, id: &str) -> anyhow::Result<Vec<ExecutionResult>>;
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoPipeline,
    Editing,
    Executing,
}

/// The current pipeline's editing session.
///
/// Owns the pipeline metadata and its graph exclusively; opening another
/// pipeline replaces both wholesale, never merges.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    /// Metadata of the current pipeline; its nodes/edges live in `graph`.
    pipeline: Option<Pipeline>,
    graph: Graph,
    poll_interval: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::NoPipeline,
            pipeline: None,
            graph: Graph::new(),
            poll_interval: Duration::from_secs(2),
        }
    }

    /// Override the executions poll interval (tests mostly).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Metadata of the current pipeline, if one is open.
    pub fn current(&self) -> Option<&Pipeline> {
        self.pipeline.as_ref()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// All pipelines known to the backend, for the open picker.
    pub async fn list(&self, store: &(impl PipelineStore + ?Sized)) -> Result<Vec<Pipeline>, SessionError> {
        store.list().await.map_err(SessionError::Persistence)
    }

    /// Create a new empty pipeline and make it current, discarding any
    /// prior in-memory graph.
    pub async fn create(
        &mut self,
        name: &str,
        description: Option<String>,
        store: &(impl PipelineStore + ?Sized),
    ) -> Result<&Pipeline, SessionError> {
        self.ensure_not_executing()?;

        let created = store
            .create(CreatePipelineRequest::empty(name, description))
            .await
            .map_err(SessionError::Persistence)?;

        info!(pipeline = %created.id, name = %created.name, "pipeline created");
        Ok(self.adopt(created))
    }

    /// Open a pipeline, replacing the current one wholesale.
    ///
    /// Unsaved edits to the previously open pipeline are lost; warning the
    /// user beforehand is the shell's concern.
    pub async fn open(
        &mut self,
        id: &str,
        store: &(impl PipelineStore + ?Sized),
    ) -> Result<&Pipeline, SessionError> {
        self.ensure_not_executing()?;

        let opened = store.get(id).await.map_err(SessionError::Persistence)?;
        info!(pipeline = %opened.id, name = %opened.name, "pipeline opened");
        Ok(self.adopt(opened))
    }

    /// Persist the current graph snapshot under the pipeline's id.
    pub async fn save(&mut self, store: &(impl PipelineStore + ?Sized)) -> Result<(), SessionError> {
        self.ensure_not_executing()?;
        let payload = self.persisted_payload().ok_or(SessionError::NoPipelineOpen)?;

        let stored = store
            .update(&payload.id, &payload)
            .await
            .map_err(SessionError::Persistence)?;

        info!(pipeline = %stored.id, nodes = stored.nodes.len(), "pipeline saved");
        self.adopt(stored);
        Ok(())
    }

    /// Save, then request execution, and wait for a terminal status.
    ///
    /// If the save fails the execution request is never sent. A transport
    /// failure after that point is rendered as a FAILED result rather
    /// than an error, since the run's real fate is unknown to us.
    pub async fn execute(
        &mut self,
        store: &(impl PipelineStore + ?Sized),
    ) -> Result<ExecutionResult, SessionError> {
        let id = match &self.pipeline {
            Some(pipeline) => pipeline.id.clone(),
            None => return Err(SessionError::NoPipelineOpen),
        };
        self.save(store).await?;

        self.state = SessionState::Executing;
        info!(pipeline = %id, "execution requested");
        let result = self.wait_for_terminal(&id, store).await;
        self.state = SessionState::Editing;

        if result.status == ExecutionStatus::Failed {
            warn!(
                pipeline = %id,
                error = result.error_message.as_deref().unwrap_or("unknown"),
                "execution failed"
            );
        } else {
            info!(pipeline = %id, status = ?result.status, "execution finished");
        }
        Ok(result)
    }

    /// Delete a pipeline; deleting the current one closes the session.
    pub async fn delete(
        &mut self,
        id: &str,
        store: &(impl PipelineStore + ?Sized),
    ) -> Result<(), SessionError> {
        self.ensure_not_executing()?;
        store.delete(id).await.map_err(SessionError::Persistence)?;
        info!(pipeline = %id, "pipeline deleted");

        if self.pipeline.as_ref().is_some_and(|p| p.id == id) {
            self.pipeline = None;
            self.graph = Graph::new();
            self.state = SessionState::NoPipeline;
        }
        Ok(())
    }

    /// The full persisted shape: current metadata plus the live graph.
    pub fn persisted_payload(&self) -> Option<Pipeline> {
        let mut payload = self.pipeline.clone()?;
        let snapshot = self.graph.snapshot();
        payload.nodes = snapshot.nodes;
        payload.edges = snapshot.edges;
        Some(payload)
    }

    fn ensure_not_executing(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Executing {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Make `pipeline` current: its graph moves into the model, the rest
    /// stays as metadata.
    fn adopt(&mut self, mut pipeline: Pipeline) -> &Pipeline {
        let nodes = std::mem::take(&mut pipeline.nodes);
        let edges = std::mem::take(&mut pipeline.edges);
        self.graph.replace(nodes, edges);
        self.state = SessionState::Editing;
        self.pipeline.insert(pipeline)
    }

    async fn wait_for_terminal(
        &self,
        id: &str,
        store: &(impl PipelineStore + ?Sized),
    ) -> ExecutionResult {
        let first = match store.execute(id).await {
            Ok(result) => result,
            Err(e) => return failed_result(id, e),
        };
        if first.status.is_terminal() {
            return first;
        }

        // The engine answered before the run settled; poll the execution
        // history until its status is terminal.
        let mut interval = time::interval(self.poll_interval);
        interval.tick().await;
        loop {
            interval.tick().await;

            let executions = match store.executions(id).await {
                Ok(executions) => executions,
                Err(e) => return failed_result(id, e),
            };
            match executions
                .into_iter()
                .find(|e| e.execution_id == first.execution_id)
            {
                Some(result) if result.status.is_terminal() => return result,
                _ => continue,
            }
        }
    }
}

/// Render a transport-level failure as a FAILED result for display.
fn failed_result(pipeline_id: &str, error: anyhow::Error) -> ExecutionResult {
    ExecutionResult {
        execution_id: String::new(),
        pipeline_id: pipeline_id.to_string(),
        status: ExecutionStatus::Failed,
        start_time: chrono::Utc::now(),
        end_time: None,
        total_records_processed: 0,
        node_results: Vec::new(),
        error_message: Some(format!("{error:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use gantry_core::domain::pipeline::{Edge, Node, NodeRole, PipelineStatus, Position};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory backend recording every call it receives.
    #[derive(Default)]
    struct RecordingStore {
        pipelines: Mutex<HashMap<String, Pipeline>>,
        calls: Mutex<Vec<String>>,
        next_id: AtomicUsize,
        fail_update: AtomicBool,
        execute_calls: AtomicUsize,
        /// Statuses the execute/executions endpoints hand out, in order.
        execution_statuses: Mutex<Vec<ExecutionStatus>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            let store = Self::default();
            store
                .execution_statuses
                .lock()
                .unwrap()
                .push(ExecutionStatus::Completed);
            store
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn next_status(&self) -> ExecutionStatus {
            let mut statuses = self.execution_statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            }
        }

        fn result(&self, pipeline_id: &str, status: ExecutionStatus) -> ExecutionResult {
            ExecutionResult {
                execution_id: "exec-1".to_string(),
                pipeline_id: pipeline_id.to_string(),
                status,
                start_time: chrono::Utc::now(),
                end_time: None,
                total_records_processed: 42,
                node_results: Vec::new(),
                error_message: None,
            }
        }
    }

    #[async_trait]
    impl PipelineStore for RecordingStore {
        async fn list(&self) -> anyhow::Result<Vec<Pipeline>> {
            self.log("list");
            Ok(self.pipelines.lock().unwrap().values().cloned().collect())
        }

        async fn get(&self, id: &str) -> anyhow::Result<Pipeline> {
            self.log(format!("get:{id}"));
            self.pipelines
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("pipeline '{id}' not found"))
        }

        async fn create(&self, request: CreatePipelineRequest) -> anyhow::Result<Pipeline> {
            let id = format!("p{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.log(format!("create:{id}"));
            let pipeline = Pipeline {
                id: id.clone(),
                name: request.name,
                description: request.description,
                nodes: request.nodes,
                edges: request.edges,
                variables: None,
                status: PipelineStatus::Draft,
                created_at: Some(chrono::Utc::now()),
                updated_at: Some(chrono::Utc::now()),
            };
            self.pipelines.lock().unwrap().insert(id, pipeline.clone());
            Ok(pipeline)
        }

        async fn update(&self, id: &str, pipeline: &Pipeline) -> anyhow::Result<Pipeline> {
            self.log(format!("update:{id}"));
            if self.fail_update.load(Ordering::SeqCst) {
                anyhow::bail!("backend rejected the update");
            }
            let mut stored = pipeline.clone();
            stored.updated_at = Some(chrono::Utc::now());
            self.pipelines
                .lock()
                .unwrap()
                .insert(id.to_string(), stored.clone());
            Ok(stored)
        }

        async fn delete(&self, id: &str) -> anyhow::Result<()> {
            self.log(format!("delete:{id}"));
            self.pipelines.lock().unwrap().remove(id);
            Ok(())
        }

        async fn execute(&self, id: &str) -> anyhow::Result<ExecutionResult> {
            self.log(format!("execute:{id}"));
            self.execute_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result(id, self.next_status()))
        }

        async fn executions(&self, id: &str) -> anyhow::Result<Vec<ExecutionResult>> {
            self.log(format!("executions:{id}"));
            Ok(vec![self.result(id, self.next_status())])
        }
    }

    fn node(id: &str, role: NodeRole) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            role,
            plugin_type: "csv".to_string(),
            config: HashMap::new(),
            position: Position { x: 0.0, y: 0.0 },
        }
    }

    #[tokio::test]
    async fn test_save_without_pipeline_fails_fast() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        assert!(matches!(
            session.save(&store).await,
            Err(SessionError::NoPipelineOpen)
        ));
        assert!(matches!(
            session.execute(&store).await,
            Err(SessionError::NoPipelineOpen)
        ));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_starts_editing_with_empty_graph() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        session
            .create("orders", Some("nightly".to_string()), &store)
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.current().unwrap().name, "orders");
        assert!(session.graph().is_empty());
    }

    #[tokio::test]
    async fn test_save_persists_current_snapshot() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        session.create("orders", None, &store).await.unwrap();

        session.graph_mut().add_node(node("src", NodeRole::Source)).unwrap();
        session.graph_mut().add_node(node("dst", NodeRole::Target)).unwrap();
        session.graph_mut().connect("src", "dst", None, None).unwrap();

        session.save(&store).await.unwrap();

        {
            let pipelines = store.pipelines.lock().unwrap();
            let stored = &pipelines["p1"];
            assert_eq!(stored.nodes.len(), 2);
            assert_eq!(stored.edges[0].id, Edge::derived_id("src", "dst"));
        }
        // The freshly stored copy becomes current metadata.
        assert!(session.current().unwrap().updated_at.is_some());
        assert_eq!(session.graph().nodes().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_save_blocks_execution() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        session.create("orders", None, &store).await.unwrap();

        store.fail_update.store(true, Ordering::SeqCst);
        let err = session.execute(&store).await.unwrap_err();

        assert!(matches!(err, SessionError::Persistence(_)));
        // The execution collaborator recorded zero calls.
        assert_eq!(store.execute_calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[tokio::test]
    async fn test_execute_saves_first_then_runs() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        session.create("orders", None, &store).await.unwrap();

        let result = session.execute(&store).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.total_records_processed, 42);
        assert_eq!(session.state(), SessionState::Editing);

        let calls = store.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["create:p1", "update:p1", "execute:p1"]);
    }

    #[tokio::test]
    async fn test_execute_polls_until_terminal() {
        let store = RecordingStore::new();
        *store.execution_statuses.lock().unwrap() = vec![
            ExecutionStatus::Pending,
            ExecutionStatus::Running,
            ExecutionStatus::Completed,
        ];

        let mut session = Session::new().with_poll_interval(Duration::from_millis(2));
        session.create("orders", None, &store).await.unwrap();

        let result = session.execute(&store).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(store.execute_calls.load(Ordering::SeqCst), 1);
        let polls = store
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("executions"))
            .count();
        assert_eq!(polls, 2);
    }

    #[tokio::test]
    async fn test_transport_failure_renders_as_failed_result() {
        struct BrokenExecute(RecordingStore);

        #[async_trait]
        impl PipelineStore for BrokenExecute {
            async fn list(&self) -> anyhow::Result<Vec<Pipeline>> {
                self.0.list().await
            }
            async fn get(&self, id: &str) -> anyhow::Result<Pipeline> {
                self.0.get(id).await
            }
            async fn create(&self, request: CreatePipelineRequest) -> anyhow::Result<Pipeline> {
                self.0.create(request).await
            }
            async fn update(&self, id: &str, pipeline: &Pipeline) -> anyhow::Result<Pipeline> {
                self.0.update(id, pipeline).await
            }
            async fn delete(&self, id: &str) -> anyhow::Result<()> {
                self.0.delete(id).await
            }
            async fn execute(&self, _id: &str) -> anyhow::Result<ExecutionResult> {
                anyhow::bail!("connection reset by peer")
            }
            async fn executions(&self, id: &str) -> anyhow::Result<Vec<ExecutionResult>> {
                self.0.executions(id).await
            }
        }

        let store = BrokenExecute(RecordingStore::new());
        let mut session = Session::new();
        session.create("orders", None, &store).await.unwrap();

        let result = session.execute(&store).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(
            result
                .error_message
                .as_deref()
                .unwrap()
                .contains("connection reset")
        );
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[tokio::test]
    async fn test_open_replaces_graph_wholesale() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        // Build and save "p1" with a two-node graph.
        session.create("p1", None, &store).await.unwrap();
        let controller = Controller::new();
        let src = controller
            .create_node(session.graph_mut(), NodeRole::Source, "csv", "CSV File")
            .unwrap();
        let dst = controller
            .create_node(session.graph_mut(), NodeRole::Target, "csv", "CSV File")
            .unwrap();
        session
            .graph_mut()
            .connect(&src.id, &dst.id, None, None)
            .unwrap();
        session.save(&store).await.unwrap();

        // A second pipeline exists with a different single-node graph.
        session.create("p2", None, &store).await.unwrap();
        session.graph_mut().add_node(node("only", NodeRole::Source)).unwrap();
        session.save(&store).await.unwrap();

        // Opening p2 after editing p1 yields exactly p2's graph, no merge.
        session.open("p1", &store).await.unwrap();
        assert_eq!(session.graph().nodes().len(), 2);
        session.open("p2", &store).await.unwrap();

        let ids: Vec<_> = session.graph().nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["only"]);
        assert!(session.graph().edges().is_empty());
        assert_eq!(session.current().unwrap().name, "p2");
    }

    #[tokio::test]
    async fn test_delete_current_closes_session() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        session.create("p1", None, &store).await.unwrap();
        session.create("p2", None, &store).await.unwrap();

        // Deleting a different pipeline leaves the session alone.
        session.delete("p1", &store).await.unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.current().unwrap().id, "p2");

        session.delete("p2", &store).await.unwrap();
        assert_eq!(session.state(), SessionState::NoPipeline);
        assert!(session.current().is_none());
        assert!(session.graph().is_empty());
    }

    #[tokio::test]
    async fn test_list_passthrough() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        session.create("p1", None, &store).await.unwrap();

        let pipelines = session.list(&store).await.unwrap();
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].name, "p1");
    }
}
