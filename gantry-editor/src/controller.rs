//! Selection and editing controller
//!
//! The single source of truth for which node is being edited, and the
//! funnel through which configuration and structural edits reach the
//! graph. Edits are committed explicitly; switching selection never
//! auto-saves.

use async_trait::async_trait;
use gantry_core::domain::pipeline::{Node, NodeRole, Position};
use gantry_core::domain::schema::ConfigSchema;
use gantry_core::dto::connector::{TestConnectionRequest, TestConnectionResponse};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{EditorError, FieldError};
use crate::forms::{self, FormBinding};
use crate::graph::{Graph, NodePatch};

/// Remote schema collaborator, keyed by plugin type.
#[async_trait]
pub trait SchemaService {
    async fn connector_schema(&self, plugin_type: &str) -> anyhow::Result<ConfigSchema>;
    async fn transformer_schema(&self, plugin_type: &str) -> anyhow::Result<ConfigSchema>;
}

/// Remote connectivity probe for connector configurations.
#[async_trait]
pub trait ConnectorProbe {
    async fn test_connection(
        &self,
        request: TestConnectionRequest,
    ) -> anyhow::Result<TestConnectionResponse>;
}

/// Spawn region for freshly created nodes, matching the canvas viewport
/// area new nodes are scattered over.
const SPAWN_ORIGIN: f64 = 100.0;
const SPAWN_SPREAD: f64 = 200.0;

/// Selection state plus the schema resolved for it.
#[derive(Debug, Default)]
pub struct Controller {
    selected: Option<String>,
    active_schema: Option<ConfigSchema>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected node id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Schema resolved for the current selection, if any.
    pub fn active_schema(&self) -> Option<&ConfigSchema> {
        self.active_schema.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.active_schema = None;
    }

    /// Switch selection, resolving the new node's schema.
    ///
    /// On `SchemaUnavailable` the selection sticks but no schema (and thus
    /// no form) is active; prior unsaved edits are simply dropped, since
    /// commits only happen explicitly.
    pub async fn select(
        &mut self,
        graph: &Graph,
        id: Option<&str>,
        schemas: &(impl SchemaService + ?Sized),
    ) -> Result<Option<FormBinding>, EditorError> {
        let Some(id) = id else {
            self.clear_selection();
            return Ok(None);
        };

        let node = graph
            .node(id)
            .ok_or_else(|| crate::error::GraphError::NodeNotFound(id.to_string()))?;
        self.selected = Some(id.to_string());
        self.active_schema = None;

        let schema = resolve_schema(schemas, node.role, &node.plugin_type).await?;
        let binding = forms::bind(&schema, node);
        self.active_schema = Some(schema);
        Ok(Some(binding))
    }

    /// Validate and commit edited configuration for a node.
    ///
    /// On validation failure nothing is mutated and the field errors are
    /// returned for display.
    pub fn commit_config(
        &self,
        graph: &mut Graph,
        id: &str,
        display_name: &str,
        values: &HashMap<String, Value>,
    ) -> Result<(), EditorError> {
        let schema = self.schema_for(graph, id)?;

        let mut errors = Vec::new();
        if display_name.trim().is_empty() {
            errors.push(FieldError::new("name", "Node name is required"));
        }
        let config = match forms::validate(schema, values) {
            Ok(config) => Some(config),
            Err(mut field_errors) => {
                errors.append(&mut field_errors);
                None
            }
        };
        if !errors.is_empty() {
            return Err(EditorError::Validation(errors));
        }

        graph.update_node(
            id,
            NodePatch {
                name: Some(display_name.to_string()),
                config,
                ..NodePatch::default()
            },
        )?;
        debug!(node = %id, "configuration committed");
        Ok(())
    }

    /// Validate a candidate configuration and probe connectivity with it.
    ///
    /// Only meaningful for connector-backed nodes; transformers are
    /// rejected before any validation happens.
    pub async fn test_connection(
        &self,
        graph: &Graph,
        id: &str,
        values: &HashMap<String, Value>,
        probe: &(impl ConnectorProbe + ?Sized),
    ) -> Result<TestConnectionResponse, EditorError> {
        let node = graph
            .node(id)
            .ok_or_else(|| crate::error::GraphError::NodeNotFound(id.to_string()))?;
        if node.role == NodeRole::Transformer {
            return Err(EditorError::NotProbeable(id.to_string()));
        }

        let schema = self.schema_for(graph, id)?;
        let config = forms::validate(schema, values).map_err(EditorError::Validation)?;

        let request = TestConnectionRequest {
            plugin_type: node.plugin_type.clone(),
            config,
        };
        probe
            .test_connection(request)
            .await
            .map_err(EditorError::Probe)
    }

    /// Create a node with generated id, numbered name, empty config, and
    /// a randomized spawn position.
    pub fn create_node(
        &self,
        graph: &mut Graph,
        role: NodeRole,
        plugin_type: &str,
        display_name: &str,
    ) -> Result<Node, EditorError> {
        let ordinal = graph
            .nodes()
            .iter()
            .filter(|n| n.plugin_type == plugin_type)
            .count()
            + 1;

        let node = Node {
            id: format!("node-{}", Uuid::new_v4()),
            name: format!("{} {}", display_name, ordinal),
            role,
            plugin_type: plugin_type.to_string(),
            config: HashMap::new(),
            position: Position {
                x: SPAWN_ORIGIN + fastrand::f64() * SPAWN_SPREAD,
                y: SPAWN_ORIGIN + fastrand::f64() * SPAWN_SPREAD,
            },
        };
        graph.add_node(node.clone())?;
        Ok(node)
    }

    /// Remove a node, clearing the selection if it pointed at it.
    pub fn delete_node(&mut self, graph: &mut Graph, id: &str) -> Option<Node> {
        let removed = graph.remove_node(id);
        if removed.is_some() && self.selected.as_deref() == Some(id) {
            self.clear_selection();
        }
        removed
    }

    /// Remove the currently selected node.
    pub fn delete_selected(&mut self, graph: &mut Graph) -> Option<Node> {
        let id = self.selected.clone()?;
        self.delete_node(graph, &id)
    }

    fn schema_for(&self, graph: &Graph, id: &str) -> Result<&ConfigSchema, EditorError> {
        if self.selected.as_deref() != Some(id) {
            return Err(schema_missing(graph, id));
        }
        self.active_schema
            .as_ref()
            .ok_or_else(|| schema_missing(graph, id))
    }
}

async fn resolve_schema(
    schemas: &(impl SchemaService + ?Sized),
    role: NodeRole,
    plugin_type: &str,
) -> Result<ConfigSchema, EditorError> {
    let result = match role {
        NodeRole::Transformer => schemas.transformer_schema(plugin_type).await,
        NodeRole::Source | NodeRole::Target => schemas.connector_schema(plugin_type).await,
    };
    result.map_err(|source| EditorError::SchemaUnavailable {
        plugin_type: plugin_type.to_string(),
        source,
    })
}

fn schema_missing(graph: &Graph, id: &str) -> EditorError {
    let plugin_type = graph
        .node(id)
        .map(|n| n.plugin_type.clone())
        .unwrap_or_default();
    EditorError::SchemaUnavailable {
        plugin_type,
        source: anyhow::anyhow!("no schema resolved for node '{}'", id),
    }
}
