//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pipeline definition
///
/// The persisted unit of work: a named graph of plugin nodes plus the
/// metadata the backend maintains around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Substitution parameters resolved by the execution engine; opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Pipeline lifecycle status, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    #[default]
    Draft,
    Active,
    Inactive,
    Archived,
}

/// A vertex of the pipeline graph: one configured plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    /// Fixed at creation; changing a node's role is modeled as delete+add.
    #[serde(rename = "type")]
    pub role: NodeRole,
    pub plugin_type: String,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
    pub position: Position,
}

/// Node role within the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeRole {
    Source,
    Transformer,
    Target,
}

impl NodeRole {
    /// Whether nodes of this role expose an input port.
    pub fn accepts_input(self) -> bool {
        !matches!(self, NodeRole::Source)
    }

    /// Whether nodes of this role expose an output port.
    pub fn emits_output(self) -> bool {
        !matches!(self, NodeRole::Target)
    }
}

/// Canvas position, layout-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Derive the edge id for an ordered endpoint pair.
    ///
    /// Identity is a function of the endpoints alone, so at most one edge
    /// can exist per ordered pair; reconnecting replaces it.
    pub fn derived_id(source_node_id: &str, target_node_id: &str) -> String {
        format!("edge-{}-{}", source_node_id, target_node_id)
    }

    /// Build an edge between two nodes, deriving its id.
    pub fn between(
        source_node_id: impl Into<String>,
        target_node_id: impl Into<String>,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        let source_node_id = source_node_id.into();
        let target_node_id = target_node_id.into();
        Self {
            id: Self::derived_id(&source_node_id, &target_node_id),
            source_node_id,
            target_node_id,
            source_handle,
            target_handle,
        }
    }
}
