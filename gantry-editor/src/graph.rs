//! Pipeline graph model
//!
//! One pipeline's nodes and edges behind a single mutation entry point.
//! Every operation either applies completely or leaves the graph
//! untouched; edges can never dangle because removal cascades in the same
//! operation that drops the node.

use gantry_core::domain::pipeline::{Edge, Node, Position};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::GraphError;

/// The canonical directed graph for one pipeline.
///
/// Nodes and edges keep insertion order, which is also the order they are
/// persisted in.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// An owned, immutable copy of the graph, handed to the canvas adapter
/// and the session orchestrator.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Non-structural changes mergeable into an existing node.
///
/// Role and plugin type are deliberately absent: changing either is
/// modeled as delete+add, because edge direction validity depends on role.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub name: Option<String>,
    pub config: Option<HashMap<String, Value>>,
    pub position: Option<Position>,
}

impl NodePatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole graph, e.g. when a pipeline is opened.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Insert a node with a caller-supplied id.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        debug!(node = %node.id, role = ?node.role, "node added");
        self.nodes.push(node);
        Ok(())
    }

    /// Merge non-structural changes into an existing node.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            node.name = name;
        }
        if let Some(config) = patch.config {
            node.config = config;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        Ok(())
    }

    /// Remove a node and, atomically, every edge incident to it.
    ///
    /// Absent ids are a no-op; removal is idempotent.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);
        self.edges
            .retain(|e| e.source_node_id != id && e.target_node_id != id);
        debug!(node = %id, "node removed with incident edges");
        Some(node)
    }

    /// Connect two nodes, inserting or replacing the edge for that
    /// ordered pair.
    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Result<Edge, GraphError> {
        let source = self
            .node(source_id)
            .ok_or_else(|| GraphError::InvalidEndpoint(source_id.to_string()))?;
        let target = self
            .node(target_id)
            .ok_or_else(|| GraphError::InvalidEndpoint(target_id.to_string()))?;

        if source_id == target_id {
            return Err(GraphError::SelfLoop(source_id.to_string()));
        }

        if !source.role.emits_output() {
            return Err(GraphError::InvalidDirection {
                source_role: source.role,
                target_role: target.role,
                reason: "a TARGET node has no output port",
            });
        }
        if !target.role.accepts_input() {
            return Err(GraphError::InvalidDirection {
                source_role: source.role,
                target_role: target.role,
                reason: "a SOURCE node has no input port",
            });
        }

        let edge = Edge::between(source_id, target_id, source_handle, target_handle);
        match self.edges.iter_mut().find(|e| e.id == edge.id) {
            // Identity derives from the endpoint pair, so a reconnect
            // replaces the existing edge's handles instead of duplicating.
            Some(existing) => *existing = edge.clone(),
            None => self.edges.push(edge.clone()),
        }
        debug!(edge = %edge.id, "edge connected");
        Ok(edge)
    }

    /// Remove an edge; absent ids are a no-op.
    pub fn disconnect(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        before != self.edges.len()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}
