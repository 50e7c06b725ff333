//! Canvas adapter
//!
//! Translates graph snapshots into renderable scene elements and user
//! gestures back into graph mutations. The drawing surface itself is an
//! external collaborator; it only ever sees [`CanvasScene`] values and
//! emits [`Gesture`] values, never touching the graph's backing storage.

use gantry_core::domain::pipeline::{NodeRole, Position};
use serde::Serialize;

use crate::error::GraphError;
use crate::graph::{Graph, GraphSnapshot, NodePatch};

/// Accent color for a node role.
pub fn accent_color(role: NodeRole) -> &'static str {
    match role {
        NodeRole::Source => "#1890ff",
        NodeRole::Transformer => "#fa8c16",
        NodeRole::Target => "#52c41a",
    }
}

/// A node as the drawing surface renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: String,
    /// Display name.
    pub label: String,
    /// Plugin type, rendered under the label.
    pub sublabel: String,
    pub role: NodeRole,
    pub position: Position,
    pub selected: bool,
    pub has_input_port: bool,
    pub has_output_port: bool,
    pub accent_color: &'static str,
}

/// An edge as the drawing surface renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Everything the drawing surface needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasScene {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
}

/// Project a graph snapshot into a renderable scene.
pub fn scene(snapshot: &GraphSnapshot, selection: Option<&str>) -> CanvasScene {
    let nodes = snapshot
        .nodes
        .iter()
        .map(|node| CanvasNode {
            id: node.id.clone(),
            label: node.name.clone(),
            sublabel: node.plugin_type.clone(),
            role: node.role,
            position: node.position,
            selected: selection == Some(node.id.as_str()),
            has_input_port: node.role.accepts_input(),
            has_output_port: node.role.emits_output(),
            accent_color: accent_color(node.role),
        })
        .collect();

    let edges = snapshot
        .edges
        .iter()
        .map(|edge| CanvasEdge {
            id: edge.id.clone(),
            source: edge.source_node_id.clone(),
            target: edge.target_node_id.clone(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
        })
        .collect();

    CanvasScene { nodes, edges }
}

/// A user gesture reported by the drawing surface.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// A node finished dragging at a new position.
    NodeDragged { id: String, position: Position },
    /// The user drew a connection between two ports.
    ConnectRequested {
        source: String,
        target: String,
        source_handle: Option<String>,
        target_handle: Option<String>,
    },
    /// An edge was removed on the surface.
    EdgeRemoved { id: String },
    NodeClicked { id: String },
    PaneClicked,
}

/// What a gesture did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The graph was mutated; re-project the scene.
    Mutated,
    /// The caller should route this through `Controller::select`, which
    /// performs the (async) schema resolution this adapter never does.
    SelectionChanged(Option<String>),
    /// Stale or redundant gesture; nothing happened.
    Ignored,
}

/// Apply a gesture to the graph.
///
/// Structural rejections (invalid connect) surface as errors with the
/// graph unchanged; gestures referring to since-deleted elements are
/// ignored rather than failed, since the surface may lag a frame behind.
pub fn apply_gesture(graph: &mut Graph, gesture: Gesture) -> Result<GestureOutcome, GraphError> {
    match gesture {
        Gesture::NodeDragged { id, position } => {
            match graph.update_node(&id, NodePatch::position(position)) {
                Ok(()) => Ok(GestureOutcome::Mutated),
                Err(GraphError::NodeNotFound(_)) => Ok(GestureOutcome::Ignored),
                Err(e) => Err(e),
            }
        }
        Gesture::ConnectRequested {
            source,
            target,
            source_handle,
            target_handle,
        } => {
            graph.connect(&source, &target, source_handle, target_handle)?;
            Ok(GestureOutcome::Mutated)
        }
        Gesture::EdgeRemoved { id } => {
            if graph.disconnect(&id) {
                Ok(GestureOutcome::Mutated)
            } else {
                Ok(GestureOutcome::Ignored)
            }
        }
        Gesture::NodeClicked { id } => Ok(GestureOutcome::SelectionChanged(Some(id))),
        Gesture::PaneClicked => Ok(GestureOutcome::SelectionChanged(None)),
    }
}
