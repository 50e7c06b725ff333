//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::{Edge, Node};

/// Request to create a new pipeline; the backend assigns id and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipelineRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl CreatePipelineRequest {
    /// A request for an empty pipeline, the shape the designer starts from.
    pub fn empty(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}
