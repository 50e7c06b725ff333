//! Plugin catalog descriptors

use serde::{Deserialize, Serialize};

/// A connector plugin available on the backend.
///
/// Connectors feed the node palette: readable ones can back SOURCE nodes,
/// writable ones TARGET nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorInfo {
    /// Catalog key, e.g. "csv" or "jdbc".
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub display_name: String,
    pub description: String,
    pub supports_read: bool,
    pub supports_write: bool,
}

/// A transformer plugin available on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerInfo {
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub display_name: String,
    pub description: String,
    /// Informational only; input arity is enforced by the execution engine.
    pub supports_multiple_inputs: bool,
}
