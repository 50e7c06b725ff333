//! Connector DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Connectivity probe against a candidate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConnectionRequest {
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub config: HashMap<String, serde_json::Value>,
}

/// Probe verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
}
