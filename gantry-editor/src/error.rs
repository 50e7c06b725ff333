//! Error types for the editor core
//!
//! Every failure leaves the in-memory pipeline and graph in their
//! last-known-consistent state; nothing here is fatal.

use gantry_core::domain::pipeline::NodeRole;
use thiserror::Error;

/// Structural violations of the pipeline graph.
///
/// Always rejected locally before any mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node with this id already exists in the graph.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// No node with this id exists in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An edge endpoint references a node absent from the graph.
    #[error("edge endpoint not in graph: {0}")]
    InvalidEndpoint(String),

    /// Source and target are the same node.
    #[error("self loops are not allowed: {0}")]
    SelfLoop(String),

    /// The connection direction contradicts the endpoint roles.
    #[error("cannot connect {source_role:?} -> {target_role:?}: {reason}")]
    InvalidDirection {
        source_role: NodeRole,
        target_role: NodeRole,
        reason: &'static str,
    },
}

/// A validation failure on one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Configuration key of the offending field.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-fatal editor failures outside the graph itself.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The catalog collaborator failed; the cache keeps its prior contents.
    #[error("failed to load plugin catalog")]
    CatalogLoad(#[source] anyhow::Error),

    /// No schema is known for this plugin type.
    #[error("no config schema available for plugin type '{plugin_type}'")]
    SchemaUnavailable {
        plugin_type: String,
        #[source]
        source: anyhow::Error,
    },

    /// Committed values were rejected; nothing was applied.
    #[error("configuration rejected for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A structural edit was rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The connectivity probe only applies to connector-backed nodes.
    #[error("node '{0}' is a transformer and has no connection to test")]
    NotProbeable(String),

    /// The connectivity probe collaborator failed.
    #[error("connectivity test failed")]
    Probe(#[source] anyhow::Error),
}

/// Session lifecycle failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation that needs a current pipeline was called without one.
    #[error("no pipeline is open")]
    NoPipelineOpen,

    /// The session is waiting on an execution round trip.
    #[error("an execution is in flight")]
    Busy,

    /// The persistence collaborator failed; in-memory state is unchanged.
    #[error("backend request failed")]
    Persistence(#[source] anyhow::Error),
}
