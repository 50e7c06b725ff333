//! Gantry Editor
//!
//! The in-memory core of the pipeline designer: the node/edge graph with
//! its structural invariants, the plugin catalog cache, the schema-driven
//! configuration form engine, the selection/editing controller, the canvas
//! projection, and the session orchestrator that owns the save/execute
//! lifecycle.
//!
//! All I/O goes through the collaborator traits ([`catalog::CatalogService`],
//! [`controller::SchemaService`], [`controller::ConnectorProbe`],
//! [`session::PipelineStore`]); the production implementations live in
//! `gantry-client`.

pub mod canvas;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod forms;
pub mod graph;
pub mod session;

pub use canvas::{CanvasScene, Gesture, GestureOutcome};
pub use catalog::{CatalogCache, CatalogService};
pub use controller::{ConnectorProbe, Controller, SchemaService};
pub use error::{EditorError, FieldError, GraphError, SessionError};
pub use forms::{ControlKind, FormBinding, FormField};
pub use graph::{Graph, GraphSnapshot, NodePatch};
pub use session::{PipelineStore, Session, SessionState};
