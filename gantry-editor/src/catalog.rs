//! Plugin catalog cache
//!
//! Session-scoped cache of the connector and transformer descriptors the
//! backend advertises. Populated once at startup; a manual [`CatalogCache::load`]
//! is the only refresh path.

use async_trait::async_trait;
use gantry_core::domain::catalog::{ConnectorInfo, TransformerInfo};
use tracing::{info, warn};

use crate::error::EditorError;

/// Remote catalog collaborator.
#[async_trait]
pub trait CatalogService {
    async fn list_connectors(&self) -> anyhow::Result<Vec<ConnectorInfo>>;
    async fn list_transformers(&self) -> anyhow::Result<Vec<TransformerInfo>>;
}

/// Cached plugin descriptors for the session.
#[derive(Debug, Default)]
pub struct CatalogCache {
    connectors: Vec<ConnectorInfo>,
    transformers: Vec<TransformerInfo>,
    loaded: bool,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch both plugin lists concurrently and swap them in together.
    ///
    /// On partial failure the whole load fails and the cache keeps its
    /// previous contents, so no caller ever observes a half-populated
    /// catalog.
    pub async fn load(&mut self, service: &(impl CatalogService + ?Sized)) -> Result<(), EditorError> {
        let (connectors, transformers) =
            tokio::join!(service.list_connectors(), service.list_transformers());

        match (connectors, transformers) {
            (Ok(connectors), Ok(transformers)) => {
                info!(
                    connectors = connectors.len(),
                    transformers = transformers.len(),
                    "plugin catalog loaded"
                );
                self.connectors = connectors;
                self.transformers = transformers;
                self.loaded = true;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("catalog load failed: {:#}", e);
                Err(EditorError::CatalogLoad(e))
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Connectors usable as SOURCE nodes.
    pub fn source_connectors(&self) -> Vec<&ConnectorInfo> {
        self.connectors.iter().filter(|c| c.supports_read).collect()
    }

    /// Connectors usable as TARGET nodes.
    pub fn target_connectors(&self) -> Vec<&ConnectorInfo> {
        self.connectors.iter().filter(|c| c.supports_write).collect()
    }

    pub fn transformers(&self) -> &[TransformerInfo] {
        &self.transformers
    }

    pub fn connector(&self, plugin_type: &str) -> Option<&ConnectorInfo> {
        self.connectors.iter().find(|c| c.plugin_type == plugin_type)
    }

    pub fn transformer(&self, plugin_type: &str) -> Option<&TransformerInfo> {
        self.transformers
            .iter()
            .find(|t| t.plugin_type == plugin_type)
    }
}
