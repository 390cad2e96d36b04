//! Node sources
//!
//! The conversion core only sees node snapshots. Where they come from is the
//! business of a [`NodeSource`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::{debug, info};
use thiserror::Error;

use crate::models::ProxyNode;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read node file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid node file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies node snapshots to the conversion layer
pub trait NodeSource: Send + Sync {
    /// Nodes in storage order, restricted to `ids` when given.
    fn get_nodes(&self, ids: Option<&[u64]>) -> Result<Vec<ProxyNode>, StoreError>;
}

fn select(nodes: &[ProxyNode], ids: Option<&[u64]>) -> Vec<ProxyNode> {
    match ids {
        Some(ids) => nodes
            .iter()
            .filter(|node| ids.contains(&node.id))
            .cloned()
            .collect(),
        None => nodes.to_vec(),
    }
}

/// Reads a JSON array of nodes from disk
pub struct JsonFileNodeSource {
    path: PathBuf,
    reload_on_request: bool,
    cache: RwLock<Option<Arc<Vec<ProxyNode>>>>,
}

impl JsonFileNodeSource {
    pub fn new<P: AsRef<Path>>(path: P, reload_on_request: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reload_on_request,
            cache: RwLock::new(None),
        }
    }

    fn read_file(&self) -> Result<Vec<ProxyNode>, StoreError> {
        let path = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let nodes: Vec<ProxyNode> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })?;
        info!("Loaded {} nodes from '{}'", nodes.len(), self.path.display());
        Ok(nodes)
    }

    fn load(&self) -> Result<Arc<Vec<ProxyNode>>, StoreError> {
        if !self.reload_on_request {
            let cached = self
                .cache
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            if let Some(nodes) = cached {
                debug!("Serving {} cached nodes", nodes.len());
                return Ok(nodes);
            }
        }

        let nodes = Arc::new(self.read_file()?);
        *self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(nodes.clone());
        Ok(nodes)
    }
}

impl NodeSource for JsonFileNodeSource {
    fn get_nodes(&self, ids: Option<&[u64]>) -> Result<Vec<ProxyNode>, StoreError> {
        let nodes = self.load()?;
        Ok(select(&nodes, ids))
    }
}

/// Holds nodes in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeSource {
    nodes: Vec<ProxyNode>,
}

impl MemoryNodeSource {
    pub fn new(nodes: Vec<ProxyNode>) -> Self {
        Self { nodes }
    }
}

impl NodeSource for MemoryNodeSource {
    fn get_nodes(&self, ids: Option<&[u64]>) -> Result<Vec<ProxyNode>, StoreError> {
        Ok(select(&self.nodes, ids))
    }
}
