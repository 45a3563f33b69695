//! Tree document service
//!
//! Loads and stores tree documents: a JSON array of root nodes.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{generate_tree_with_ids, Forest, IdGenerator, NodeSpec};
use crate::infrastructure::traits::FileSystem;

/// Reads, validates and writes tree documents.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    pretty: bool,
}

impl TreeService {
    /// Create a new tree service writing pretty-printed JSON.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Parse raw nodes without building a forest (ids may be missing).
    pub fn parse_nodes(&self, content: &str, path: &Path) -> ApplicationResult<Vec<NodeSpec>> {
        serde_json::from_str(content).map_err(|e| ApplicationError::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse and validate a document.
    pub fn parse(&self, content: &str, path: &Path) -> ApplicationResult<Forest> {
        let nodes = self.parse_nodes(content, path)?;
        Ok(Forest::from_nodes(nodes)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Forest> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree document", path)?;
        let forest = self.parse(&content, path)?;
        debug!("loaded {} nodes from {}", forest.len(), path.display());
        Ok(forest)
    }

    /// Load a document whose ids are missing or untrusted and assign fresh
    /// ones to every node.
    #[instrument(level = "debug", skip(self, ids))]
    pub fn load_seeded(&self, path: &Path, ids: &mut dyn IdGenerator) -> ApplicationResult<Forest> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree document", path)?;
        let nodes = self.parse_nodes(&content, path)?;
        Ok(generate_tree_with_ids(&nodes, ids)?)
    }

    pub fn to_json(&self, forest: &Forest) -> ApplicationResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(forest)
        } else {
            serde_json::to_string(forest)
        };
        rendered.map_err(|e| ApplicationError::OperationFailed {
            context: "serialize tree".to_string(),
            source: Box::new(e),
        })
    }

    #[instrument(level = "debug", skip(self, forest))]
    pub fn save(&self, path: &Path, forest: &Forest) -> ApplicationResult<()> {
        let mut json = self.to_json(forest)?;
        json.push('\n');
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write tree document", path)?;
        debug!("saved {} nodes to {}", forest.len(), path.display());
        Ok(())
    }
}
