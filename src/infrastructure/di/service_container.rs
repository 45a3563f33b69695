//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::TreeService;
use crate::application::EditSession;
use crate::config::{IdStrategy, Settings};
use crate::domain::{Forest, IdGenerator, RandomIdGenerator, SequentialIdGenerator};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    tree_service: TreeService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let tree_service = TreeService::new(Arc::clone(&fs)).with_pretty(settings.pretty_json);
        Self {
            settings,
            fs,
            tree_service,
        }
    }

    pub fn tree_service(&self) -> &TreeService {
        &self.tree_service
    }

    /// Fresh id source according to `id_strategy` and `id_prefix`.
    pub fn id_generator(&self) -> Box<dyn IdGenerator + Send> {
        let prefix = self.settings.id_prefix.clone();
        match self.settings.id_strategy {
            IdStrategy::Random => Box::new(RandomIdGenerator::new(prefix)),
            IdStrategy::Sequential => Box::new(SequentialIdGenerator::new(prefix)),
        }
    }

    /// Editing session over `tree` using the configured policy and ids.
    pub fn session(&self, tree: Forest) -> EditSession {
        EditSession::new(tree, self.settings.selection, self.id_generator())
    }
}
