//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CatalogService, StudentService, TreeFetcher};
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::kori::KoriClient;
use crate::infrastructure::store::JsonStudentStore;
use crate::infrastructure::traits::{CatalogClient, FileSystem, RealFileSystem, StudentStore};

/// Container holding the I/O boundaries and the services built on them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Catalog client abstraction
    pub catalog: Arc<dyn CatalogClient>,

    /// Student persistence
    pub store: Arc<dyn StudentStore>,

    fetcher: Arc<TreeFetcher>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let catalog = Arc::new(KoriClient::new(settings.catalog.clone())?);
        let store = Arc::new(JsonStudentStore::new(fs.clone(), settings.students_dir.clone()));
        Self::with_deps(settings, fs, catalog, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn StudentStore>,
    ) -> InfraResult<Self> {
        let fetcher = TreeFetcher::with_threads(catalog.clone(), settings.fetch_threads)
            .map_err(|e| InfraError::ThreadPool {
                message: e.to_string(),
            })?;
        let settings = Arc::new(settings);

        Ok(Self {
            settings,
            fs,
            catalog,
            store,
            fetcher: Arc::new(fetcher),
        })
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.catalog.clone(), self.fetcher.clone())
    }

    pub fn student_service(&self) -> StudentService {
        StudentService::new(self.store.clone(), self.fetcher.clone())
    }
}
