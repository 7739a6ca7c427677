//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::SqlitePackageStore;
use crate::package::PackageService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    packages: PackageService,
}

impl AppState {
    /// Create a new application state around an initialized pool
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let packages = PackageService::new(Arc::new(SqlitePackageStore::new(db.clone())));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                packages,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the package service
    pub fn packages(&self) -> &PackageService {
        &self.inner.packages
    }
}
