use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::db;
use crate::error::AppResult;
use crate::model::Project;
use crate::repo::BackendHandle;
use crate::selection::Selection;
use crate::storage::StorageHandle;

/// Shared session state: the persistence handles, the canonical in-memory
/// project list, and the editor selection context.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendHandle,
    pub storage: StorageHandle,
    pub projects: Arc<Mutex<Vec<Project>>>,
    pub selection: Arc<Mutex<Selection>>,
}

impl AppState {
    pub fn new(backend: BackendHandle, storage: StorageHandle) -> Self {
        Self {
            backend,
            storage,
            projects: Arc::new(Mutex::new(Vec::new())),
            selection: Arc::new(Mutex::new(Selection::default())),
        }
    }

    /// Fully in-memory state for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::new(BackendHandle::in_memory(), StorageHandle::in_memory())
    }

    /// Production wiring: SQLite-backed rows, filesystem blob store.
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let pool = db::connect(&config.database_url).await?;
        Ok(Self::new(
            BackendHandle::sqlite(pool),
            StorageHandle::fs(config.blob_root.clone(), config.public_base_url.clone()),
        ))
    }

    pub(crate) fn with_projects<R>(&self, f: impl FnOnce(&mut Vec<Project>) -> R) -> R {
        let mut guard = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub(crate) fn with_selection<R>(&self, f: impl FnOnce(&mut Selection) -> R) -> R {
        let mut guard = self.selection.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn projects_snapshot(&self) -> Vec<Project> {
        self.with_projects(|projects| projects.clone())
    }

    pub fn selection_snapshot(&self) -> Selection {
        self.with_selection(|selection| selection.clone())
    }
}
