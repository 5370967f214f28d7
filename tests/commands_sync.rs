use std::sync::Arc;

use async_trait::async_trait;

use stitchdesk::commands;
use stitchdesk::error::{AppError, AppResult};
use stitchdesk::factory::default_inspection;
use stitchdesk::model::{ProjectStatus, UserRole};
use stitchdesk::repo::{BackendHandle, MemoryBackend, ProjectBackend};
use stitchdesk::row::{ProjectRow, RowPatch};
use stitchdesk::state::AppState;
use stitchdesk::storage::StorageHandle;

/// Accepts reads and inserts, fails every write-after-create. Lets tests
/// observe the optimistic divergence the update path accepts.
struct FailingWrites {
    inner: MemoryBackend,
}

impl FailingWrites {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::default(),
        }
    }
}

#[async_trait]
impl ProjectBackend for FailingWrites {
    async fn select_all(&self) -> AppResult<Vec<ProjectRow>> {
        self.inner.select_all().await
    }

    async fn insert(&self, row: ProjectRow) -> AppResult<()> {
        self.inner.insert(row).await
    }

    async fn update(&self, _id: &str, _patch: RowPatch) -> AppResult<()> {
        Err(AppError::new("BACKEND/DOWN", "backend unavailable"))
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Err(AppError::new("BACKEND/DOWN", "backend unavailable"))
    }
}

/// Insert-rejecting backend for the creation path.
struct RejectingInserts;

#[async_trait]
impl ProjectBackend for RejectingInserts {
    async fn select_all(&self) -> AppResult<Vec<ProjectRow>> {
        Ok(Vec::new())
    }

    async fn insert(&self, _row: ProjectRow) -> AppResult<()> {
        Err(AppError::new("BACKEND/DOWN", "backend unavailable"))
    }

    async fn update(&self, _id: &str, _patch: RowPatch) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn create_project_inserts_remotely_then_prepends_locally() {
    let state = AppState::in_memory();

    let older = commands::create_project(&state, "Older Style", "PO-1")
        .await
        .expect("create older");
    let newer = commands::create_project(&state, "Polo Shirt", "PO-1001")
        .await
        .expect("create newer");

    let projects = state.projects_snapshot();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].id, newer.id);
    assert_eq!(projects[1].id, older.id);
    assert_eq!(state.selection_snapshot().project_id(), Some(newer.id.as_str()));

    let rows = state.backend.select_all().await.expect("select all");
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn create_project_validates_inputs_before_any_persistence() {
    let state = AppState::in_memory();

    let err = commands::create_project(&state, "  ", "PO-1")
        .await
        .expect_err("blank title rejected");
    assert!(err.is_kind("VALIDATION"));

    let err = commands::create_project(&state, "Polo", "")
        .await
        .expect_err("blank po rejected");
    assert!(err.is_kind("VALIDATION"));

    assert!(state.projects_snapshot().is_empty());
    assert!(state.backend.select_all().await.expect("select").is_empty());
}

#[tokio::test]
async fn create_project_failure_commits_nothing_locally() {
    let state = AppState::new(
        BackendHandle::custom(Arc::new(RejectingInserts)),
        StorageHandle::in_memory(),
    );

    let err = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect_err("insert failure surfaces");
    assert!(err.is_kind("BACKEND"));
    assert!(state.projects_snapshot().is_empty());
    assert_eq!(state.selection_snapshot().project_id(), None);
}

#[tokio::test]
async fn update_is_optimistic_and_keeps_local_state_on_backend_failure() {
    let state = AppState::new(
        BackendHandle::custom(Arc::new(FailingWrites::new())),
        StorageHandle::in_memory(),
    );
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    commands::rename_project(&state, &project.id, "Polo v2")
        .await
        .expect("update path reports success despite backend failure");

    // Local view moved on.
    assert_eq!(state.projects_snapshot()[0].title, "Polo v2");
    // Remote still has the old title; only a refresh reconciles.
    let rows = state.backend.select_all().await.expect("select");
    assert_eq!(rows[0].title, "Polo");

    commands::refresh_projects(&state).await.expect("refresh");
    assert_eq!(state.projects_snapshot()[0].title, "Polo");
}

#[tokio::test]
async fn updating_unknown_project_is_a_not_found_error() {
    let state = AppState::in_memory();
    let err = commands::rename_project(&state, "proj-missing", "New Name")
        .await
        .expect_err("unknown project");
    assert_eq!(err.code(), "PROJECT/NOT_FOUND");
}

#[tokio::test]
async fn concurrent_different_field_patches_both_survive() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let rename = commands::rename_project(&state, &project.id, "Polo Shirt");
    let status = commands::set_status(&state, &project.id, ProjectStatus::Submitted);
    let (a, b) = tokio::join!(rename, status);
    a.expect("rename");
    b.expect("status");

    let rows = state.backend.select_all().await.expect("select");
    assert_eq!(rows[0].title, "Polo Shirt");
    assert_eq!(rows[0].status, ProjectStatus::Submitted);
}

#[tokio::test]
async fn refresh_replaces_the_list_newest_first() {
    let state = AppState::in_memory();
    commands::create_project(&state, "First", "PO-1")
        .await
        .expect("create first");
    commands::create_project(&state, "Second", "PO-2")
        .await
        .expect("create second");

    // Simulate a stale local cache.
    state.projects.lock().unwrap().clear();
    let count = commands::refresh_projects(&state).await.expect("refresh");
    assert_eq!(count, 2);

    let titles: Vec<String> = state
        .projects_snapshot()
        .iter()
        .map(|p| p.title.clone())
        .collect();
    assert_eq!(titles, vec!["Second".to_string(), "First".to_string()]);
}

#[tokio::test]
async fn add_comment_appends_and_persists() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    commands::add_comment(&state, &project.id, "Buyer A", UserRole::Buyer, "Please re-check hem")
        .await
        .expect("first comment");
    commands::add_comment(&state, &project.id, "QA", UserRole::Supplier, "Done")
        .await
        .expect("second comment");

    let rows = state.backend.select_all().await.expect("select");
    let comments = rows[0].comments.clone().unwrap_or_default();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "Please re-check hem");
    assert_eq!(comments[1].text, "Done");
}

#[tokio::test]
async fn open_inspections_seeds_once_and_selects_it() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let first = commands::open_inspections(&state, &project.id)
        .await
        .expect("first open");
    let second = commands::open_inspections(&state, &project.id)
        .await
        .expect("second open");

    assert_eq!(first, second);
    assert_eq!(state.projects_snapshot()[0].inspections.len(), 1);
    assert_eq!(
        state.selection_snapshot().inspection_id(),
        Some(first.as_str())
    );

    let rows = state.backend.select_all().await.expect("select");
    assert_eq!(rows[0].inspections.clone().unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn open_invoice_seeds_once_and_selects_the_first() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let first = commands::open_invoice(&state, &project.id)
        .await
        .expect("first open");
    let second = commands::open_invoice(&state, &project.id)
        .await
        .expect("second open");

    assert_eq!(first, second);
    assert_eq!(state.projects_snapshot()[0].invoices.len(), 1);
    assert_eq!(state.selection_snapshot().invoice_id(), Some(first.as_str()));
}

#[tokio::test]
async fn upsert_inspection_replaces_and_activates() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");
    let seeded_id = commands::open_inspections(&state, &project.id)
        .await
        .expect("seed");

    let mut edited = state.projects_snapshot()[0].inspections[0].clone();
    edited.data.inspector_name = "R. Ahmed".into();
    commands::upsert_inspection(&state, edited).await.expect("upsert");

    let local = state.projects_snapshot();
    assert_eq!(local[0].inspections.len(), 1);
    assert_eq!(local[0].inspections[0].data.inspector_name, "R. Ahmed");
    assert_eq!(
        state.selection_snapshot().inspection_id(),
        Some(seeded_id.as_str())
    );

    let brand_new = default_inspection(&project.id, "Polo", "Final");
    let new_id = brand_new.id.clone();
    commands::upsert_inspection(&state, brand_new).await.expect("append");
    assert_eq!(state.projects_snapshot()[0].inspections.len(), 2);
    assert_eq!(
        state.selection_snapshot().inspection_id(),
        Some(new_id.as_str())
    );
}

#[tokio::test]
async fn deleting_the_only_inspection_clears_the_active_pointer() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");
    let seeded_id = commands::open_inspections(&state, &project.id)
        .await
        .expect("seed");

    commands::delete_inspection(&state, &project.id, &seeded_id)
        .await
        .expect("delete");

    assert!(state.projects_snapshot()[0].inspections.is_empty());
    assert_eq!(state.selection_snapshot().inspection_id(), None);

    let rows = state.backend.select_all().await.expect("select");
    assert!(rows[0].inspections.clone().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn delete_project_removes_locally_even_when_remote_fails() {
    let state = AppState::new(
        BackendHandle::custom(Arc::new(FailingWrites::new())),
        StorageHandle::in_memory(),
    );
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");
    commands::select_project(&state, &project.id).expect("select");

    let err = commands::delete_project(&state, &project.id)
        .await
        .expect_err("remote outcome is reported");
    assert!(err.is_kind("BACKEND"));

    assert!(state.projects_snapshot().is_empty());
    assert_eq!(state.selection_snapshot().project_id(), None);
}

#[tokio::test]
async fn delete_project_succeeds_end_to_end() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    commands::delete_project(&state, &project.id)
        .await
        .expect("delete");
    assert!(state.projects_snapshot().is_empty());
    assert!(state.backend.select_all().await.expect("select").is_empty());
}

#[tokio::test]
async fn select_project_rejects_unknown_ids() {
    let state = AppState::in_memory();
    assert!(commands::select_project(&state, "proj-ghost").is_err());
}
