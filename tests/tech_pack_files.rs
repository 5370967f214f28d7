use std::sync::Arc;

use async_trait::async_trait;

use stitchdesk::commands;
use stitchdesk::error::{AppError, AppResult};
use stitchdesk::repo::BackendHandle;
use stitchdesk::state::AppState;
use stitchdesk::storage::{BlobBucket, BlobStore, StorageHandle, StoredBlob};

/// Blob store whose uploads always fail, for the abort paths.
struct BrokenUploads;

#[async_trait]
impl BlobStore for BrokenUploads {
    async fn upload(&self, _: BlobBucket, _: &str, _: &[u8]) -> AppResult<StoredBlob> {
        Err(AppError::new("STORAGE/DOWN", "bucket unavailable"))
    }

    fn public_url(&self, bucket: BlobBucket, path: &str) -> String {
        format!("broken://{}/{path}", bucket.as_str())
    }

    async fn remove(&self, _: BlobBucket, _: &[String]) -> AppResult<()> {
        Ok(())
    }

    async fn remove_prefix(&self, _: BlobBucket, _: &str) -> AppResult<()> {
        Ok(())
    }
}

fn broken_storage_state() -> AppState {
    AppState::new(
        BackendHandle::in_memory(),
        StorageHandle::custom(Arc::new(BrokenUploads)),
    )
}

#[tokio::test]
async fn import_creates_a_project_with_the_uploaded_file() {
    let state = AppState::in_memory();
    let project = commands::import_tech_pack(&state, "summer-polo.pdf", None, b"pdf bytes")
        .await
        .expect("import");

    assert_eq!(project.title, "summer-polo.pdf");
    assert_eq!(project.po_numbers.len(), 1);
    assert_eq!(project.po_numbers[0].number, "N/A");
    assert_eq!(project.tech_pack_files.len(), 1);

    let file = &project.tech_pack_files[0];
    assert_eq!(file.name, "summer-polo");
    assert_eq!(file.file_name.as_deref(), Some("summer-polo.pdf"));
    assert_eq!(file.file_type.as_deref(), Some("application/pdf"));
    let path = file.storage_path.as_deref().expect("storage path recorded");
    assert!(path.starts_with(&format!("{}/", project.id)));
    assert!(file.file_url.contains(path));

    let rows = state.backend.select_all().await.expect("select");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tech_pack_files.clone().unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn import_aborts_when_the_upload_fails() {
    let state = broken_storage_state();
    let err = commands::import_tech_pack(&state, "summer-polo.pdf", None, b"pdf bytes")
        .await
        .expect_err("upload failure aborts");
    assert!(err.is_kind("STORAGE"));

    // Nothing committed anywhere: no project, no row, no local-only URL.
    assert!(state.projects_snapshot().is_empty());
    assert!(state.backend.select_all().await.expect("select").is_empty());
}

#[tokio::test]
async fn upload_attaches_a_file_record_after_the_blob_exists() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let record = commands::upload_tech_pack_file(
        &state,
        &project.id,
        "Spec sheet",
        "spec-v3.pdf",
        Some("application/pdf"),
        b"spec bytes",
    )
    .await
    .expect("upload");

    assert_eq!(record.name, "Spec sheet");
    assert_eq!(record.file_size, Some(10));
    let local = state.projects_snapshot();
    assert_eq!(local[0].tech_pack_files.len(), 1);
    assert_eq!(local[0].tech_pack_files[0].id, record.id);
}

#[tokio::test]
async fn upload_failure_leaves_the_file_list_untouched() {
    let state = broken_storage_state();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let err = commands::upload_tech_pack_file(
        &state,
        &project.id,
        "Spec sheet",
        "spec-v3.pdf",
        None,
        b"spec bytes",
    )
    .await
    .expect_err("upload fails");
    assert!(err.is_kind("STORAGE"));
    assert!(state.projects_snapshot()[0].tech_pack_files.is_empty());
}

#[tokio::test]
async fn invalid_mime_hints_are_rejected_before_any_upload() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let err = commands::upload_tech_pack_file(
        &state,
        &project.id,
        "Spec sheet",
        "spec.pdf",
        Some("not a mime"),
        b"bytes",
    )
    .await
    .expect_err("bad hint rejected");
    assert_eq!(err.code(), "STORAGE/MIME_INVALID");
}

#[tokio::test]
async fn replace_keeps_identity_and_swaps_the_blob() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");
    let original = commands::upload_tech_pack_file(
        &state,
        &project.id,
        "Spec sheet",
        "spec-v1.pdf",
        None,
        b"v1",
    )
    .await
    .expect("first upload");

    let replaced = commands::replace_tech_pack_file(
        &state,
        &project.id,
        &original.id,
        "spec-v2.pdf",
        None,
        b"version two",
    )
    .await
    .expect("replace");

    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.name, "Spec sheet");
    assert_eq!(replaced.file_name.as_deref(), Some("spec-v2.pdf"));
    assert_ne!(replaced.storage_path, original.storage_path);

    let local = state.projects_snapshot();
    assert_eq!(local[0].tech_pack_files.len(), 1);
    assert_eq!(
        local[0].tech_pack_files[0].file_name.as_deref(),
        Some("spec-v2.pdf")
    );
}

#[tokio::test]
async fn delete_removes_record_and_tolerates_missing_ids() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");
    let record = commands::upload_tech_pack_file(
        &state,
        &project.id,
        "Spec sheet",
        "spec.pdf",
        None,
        b"bytes",
    )
    .await
    .expect("upload");

    commands::delete_tech_pack_file(&state, &project.id, &record.id)
        .await
        .expect("delete");
    assert!(state.projects_snapshot()[0].tech_pack_files.is_empty());

    // Deleting an id that is already gone is a no-op.
    commands::delete_tech_pack_file(&state, &project.id, &record.id)
        .await
        .expect("idempotent delete");
}

#[tokio::test]
async fn product_image_lives_in_memory_only() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let url = commands::set_product_image(&state, &project.id, "front.jpg", b"jpeg bytes")
        .await
        .expect("set image");
    assert!(url.contains("product-images"));
    assert_eq!(
        state.projects_snapshot()[0].product_image.as_deref(),
        Some(url.as_str())
    );

    // The persisted row shape has no product image field.
    let rows = state.backend.select_all().await.expect("select");
    let row_json = serde_json::to_value(&rows[0]).expect("row json");
    assert!(row_json.get("product_image").is_none());

    commands::clear_product_image(&state, &project.id)
        .await
        .expect("clear image");
    assert_eq!(state.projects_snapshot()[0].product_image, None);
}

#[tokio::test]
async fn product_colors_are_managed_on_the_aggregate_only() {
    let state = AppState::in_memory();
    let project = commands::create_project(&state, "Polo", "PO-1")
        .await
        .expect("create");

    let color = commands::add_product_color(&state, &project.id, "#1F3A5F", Some("Navy"))
        .expect("add color");
    assert!(color.id.starts_with("color-"));
    assert_eq!(state.projects_snapshot()[0].product_colors.len(), 1);

    commands::remove_product_color(&state, &project.id, &color.id).expect("remove color");
    assert!(state.projects_snapshot()[0].product_colors.is_empty());
}
