//! Synchronization controller: every user-intended change goes through
//! here, applied to the in-memory aggregate and pushed to the persistence
//! backend together.
//!
//! Updates are optimistic: the local list changes first, then the patch is
//! stamped and submitted as a partial row update. A failed write is logged
//! and the local state stands until the next full refresh. Creation is the
//! opposite: nothing is added locally until the remote insert succeeds.

use std::path::Path;

use paste::paste;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::factory;
use crate::id;
use crate::model::{
    Comment, ConsumptionData, FileAttachment, Inspection, Invoice, MaterialControlItem,
    OrderSheet, PackingInfo, PoNumber, PpMeeting, ProductColor, Project, ProjectStatus,
    TechPackPage, UploadedTechPack, UserRole, BACKEND_DELETE_FAILED, BACKEND_READ_FAILED,
    BACKEND_WRITE_FAILED,
    PROJECT_NOT_FOUND, STORAGE_UPLOAD_FAILED, VALIDATION_FILE_NAME_REQUIRED,
    VALIDATION_PO_REQUIRED, VALIDATION_TITLE_REQUIRED,
};
use crate::projects;
use crate::row::{self, ProjectPatch, ProjectRow};
use crate::selection::{self, ActivateError};
use crate::state::AppState;
use crate::storage::{validate_mime_hint, BlobBucket};
use crate::time::now_iso;

fn not_found(project_id: &str, operation: &'static str) -> AppError {
    AppError::new(PROJECT_NOT_FOUND, "Project not found")
        .with_context("operation", operation)
        .with_context("project_id", project_id.to_string())
}

fn get_project(state: &AppState, project_id: &str, operation: &'static str) -> AppResult<Project> {
    state
        .with_projects(|projects| projects::find(projects, project_id).cloned())
        .ok_or_else(|| not_found(project_id, operation))
}

/// Merge the present fields of a patch into a project, the local half of
/// the optimistic protocol.
fn apply_patch(project: &mut Project, patch: &ProjectPatch) {
    macro_rules! merge {
        ($($field:ident),+ $(,)?) => {
            $(
                if let Some(value) = &patch.$field {
                    project.$field = value.clone();
                }
            )+
        };
    }
    merge!(
        title,
        status,
        po_numbers,
        updated_at,
        tech_pack_files,
        pages,
        comments,
        inspections,
        pp_meetings,
        material_control,
        invoices,
        packing,
        material_remarks,
        material_attachments,
        material_comments,
    );
    if patch.order_sheet.is_some() {
        project.order_sheet = patch.order_sheet.clone();
    }
    if patch.consumption.is_some() {
        project.consumption = patch.consumption.clone();
    }
}

// ---------------------------------------------------------------------------
// Refresh & selection
// ---------------------------------------------------------------------------

/// Fetch every project (newest first), map the rows, and replace the
/// in-memory list wholesale. The only path that fully reconciles local
/// state with the store.
pub async fn refresh_projects(state: &AppState) -> AppResult<usize> {
    let rows = state.backend.select_all().await.map_err(|err| {
        AppError::new(BACKEND_READ_FAILED, "Could not load projects")
            .with_context("operation", "refresh_projects")
            .with_cause(err)
    })?;
    let projects: Vec<Project> = rows.into_iter().map(row::from_row).collect();
    let count = projects.len();
    state.with_projects(|list| *list = projects);
    info!(target: "stitchdesk", event = "projects_refreshed", count);
    Ok(count)
}

pub fn select_project(state: &AppState, project_id: &str) -> Result<(), ActivateError> {
    state.with_projects(|projects| {
        state.with_selection(|sel| selection::activate_project(sel, projects, project_id))
    })
}

/// Drop the whole selection context, e.g. on logout.
pub fn reset_selection(state: &AppState) {
    state.with_selection(|sel| sel.clear());
}

// ---------------------------------------------------------------------------
// Project lifecycle
// ---------------------------------------------------------------------------

/// Create a new style. Validation failures abort before any persistence;
/// the project is only added locally after the remote insert succeeds.
pub async fn create_project(state: &AppState, title: &str, po_number: &str) -> AppResult<Project> {
    if title.trim().is_empty() {
        return Err(AppError::new(VALIDATION_TITLE_REQUIRED, "Style name is required.")
            .with_context("operation", "create_project"));
    }
    if po_number.trim().is_empty() {
        return Err(AppError::new(VALIDATION_PO_REQUIRED, "PO number is required.")
            .with_context("operation", "create_project"));
    }

    let project = factory::new_project(title.trim(), po_number.trim());
    state
        .backend
        .insert(ProjectRow::from(&project))
        .await
        .map_err(|err| {
            AppError::new(BACKEND_WRITE_FAILED, "Failed to create tech pack")
                .with_context("operation", "create_project")
                .with_cause(err)
        })?;

    state.with_projects(|list| list.insert(0, project.clone()));
    state.with_selection(|sel| sel.activate_project(&project.id));
    info!(target: "stitchdesk", event = "project_created", project_id = %project.id);
    Ok(project)
}

/// Create a project by importing an existing tech-pack file. The blob is
/// uploaded first; a failed upload aborts the whole operation rather than
/// substituting a local-only reference.
pub async fn import_tech_pack(
    state: &AppState,
    file_name: &str,
    file_type: Option<&str>,
    bytes: &[u8],
) -> AppResult<Project> {
    if file_name.trim().is_empty() {
        return Err(AppError::new(VALIDATION_FILE_NAME_REQUIRED, "File name is required.")
            .with_context("operation", "import_tech_pack"));
    }
    validate_mime_hint(file_type)?;

    let mut project = factory::new_project(file_name.trim(), "N/A");
    let file = store_tech_pack_blob(
        state,
        &project.id,
        file_stem(file_name),
        file_name,
        file_type,
        bytes,
        "import_tech_pack",
    )
    .await?;
    project.tech_pack_files = vec![file];

    state
        .backend
        .insert(ProjectRow::from(&project))
        .await
        .map_err(|err| {
            AppError::new(BACKEND_WRITE_FAILED, "Failed to import tech pack")
                .with_context("operation", "import_tech_pack")
                .with_cause(err)
        })?;

    state.with_projects(|list| list.insert(0, project.clone()));
    info!(target: "stitchdesk", event = "project_imported", project_id = %project.id);
    Ok(project)
}

/// Optimistic partial update: apply locally, stamp, translate, submit.
/// A backend failure is logged but the local state is kept; the two views
/// may diverge until the next `refresh_projects`.
pub async fn update_project(
    state: &AppState,
    project_id: &str,
    mut patch: ProjectPatch,
) -> AppResult<()> {
    patch.updated_at = Some(now_iso());

    let found = state.with_projects(|list| {
        if let Some(project) = projects::find_mut(list, project_id) {
            apply_patch(project, &patch);
            true
        } else {
            false
        }
    });
    if !found {
        return Err(not_found(project_id, "update_project"));
    }

    if let Err(err) = state.backend.update(project_id, row::to_row(patch)).await {
        warn!(
            target: "stitchdesk",
            event = "project_update_failed",
            project_id = %project_id,
            code = %err.code(),
            error = %err
        );
    }
    Ok(())
}

/// Best-effort blob cascade and remote delete, then the project always
/// leaves the in-memory list. There is no undo.
pub async fn delete_project(state: &AppState, project_id: &str) -> AppResult<()> {
    let project = get_project(state, project_id, "delete_project")?;

    let paths: Vec<String> = project
        .tech_pack_files
        .iter()
        .filter_map(|f| f.storage_path.clone())
        .collect();
    if !paths.is_empty() {
        if let Err(err) = state.storage.remove(BlobBucket::TechPacks, &paths).await {
            warn!(
                target: "stitchdesk",
                event = "project_blob_cleanup_failed",
                project_id = %project_id,
                code = %err.code(),
                error = %err
            );
        }
    }
    for bucket in [BlobBucket::TechPacks, BlobBucket::ProductImages] {
        if let Err(err) = state.storage.remove_prefix(bucket, project_id).await {
            warn!(
                target: "stitchdesk",
                event = "project_blob_sweep_failed",
                project_id = %project_id,
                bucket = bucket.as_str(),
                error = %err
            );
        }
    }

    let remote = state.backend.delete(project_id).await;
    if let Err(err) = &remote {
        warn!(
            target: "stitchdesk",
            event = "project_delete_remote_failed",
            project_id = %project_id,
            code = %err.code(),
            error = %err
        );
    }

    state.with_projects(|list| list.retain(|p| p.id != project_id));
    state.with_selection(|sel| sel.after_project_removed(project_id));
    info!(target: "stitchdesk", event = "project_deleted", project_id = %project_id);

    remote.map_err(|err| {
        AppError::new(BACKEND_DELETE_FAILED, "Remote delete failed")
            .with_context("operation", "delete_project")
            .with_context("project_id", project_id.to_string())
            .with_cause(err)
    })
}

// ---------------------------------------------------------------------------
// Simple field patches
// ---------------------------------------------------------------------------

pub async fn rename_project(state: &AppState, project_id: &str, title: &str) -> AppResult<()> {
    update_project(
        state,
        project_id,
        ProjectPatch {
            title: Some(title.to_string()),
            ..Default::default()
        },
    )
    .await
}

pub async fn set_status(
    state: &AppState,
    project_id: &str,
    status: ProjectStatus,
) -> AppResult<()> {
    update_project(
        state,
        project_id,
        ProjectPatch {
            status: Some(status),
            ..Default::default()
        },
    )
    .await
}

pub async fn set_po_numbers(
    state: &AppState,
    project_id: &str,
    po_numbers: Vec<PoNumber>,
) -> AppResult<()> {
    update_project(
        state,
        project_id,
        ProjectPatch {
            po_numbers: Some(po_numbers),
            ..Default::default()
        },
    )
    .await
}

/// Comments are append-only.
pub async fn add_comment(
    state: &AppState,
    project_id: &str,
    author: &str,
    role: UserRole,
    text: &str,
) -> AppResult<Comment> {
    let project = get_project(state, project_id, "add_comment")?;
    let comment = Comment {
        id: id::new_uuid_v7(),
        author: author.to_string(),
        role,
        text: text.to_string(),
        timestamp: now_iso(),
    };
    let mut comments = project.comments;
    comments.push(comment.clone());
    update_project(
        state,
        project_id,
        ProjectPatch {
            comments: Some(comments),
            ..Default::default()
        },
    )
    .await?;
    Ok(comment)
}

macro_rules! gen_collection_setters {
    ( $( $field:ident : $ty:ty ),+ $(,)? ) => {
        paste! {
            $(
                pub async fn [<update_ $field>](
                    state: &AppState,
                    project_id: &str,
                    value: $ty,
                ) -> AppResult<()> {
                    update_project(
                        state,
                        project_id,
                        ProjectPatch {
                            $field: Some(value),
                            ..Default::default()
                        },
                    )
                    .await
                }
            )+
        }
    };
}

gen_collection_setters!(
    pages: Vec<TechPackPage>,
    pp_meetings: Vec<PpMeeting>,
    material_control: Vec<MaterialControlItem>,
    material_attachments: Vec<FileAttachment>,
    material_comments: Vec<Comment>,
    packing: PackingInfo,
    order_sheet: OrderSheet,
    consumption: ConsumptionData,
    material_remarks: String,
);

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

/// Upsert by id into the project's inspection list and persist; the
/// inspection becomes the active one.
pub async fn upsert_inspection(state: &AppState, inspection: Inspection) -> AppResult<()> {
    let project_id = inspection.project_id.clone();
    let inspection_id = inspection.id.clone();

    let mut project = get_project(state, &project_id, "upsert_inspection")?;
    projects::upsert_inspection(&mut project, inspection);

    state.with_selection(|sel| sel.activate_inspection(&project_id, &inspection_id));
    update_project(
        state,
        &project_id,
        ProjectPatch {
            inspections: Some(project.inspections),
            ..Default::default()
        },
    )
    .await
}

/// Remove an inspection and persist the shrunken list. When the removed
/// entry was active, the first remaining one takes over (or none).
pub async fn delete_inspection(
    state: &AppState,
    project_id: &str,
    inspection_id: &str,
) -> AppResult<()> {
    let mut project = get_project(state, project_id, "delete_inspection")?;
    projects::remove_inspection(&mut project, inspection_id);

    update_project(
        state,
        project_id,
        ProjectPatch {
            inspections: Some(project.inspections.clone()),
            ..Default::default()
        },
    )
    .await?;
    state.with_selection(|sel| sel.after_inspection_removed(inspection_id, &project.inspections));
    Ok(())
}

/// Open the inspection editor for a project: seed a default inspection on
/// first access, select the most recent one afterwards. Idempotent.
pub async fn open_inspections(state: &AppState, project_id: &str) -> AppResult<String> {
    let mut project = get_project(state, project_id, "open_inspections")?;
    let outcome = projects::ensure_inspection(&mut project);
    if outcome.was_created() {
        update_project(
            state,
            project_id,
            ProjectPatch {
                inspections: Some(project.inspections),
                ..Default::default()
            },
        )
        .await?;
    }
    state.with_selection(|sel| sel.activate_inspection(project_id, outcome.id()));
    Ok(outcome.id().to_string())
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// Open the invoice editor: seed a default invoice on first access, select
/// the first existing one afterwards. Idempotent.
pub async fn open_invoice(state: &AppState, project_id: &str) -> AppResult<String> {
    let mut project = get_project(state, project_id, "open_invoice")?;
    let outcome = projects::ensure_invoice(&mut project);
    if outcome.was_created() {
        update_project(
            state,
            project_id,
            ProjectPatch {
                invoices: Some(project.invoices),
                ..Default::default()
            },
        )
        .await?;
    }
    state.with_selection(|sel| sel.activate_invoice(project_id, outcome.id()));
    Ok(outcome.id().to_string())
}

pub async fn update_invoice(
    state: &AppState,
    project_id: &str,
    invoice: Invoice,
) -> AppResult<()> {
    let invoice_id = invoice.id.clone();
    let mut project = get_project(state, project_id, "update_invoice")?;
    projects::upsert_invoice(&mut project, invoice);

    state.with_selection(|sel| sel.activate_invoice(project_id, &invoice_id));
    update_project(
        state,
        project_id,
        ProjectPatch {
            invoices: Some(project.invoices),
            ..Default::default()
        },
    )
    .await
}

// ---------------------------------------------------------------------------
// Tech-pack files & product image
// ---------------------------------------------------------------------------

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

fn file_extension(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
}

/// Upload a blob and build the file record. The stored path and public URL
/// exist before any row patch references them.
async fn store_tech_pack_blob(
    state: &AppState,
    project_id: &str,
    display_name: &str,
    file_name: &str,
    file_type: Option<&str>,
    bytes: &[u8],
    operation: &'static str,
) -> AppResult<UploadedTechPack> {
    let key = format!(
        "{project_id}/{}.{}",
        id::new_uuid_v7(),
        file_extension(file_name)
    );
    let stored = state
        .storage
        .upload(BlobBucket::TechPacks, &key, bytes)
        .await
        .map_err(|err| {
            AppError::new(STORAGE_UPLOAD_FAILED, "File upload failed")
                .with_context("operation", operation)
                .with_context("project_id", project_id.to_string())
                .with_cause(err)
        })?;
    let file_url = state.storage.public_url(BlobBucket::TechPacks, &stored.path);
    let file_type = file_type
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(file_name).first_raw().map(str::to_string));

    Ok(UploadedTechPack {
        id: id::file_id(),
        name: display_name.to_string(),
        file_url,
        upload_date: now_iso(),
        file_name: Some(file_name.to_string()),
        file_type,
        file_size: Some(bytes.len() as i64),
        storage_path: Some(stored.path),
    })
}

/// Attach a tech-pack file to an existing project. Upload failures abort
/// without touching the row.
pub async fn upload_tech_pack_file(
    state: &AppState,
    project_id: &str,
    display_name: &str,
    file_name: &str,
    file_type: Option<&str>,
    bytes: &[u8],
) -> AppResult<UploadedTechPack> {
    validate_mime_hint(file_type)?;
    let project = get_project(state, project_id, "upload_tech_pack_file")?;
    let record = store_tech_pack_blob(
        state,
        project_id,
        display_name,
        file_name,
        file_type,
        bytes,
        "upload_tech_pack_file",
    )
    .await?;

    let mut files = project.tech_pack_files;
    files.push(record.clone());
    update_project(
        state,
        project_id,
        ProjectPatch {
            tech_pack_files: Some(files),
            ..Default::default()
        },
    )
    .await?;
    Ok(record)
}

/// Replace a file's stored blob: the old blob is removed best-effort, the
/// new one uploaded, and the record patched in place (id and display name
/// survive).
pub async fn replace_tech_pack_file(
    state: &AppState,
    project_id: &str,
    file_id: &str,
    file_name: &str,
    file_type: Option<&str>,
    bytes: &[u8],
) -> AppResult<UploadedTechPack> {
    validate_mime_hint(file_type)?;
    let project = get_project(state, project_id, "replace_tech_pack_file")?;
    let old = project
        .tech_pack_files
        .iter()
        .find(|f| f.id == file_id)
        .cloned()
        .ok_or_else(|| {
            not_found(project_id, "replace_tech_pack_file").with_context("file_id", file_id.to_string())
        })?;

    if let Some(path) = &old.storage_path {
        if let Err(err) = state
            .storage
            .remove(BlobBucket::TechPacks, std::slice::from_ref(path))
            .await
        {
            warn!(
                target: "stitchdesk",
                event = "tech_pack_blob_remove_failed",
                project_id = %project_id,
                file_id = %file_id,
                error = %err
            );
        }
    }

    let fresh = store_tech_pack_blob(
        state,
        project_id,
        &old.name,
        file_name,
        file_type,
        bytes,
        "replace_tech_pack_file",
    )
    .await?;
    let updated = UploadedTechPack {
        id: old.id.clone(),
        name: old.name.clone(),
        ..fresh
    };

    let files: Vec<UploadedTechPack> = project
        .tech_pack_files
        .into_iter()
        .map(|f| if f.id == file_id { updated.clone() } else { f })
        .collect();
    update_project(
        state,
        project_id,
        ProjectPatch {
            tech_pack_files: Some(files),
            ..Default::default()
        },
    )
    .await?;
    Ok(updated)
}

/// Remove a tech-pack file: blob first (best effort), then the record.
pub async fn delete_tech_pack_file(
    state: &AppState,
    project_id: &str,
    file_id: &str,
) -> AppResult<()> {
    let project = get_project(state, project_id, "delete_tech_pack_file")?;
    let Some(record) = project.tech_pack_files.iter().find(|f| f.id == file_id) else {
        return Ok(());
    };

    if let Some(path) = &record.storage_path {
        if let Err(err) = state
            .storage
            .remove(BlobBucket::TechPacks, std::slice::from_ref(path))
            .await
        {
            warn!(
                target: "stitchdesk",
                event = "tech_pack_blob_remove_failed",
                project_id = %project_id,
                file_id = %file_id,
                error = %err
            );
        }
    }

    let files: Vec<UploadedTechPack> = project
        .tech_pack_files
        .into_iter()
        .filter(|f| f.id != file_id)
        .collect();
    update_project(
        state,
        project_id,
        ProjectPatch {
            tech_pack_files: Some(files),
            ..Default::default()
        },
    )
    .await
}

/// Upload a product thumbnail. The image lives in blob storage and on the
/// in-memory project only; it is not part of the persisted row shape.
pub async fn set_product_image(
    state: &AppState,
    project_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> AppResult<String> {
    get_project(state, project_id, "set_product_image")?;

    // Clear any previous image before storing the replacement.
    if let Err(err) = state
        .storage
        .remove_prefix(BlobBucket::ProductImages, project_id)
        .await
    {
        warn!(
            target: "stitchdesk",
            event = "product_image_sweep_failed",
            project_id = %project_id,
            error = %err
        );
    }

    let key = format!(
        "{project_id}/{}.{}",
        id::new_uuid_v7(),
        file_extension(file_name)
    );
    let stored = state
        .storage
        .upload(BlobBucket::ProductImages, &key, bytes)
        .await
        .map_err(|err| {
            AppError::new(STORAGE_UPLOAD_FAILED, "Image upload failed")
                .with_context("operation", "set_product_image")
                .with_context("project_id", project_id.to_string())
                .with_cause(err)
        })?;
    let url = state
        .storage
        .public_url(BlobBucket::ProductImages, &stored.path);

    state.with_projects(|list| {
        if let Some(project) = projects::find_mut(list, project_id) {
            project.product_image = Some(url.clone());
        }
    });
    Ok(url)
}

/// Add a color swatch for the dashboard card. Like the product image,
/// swatches are a domain-only attribute outside the persisted row shape.
pub fn add_product_color(
    state: &AppState,
    project_id: &str,
    hex: &str,
    name: Option<&str>,
) -> AppResult<ProductColor> {
    let color = ProductColor {
        id: id::color_id(),
        hex: hex.to_string(),
        name: name.map(str::to_string),
    };
    let added = state.with_projects(|list| {
        if let Some(project) = projects::find_mut(list, project_id) {
            project.product_colors.push(color.clone());
            true
        } else {
            false
        }
    });
    if !added {
        return Err(not_found(project_id, "add_product_color"));
    }
    Ok(color)
}

pub fn remove_product_color(state: &AppState, project_id: &str, color_id: &str) -> AppResult<()> {
    let found = state.with_projects(|list| {
        if let Some(project) = projects::find_mut(list, project_id) {
            project.product_colors.retain(|c| c.id != color_id);
            true
        } else {
            false
        }
    });
    if !found {
        return Err(not_found(project_id, "remove_product_color"));
    }
    Ok(())
}

pub async fn clear_product_image(state: &AppState, project_id: &str) -> AppResult<()> {
    get_project(state, project_id, "clear_product_image")?;
    if let Err(err) = state
        .storage
        .remove_prefix(BlobBucket::ProductImages, project_id)
        .await
    {
        warn!(
            target: "stitchdesk",
            event = "product_image_sweep_failed",
            project_id = %project_id,
            error = %err
        );
    }
    state.with_projects(|list| {
        if let Some(project) = projects::find_mut(list, project_id) {
            project.product_image = None;
        }
    });
    Ok(())
}
