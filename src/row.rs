//! Mapping between the domain model and the persisted row shape.
//!
//! A project is stored as a single row: snake_case top-level columns, the
//! nested records embedded as JSON in their domain (camelCase) shape. The
//! mapper is total in both directions: `to_row` mirrors field presence
//! exactly and injects nothing, `from_row` normalizes whatever storage
//! returns into a fully materialized `Project`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::factory;
use crate::model::{
    Comment, ConsumptionData, FileAttachment, Inspection, Invoice, MaterialControlItem,
    OrderSheet, PackingInfo, PoNumber, PpMeeting, Project, ProjectStatus, TechPackPage,
    UploadedTechPack,
};

/// PO numbers have been stored both as full records and, historically, as
/// bare strings. `from_row` normalizes the legacy form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPoNumber {
    Record(PoNumber),
    Legacy(String),
}

/// The full persisted row. Collection columns are nullable in storage, so
/// they deserialize as options and are normalized by `from_row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub po_numbers: Option<Vec<StoredPoNumber>>,
    pub updated_at: String,
    #[serde(default)]
    pub tech_pack_files: Option<Vec<UploadedTechPack>>,
    #[serde(default)]
    pub pages: Option<Vec<TechPackPage>>,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
    #[serde(default)]
    pub inspections: Option<Vec<Inspection>>,
    #[serde(default)]
    pub pp_meetings: Option<Vec<PpMeeting>>,
    #[serde(default)]
    pub material_control: Option<Vec<MaterialControlItem>>,
    #[serde(default)]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(default)]
    pub packing: Option<PackingInfo>,
    #[serde(default)]
    pub order_sheet: Option<OrderSheet>,
    #[serde(default)]
    pub consumption: Option<ConsumptionData>,
    #[serde(default)]
    pub material_remarks: Option<String>,
    #[serde(default)]
    pub material_attachments: Option<Vec<FileAttachment>>,
    #[serde(default)]
    pub material_comments: Option<Vec<Comment>>,
}

/// Partial domain update. A `None` field was not touched and must not
/// appear in the outgoing row patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_numbers: Option<Vec<PoNumber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_pack_files: Option<Vec<UploadedTechPack>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<TechPackPage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspections: Option<Vec<Inspection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pp_meetings: Option<Vec<PpMeeting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_control: Option<Vec<MaterialControlItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packing: Option<PackingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_sheet: Option<OrderSheet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_attachments: Option<Vec<FileAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_comments: Option<Vec<Comment>>,
}

/// The persisted-row counterpart of `ProjectPatch`: exactly the fields
/// present in the source patch, under their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_numbers: Option<Vec<PoNumber>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_pack_files: Option<Vec<UploadedTechPack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<TechPackPage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspections: Option<Vec<Inspection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pp_meetings: Option<Vec<PpMeeting>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_control: Option<Vec<MaterialControlItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing: Option<PackingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_sheet: Option<OrderSheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_attachments: Option<Vec<FileAttachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_comments: Option<Vec<Comment>>,
}

impl RowPatch {
    /// Column-name/value map for dynamic UPDATE statements. Only the fields
    /// present in the patch appear as keys.
    pub fn into_map(self) -> AppResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::new(
                "JSON/DATA",
                "row patch must serialize to an object",
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == RowPatch::default()
    }
}

/// Translate a partial domain update into its persisted-row shape.
/// Presence is mirrored exactly; nothing is defaulted here.
pub fn to_row(patch: ProjectPatch) -> RowPatch {
    RowPatch {
        title: patch.title,
        status: patch.status,
        po_numbers: patch.po_numbers,
        updated_at: patch.updated_at,
        tech_pack_files: patch.tech_pack_files,
        pages: patch.pages,
        comments: patch.comments,
        inspections: patch.inspections,
        pp_meetings: patch.pp_meetings,
        material_control: patch.material_control,
        invoices: patch.invoices,
        packing: patch.packing,
        order_sheet: patch.order_sheet,
        consumption: patch.consumption,
        material_remarks: patch.material_remarks,
        material_attachments: patch.material_attachments,
        material_comments: patch.material_comments,
    }
}

fn normalize_po_numbers(stored: Option<Vec<StoredPoNumber>>) -> Vec<PoNumber> {
    stored
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match entry {
            StoredPoNumber::Record(po) => po,
            StoredPoNumber::Legacy(number) => PoNumber {
                id: format!("legacy-{idx}"),
                number,
                quantity: None,
                delivery_date: None,
            },
        })
        .collect()
}

/// Normalize a persisted row into a full `Project`. Missing collections
/// become empty, a missing packing record gets the factory default, and
/// `order_sheet`/`consumption` stay absent when storage has none.
pub fn from_row(row: ProjectRow) -> Project {
    Project {
        id: row.id,
        title: row.title,
        product_image: None,
        product_colors: Vec::new(),
        po_numbers: normalize_po_numbers(row.po_numbers),
        updated_at: row.updated_at,
        status: row.status,
        tech_pack_files: row.tech_pack_files.unwrap_or_default(),
        pages: row.pages.unwrap_or_default(),
        comments: row.comments.unwrap_or_default(),
        inspections: row.inspections.unwrap_or_default(),
        pp_meetings: row.pp_meetings.unwrap_or_default(),
        material_control: row.material_control.unwrap_or_default(),
        invoices: row.invoices.unwrap_or_default(),
        packing: row.packing.unwrap_or_else(factory::default_packing),
        order_sheet: row.order_sheet,
        consumption: row.consumption,
        material_remarks: row.material_remarks.unwrap_or_default(),
        material_attachments: row.material_attachments.unwrap_or_default(),
        material_comments: row.material_comments.unwrap_or_default(),
    }
}

impl From<&Project> for ProjectPatch {
    /// Complete patch with every mapped field present. The round-trip law
    /// holds through this: `from_row` over the serialized full patch (plus
    /// identity) reproduces the project field for field.
    fn from(project: &Project) -> Self {
        ProjectPatch {
            title: Some(project.title.clone()),
            status: Some(project.status),
            po_numbers: Some(project.po_numbers.clone()),
            updated_at: Some(project.updated_at.clone()),
            tech_pack_files: Some(project.tech_pack_files.clone()),
            pages: Some(project.pages.clone()),
            comments: Some(project.comments.clone()),
            inspections: Some(project.inspections.clone()),
            pp_meetings: Some(project.pp_meetings.clone()),
            material_control: Some(project.material_control.clone()),
            invoices: Some(project.invoices.clone()),
            packing: Some(project.packing.clone()),
            order_sheet: project.order_sheet.clone(),
            consumption: project.consumption.clone(),
            material_remarks: Some(project.material_remarks.clone()),
            material_attachments: Some(project.material_attachments.clone()),
            material_comments: Some(project.material_comments.clone()),
        }
    }
}

impl From<&Project> for ProjectRow {
    /// Full row for inserts.
    fn from(project: &Project) -> Self {
        ProjectRow {
            id: project.id.clone(),
            title: project.title.clone(),
            status: project.status,
            po_numbers: Some(
                project
                    .po_numbers
                    .iter()
                    .cloned()
                    .map(StoredPoNumber::Record)
                    .collect(),
            ),
            updated_at: project.updated_at.clone(),
            tech_pack_files: Some(project.tech_pack_files.clone()),
            pages: Some(project.pages.clone()),
            comments: Some(project.comments.clone()),
            inspections: Some(project.inspections.clone()),
            pp_meetings: Some(project.pp_meetings.clone()),
            material_control: Some(project.material_control.clone()),
            invoices: Some(project.invoices.clone()),
            packing: Some(project.packing.clone()),
            order_sheet: project.order_sheet.clone(),
            consumption: project.consumption.clone(),
            material_remarks: Some(project.material_remarks.clone()),
            material_attachments: Some(project.material_attachments.clone()),
            material_comments: Some(project.material_comments.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::new_project;

    #[test]
    fn partial_patch_serializes_only_present_fields() {
        let patch = ProjectPatch {
            title: Some("Polo Shirt".into()),
            ..Default::default()
        };
        let map = to_row(patch).into_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("title").and_then(|v| v.as_str()),
            Some("Polo Shirt")
        );
    }

    #[test]
    fn empty_material_remarks_still_counts_as_present() {
        let patch = ProjectPatch {
            material_remarks: Some(String::new()),
            ..Default::default()
        };
        let map = to_row(patch).into_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("material_remarks"));
    }

    #[test]
    fn from_row_materializes_missing_collections() {
        let row = ProjectRow {
            id: "proj-1".into(),
            title: "Polo Shirt".into(),
            status: ProjectStatus::Draft,
            po_numbers: None,
            updated_at: "2026-01-01T00:00:00.000Z".into(),
            tech_pack_files: None,
            pages: None,
            comments: None,
            inspections: None,
            pp_meetings: None,
            material_control: None,
            invoices: None,
            packing: None,
            order_sheet: None,
            consumption: None,
            material_remarks: None,
            material_attachments: None,
            material_comments: None,
        };
        let project = from_row(row);
        assert!(project.po_numbers.is_empty());
        assert!(project.inspections.is_empty());
        assert_eq!(project.packing, factory::default_packing());
        assert!(project.order_sheet.is_none());
        assert!(project.consumption.is_none());
        assert_eq!(project.material_remarks, "");
    }

    #[test]
    fn legacy_po_numbers_normalize_to_records() {
        let row_json = serde_json::json!({
            "id": "proj-1",
            "title": "Polo Shirt",
            "status": "DRAFT",
            "updated_at": "2026-01-01T00:00:00.000Z",
            "po_numbers": ["PO-1001", {"id": "po-2", "number": "PO-1002"}],
        });
        let row: ProjectRow = serde_json::from_value(row_json).unwrap();
        let project = from_row(row);
        assert_eq!(project.po_numbers.len(), 2);
        assert_eq!(project.po_numbers[0].id, "legacy-0");
        assert_eq!(project.po_numbers[0].number, "PO-1001");
        assert_eq!(project.po_numbers[1].id, "po-2");
    }

    #[test]
    fn full_project_round_trips_through_the_wire_shape() {
        let project = new_project("Polo Shirt", "PO-1001");
        let row = ProjectRow::from(&project);
        let json = serde_json::to_value(&row).unwrap();
        let back: ProjectRow = serde_json::from_value(json).unwrap();
        assert_eq!(from_row(back), project);
    }
}
