//! Domain model for a garment style ("project") and its nested records.
//!
//! Nested records are embedded in the project's persisted row as JSON, so
//! every type here serializes with the camelCase field names that shape uses.
//! Top-level row field names are the mapper's concern (see `row`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const VALIDATION_TITLE_REQUIRED: &str = "VALIDATION/TITLE_REQUIRED";
pub const VALIDATION_PO_REQUIRED: &str = "VALIDATION/PO_REQUIRED";
pub const VALIDATION_FILE_NAME_REQUIRED: &str = "VALIDATION/FILE_NAME_REQUIRED";
pub const PROJECT_NOT_FOUND: &str = "PROJECT/NOT_FOUND";
pub const BACKEND_READ_FAILED: &str = "BACKEND/READ_FAILED";
pub const BACKEND_WRITE_FAILED: &str = "BACKEND/WRITE_FAILED";
pub const BACKEND_DELETE_FAILED: &str = "BACKEND/DELETE_FAILED";
pub const STORAGE_UPLOAD_FAILED: &str = "STORAGE/UPLOAD_FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Submitted,
    ChangesRequested,
    Approved,
    Rejected,
    Pending,
    Accepted,
}

/// Workflow status shared by inspections and invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Draft,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallResult {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Buyer,
    Supplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Measurement,
    Fit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "S/C")]
    SalesContract,
    #[serde(rename = "L/C")]
    LetterOfCredit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipmentMethod {
    #[default]
    #[serde(rename = "SEA")]
    Sea,
    #[serde(rename = "AIR")]
    Air,
    #[serde(rename = "SEA-AIR")]
    SeaAir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub role: UserRole,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub upload_date: String,
}

/// A tech-pack file held by the blob store. `storage_path` is the key
/// needed to delete or replace the stored blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedTechPack {
    pub id: String,
    pub name: String,
    pub file_url: String,
    pub upload_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoNumber {
    pub id: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub id: String,
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Tech-pack content pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPoint {
    pub id: String,
    pub code: String,
    pub label_es: String,
    pub label_en: String,
    #[serde(default)]
    pub values: Vec<String>,
    pub tolerance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHeader {
    pub season: String,
    pub year: String,
    pub style_name: String,
    pub date: String,
    pub designer_name: String,
    pub designer_email: String,
    pub department: String,
    pub garment_details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentSpecs {
    pub supplier: String,
    pub reference_number: String,
    pub department_type: String,
    pub garment_type: String,
    pub sample_date: String,
    pub season_code: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledImage {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechPackPage {
    pub id: String,
    pub page_type: PageType,
    pub tab_name: String,
    pub section_title: String,
    pub left_panel_content: String,
    #[serde(default)]
    pub measurement_versions: Vec<String>,
    pub header: PageHeader,
    pub specs: GarmentSpecs,
    #[serde(default)]
    pub measurements: Vec<MeasurementPoint>,
    #[serde(default)]
    pub images: Vec<LabeledImage>,
}

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSizeRow {
    pub id: String,
    pub size: String,
    pub order_qty: i64,
    pub ship_qty: i64,
    pub carton_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentGroup {
    pub id: String,
    pub color: String,
    #[serde(default)]
    pub rows: Vec<ShipmentSizeRow>,
}

/// Checklist entry in the inspection's document section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentItem {
    pub id: String,
    pub label: String,
    pub available: bool,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcDefectRow {
    pub id: String,
    pub description: String,
    pub critical: i64,
    pub major: i64,
    pub minor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcSummary {
    pub major_found: i64,
    pub max_allowed: i64,
    pub critical_max_allowed: i64,
    pub minor_max_allowed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionComment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcColorColumn {
    pub id: String,
    pub color: String,
}

/// Column group of the measurement table, one per garment size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMeasurementGroup {
    pub id: String,
    pub size: String,
    #[serde(default)]
    pub color_cols: Vec<QcColorColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMeasurementSubColumn {
    pub id: String,
    pub color: String,
    pub standard_value: String,
}

/// One cell of the grid: the measured value for (row, group), with one
/// standard-value sub-column per color in that group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMeasurementEntry {
    pub id: String,
    pub size: String,
    pub actual_value: String,
    #[serde(default)]
    pub sub_columns: Vec<QcMeasurementSubColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMeasurementRow {
    pub id: String,
    pub point: String,
    pub name: String,
    pub tolerance_plus: String,
    pub tolerance_minus: String,
    /// Keyed by group id; every key must reference a group in the table.
    #[serde(default)]
    pub groups: BTreeMap<String, QcMeasurementEntry>,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMeasurementTable {
    #[serde(default)]
    pub groups: Vec<QcMeasurementGroup>,
    #[serde(default)]
    pub rows: Vec<QcMeasurementRow>,
}

impl QcMeasurementTable {
    /// Structural invariant check: every row entry must point at a known
    /// group and every sub-column at a color of that group.
    pub fn is_consistent(&self) -> bool {
        self.rows.iter().all(|row| {
            row.groups.iter().all(|(group_id, entry)| {
                let Some(group) = self.groups.iter().find(|g| &g.id == group_id) else {
                    return false;
                };
                entry
                    .sub_columns
                    .iter()
                    .all(|sub| group.color_cols.iter().any(|col| col.id == sub.id))
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionData {
    pub supplier_name: String,
    pub supplier_address: String,
    pub inspection_type: String,
    pub inspector_name: String,
    pub inspection_date: String,
    pub buyer_name: String,
    pub style_name: String,
    pub style_number: String,
    pub order_number: String,
    pub total_order_quantity: i64,
    pub ref_number: String,
    pub color_name: String,
    pub composition: String,
    pub gauges: String,
    pub weight: String,
    pub time: String,
    pub factory_name: String,
    pub factory_contact: String,
    pub country_of_production: String,
    #[serde(default)]
    pub shipment_groups: Vec<ShipmentGroup>,
    pub measurement_qty: i64,
    pub controlled_qty: i64,
    #[serde(default)]
    pub attachments: Vec<AttachmentItem>,
    #[serde(default)]
    pub qc_defects: Vec<QcDefectRow>,
    pub qc_summary: QcSummary,
    pub overall_result: OverallResult,
    pub judgement_comments: String,
    pub additional_comments: String,
    pub qc_measurement_table: QcMeasurementTable,
    pub global_master_tolerance: String,
    pub max_tolerance_color_variation: f64,
    pub measurement_comments: String,
    #[serde(default)]
    pub images: Vec<LabeledImage>,
    /// Which editor sections render; a capability set, not behavior.
    #[serde(default)]
    pub visible_sections: Vec<String>,
    #[serde(default)]
    pub section_comments: BTreeMap<String, Vec<SectionComment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: RecordStatus,
    pub data: InspectionData,
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub id: String,
    pub marks_and_number: String,
    pub description: String,
    pub composition: String,
    pub order_no: String,
    pub style_no: String,
    pub hs_code: String,
    pub quantity: i64,
    pub cartons: i64,
    pub unit_price: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_no: String,
    pub invoice_date: String,
    pub exp_no: String,
    pub exp_date: String,
    pub sc_no: String,
    pub sc_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lc_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lc_date: Option<String>,
    pub shipper_name: String,
    pub shipper_address: String,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_vat_id: String,
    pub consignee_name: String,
    pub consignee_address: String,
    pub notify_party1_name: String,
    pub notify_party1_address: String,
    pub notify_party1_phone: String,
    pub notify_party1_contact: String,
    pub notify_party1_email: String,
    pub notify_party2_name: String,
    pub notify_party2_address: String,
    pub bank_name: String,
    pub bank_branch: String,
    pub bank_swift: String,
    pub bank_account_no: String,
    pub export_reg_no: String,
    pub export_reg_date: String,
    pub port_of_loading: String,
    pub final_destination: String,
    pub payment_terms: String,
    pub mode_of_shipment: String,
    pub bl_no: String,
    pub bl_date: String,
    pub country_of_origin: String,
    #[serde(default)]
    pub line_items: Vec<InvoiceLineItem>,
    pub net_weight: f64,
    pub gross_weight: f64,
    pub total_cbm: f64,
    pub rex_declaration: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingBoxDetail {
    pub id: String,
    pub seq_range: String,
    pub total_boxes: i64,
    pub units_per_box: i64,
    pub model: String,
    pub quality: String,
    pub color_ref: String,
    pub color_code: String,
    pub size: String,
    pub ratio: f64,
    pub total_pcs_in_one_bag: i64,
    pub total_bag_in_ctn: i64,
    pub total_bag: i64,
    pub units: i64,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingSummaryRow {
    pub id: String,
    pub model: String,
    pub quality: String,
    pub color_ref: String,
    #[serde(default)]
    pub sizes: BTreeMap<String, i64>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorReference {
    pub color_code: String,
    pub color_name: String,
}

/// Single embedded packing record per project (not a list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingInfo {
    pub division: String,
    pub section: String,
    pub invoice_ref: String,
    pub delivery_note_no: String,
    pub order_number: String,
    pub shipment_type: String,
    pub alarmed_goods: bool,
    pub supplier_code: String,
    pub supplier_name: String,
    pub vat_code: String,
    pub address: String,
    pub phone: String,
    pub fax: String,
    pub email: String,
    pub destination: String,
    pub delivery_address: String,
    pub shipment_date: String,
    pub arrival_date: String,
    pub arrival_time: String,
    #[serde(default)]
    pub box_details: Vec<PackingBoxDetail>,
    #[serde(default)]
    pub summary_rows: Vec<PackingSummaryRow>,
    #[serde(default)]
    pub color_references: Vec<ColorReference>,
    pub gross_weight: f64,
    pub gross_weight_unit: String,
    pub net_weight: f64,
    pub net_weight_unit: String,
    pub volume: f64,
    pub volume_unit: String,
    pub carton_type: String,
    pub box_length_cm: f64,
    pub box_width_cm: f64,
    pub box_height_cm: f64,
    pub remarks: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

// ---------------------------------------------------------------------------
// PP meetings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionDetail {
    pub id: String,
    pub knitting_start_date: String,
    pub color: String,
    pub num_machines: i64,
    pub lead_time_days: i64,
    pub production_per_day: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub label: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpMeeting {
    pub id: String,
    pub meeting_type: String,
    pub meeting_date: String,
    pub style_number: String,
    pub order_number: String,
    pub order_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_remarks: Option<String>,
    #[serde(default)]
    pub info_attachments: Vec<FileAttachment>,
    #[serde(default)]
    pub production_details: Vec<ProductionDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_remarks: Option<String>,
    #[serde(default)]
    pub production_attachments: Vec<FileAttachment>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_remarks: Option<String>,
    #[serde(default)]
    pub milestone_attachments: Vec<FileAttachment>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_remarks: Option<String>,
    #[serde(default)]
    pub approval_attachments: Vec<FileAttachment>,
    pub qc_measurement_table: QcMeasurementTable,
    pub global_master_tolerance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

// ---------------------------------------------------------------------------
// Material control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialControlItem {
    pub id: String,
    pub label: String,
    pub order_qty: i64,
    pub received_qty: i64,
    pub total_weight: f64,
    pub weight_per_production: f64,
    pub deadline: String,
    pub received_date: String,
    pub actual_quality: String,
    pub received_quality: String,
    pub remark: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    pub acceptance: String,
    pub acceptance_date: String,
    pub maturity_date: String,
}

// ---------------------------------------------------------------------------
// Order sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSizeRow {
    pub id: String,
    pub color_code: String,
    #[serde(default)]
    pub sizes: BTreeMap<String, i64>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoAccessories {
    pub main_label: String,
    pub care_label: String,
    pub hang_tag: String,
    pub polybag: String,
    pub carton: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBreakdown {
    pub id: String,
    pub po_number: String,
    #[serde(default)]
    pub size_columns: Vec<String>,
    #[serde(default)]
    pub size_rows: Vec<ColorSizeRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_created: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_edited: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSheet {
    pub id: String,
    pub company_name: String,
    pub company_address: String,
    pub company_email1: String,
    pub company_email2: String,
    pub po_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_numbers: Option<Vec<PoNumber>>,
    pub factory_name: String,
    pub factory_address: String,
    pub factory_bin: String,
    pub buyer_name: String,
    pub buyer_address: String,
    pub consignee_name: String,
    pub consignee_address: String,
    pub shipment_date: String,
    pub incoterms: String,
    pub payment_method: String,
    pub po_date: String,
    pub season: String,
    pub currency: String,
    pub contract_no: String,
    pub payment_terms: String,
    pub rn_number: String,
    pub ex_factory_date: String,
    pub shipment_method: ShipmentMethod,
    pub origin_country: String,
    pub port_of_lading: String,
    pub discharge_port: String,
    pub hs_code: String,
    pub style_name: String,
    pub style_code: String,
    pub fabric_weight: String,
    pub composition: String,
    pub gauge: String,
    pub size_ratio: String,
    pub unit_price: f64,
    pub product_image_url: String,
    #[serde(default)]
    pub breakdowns: Vec<OrderBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_rows: Option<Vec<ColorSizeRow>>,
    pub accessories: PoAccessories,
    #[serde(default)]
    pub remarks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Consumption
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YarnConsumptionItem {
    pub id: String,
    pub yarn_type: String,
    pub composition_percent: f64,
    pub weight_per_piece: f64,
    pub wastage_percent: f64,
    pub rate_per_kg: f64,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryConsumptionItem {
    pub id: String,
    pub accessory_name: String,
    pub description: String,
    pub specification: String,
    pub quantity_per_garment: f64,
    pub unit: String,
    pub wastage_percent: f64,
    pub rate_per_unit: f64,
    pub supplier: String,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionData {
    pub id: String,
    #[serde(default)]
    pub yarn_items: Vec<YarnConsumptionItem>,
    #[serde(default)]
    pub accessory_items: Vec<AccessoryConsumptionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

// ---------------------------------------------------------------------------
// Project root
// ---------------------------------------------------------------------------

/// The root aggregate: one garment style and everything attached to it.
///
/// Every collection is always materialized (empty, never missing) once a
/// project has been normalized from storage. `order_sheet` and
/// `consumption` are genuinely optional: absent means "not yet created".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default)]
    pub product_colors: Vec<ProductColor>,
    pub po_numbers: Vec<PoNumber>,
    pub updated_at: String,
    pub status: ProjectStatus,
    pub tech_pack_files: Vec<UploadedTechPack>,
    pub pages: Vec<TechPackPage>,
    pub comments: Vec<Comment>,
    pub inspections: Vec<Inspection>,
    pub pp_meetings: Vec<PpMeeting>,
    pub material_control: Vec<MaterialControlItem>,
    pub invoices: Vec<Invoice>,
    pub packing: PackingInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_sheet: Option<OrderSheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionData>,
    pub material_remarks: String,
    pub material_attachments: Vec<FileAttachment>,
    pub material_comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        let json = serde_json::to_string(&ProjectStatus::ChangesRequested).unwrap();
        assert_eq!(json, "\"CHANGES_REQUESTED\"");
        let back: ProjectStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProjectStatus::ChangesRequested);
    }

    #[test]
    fn inspection_type_serializes_as_type() {
        let json = serde_json::json!({
            "id": "INS-1",
            "projectId": "proj-1",
            "type": "Inline",
            "status": "DRAFT",
            "data": sample_inspection_data_json(),
        });
        let inspection: Inspection = serde_json::from_value(json).unwrap();
        assert_eq!(inspection.kind, "Inline");
        let out = serde_json::to_value(&inspection).unwrap();
        assert_eq!(out.get("type").and_then(|v| v.as_str()), Some("Inline"));
    }

    #[test]
    fn measurement_table_consistency_detects_orphan_entries() {
        let mut table = QcMeasurementTable::default();
        table.groups.push(QcMeasurementGroup {
            id: "g-S-1".into(),
            size: "S".into(),
            color_cols: vec![QcColorColumn {
                id: "c-1".into(),
                color: "Standard".into(),
            }],
        });
        let mut groups = BTreeMap::new();
        groups.insert(
            "g-S-1".into(),
            QcMeasurementEntry {
                id: "g-S-1".into(),
                size: "S".into(),
                actual_value: String::new(),
                sub_columns: vec![QcMeasurementSubColumn {
                    id: "c-1".into(),
                    color: "Standard".into(),
                    standard_value: String::new(),
                }],
            },
        );
        table.rows.push(QcMeasurementRow {
            id: "m-0".into(),
            point: "1".into(),
            name: "Body length".into(),
            tolerance_plus: "1.0".into(),
            tolerance_minus: "1.0".into(),
            groups,
            remarks: String::new(),
        });
        assert!(table.is_consistent());

        table.rows[0].groups.insert(
            "g-M-unknown".into(),
            QcMeasurementEntry {
                id: "g-M-unknown".into(),
                size: "M".into(),
                actual_value: String::new(),
                sub_columns: Vec::new(),
            },
        );
        assert!(!table.is_consistent());
    }

    fn sample_inspection_data_json() -> serde_json::Value {
        serde_json::json!({
            "supplierName": "", "supplierAddress": "", "inspectionType": "",
            "inspectorName": "", "inspectionDate": "", "buyerName": "",
            "styleName": "", "styleNumber": "", "orderNumber": "",
            "totalOrderQuantity": 0, "refNumber": "", "colorName": "",
            "composition": "", "gauges": "", "weight": "", "time": "",
            "factoryName": "", "factoryContact": "", "countryOfProduction": "",
            "shipmentGroups": [], "measurementQty": 0, "controlledQty": 0,
            "attachments": [], "qcDefects": [],
            "qcSummary": {"majorFound": 0, "maxAllowed": 4, "criticalMaxAllowed": 0, "minorMaxAllowed": 10},
            "overallResult": "PENDING", "judgementComments": "",
            "additionalComments": "",
            "qcMeasurementTable": {"groups": [], "rows": []},
            "globalMasterTolerance": "1.0", "maxToleranceColorVariation": 0.0,
            "measurementComments": "", "images": [], "visibleSections": [],
            "sectionComments": {}
        })
    }
}
