//! Default-entity factories: fully populated records seeded from minimal
//! input. Shapes here are business defaults for the factory's paperwork;
//! editors only ever refine them.

use std::collections::BTreeMap;

use crate::id;
use crate::model::{
    ColorReference, GarmentSpecs, Inspection, InspectionData, Invoice, LabeledImage,
    MeasurementPoint, OverallResult, PackingInfo, PageHeader, PageType, PoNumber, Project,
    ProjectStatus, QcColorColumn, QcMeasurementEntry, QcMeasurementGroup, QcMeasurementRow,
    QcMeasurementSubColumn, QcMeasurementTable, QcSummary, RecordStatus, TechPackPage,
};
use crate::time::{now_iso, now_ms, today};

pub const SUPPLIER_NAME: &str = "FASHION COMFORT (BD) LTD";

/// Measurement points every fresh inspection grid starts with.
pub const PRESET_MEASUREMENTS: &[&str] = &["Body length", "Chest width"];

/// Garment sizes every fresh inspection grid starts with.
pub const PRESET_SIZES: &[&str] = &["S", "M", "L"];

pub const DEFAULT_TOLERANCE: &str = "1.0";

pub const DEFAULT_VISIBLE_SECTIONS: &[&str] = &[
    "generalInfo",
    "orderDetails",
    "shipment",
    "qcDefects",
    "judgement",
    "measurements",
];

/// Constant-shaped packing record with the factory's shipping defaults.
pub fn default_packing() -> PackingInfo {
    PackingInfo {
        division: "BLOQUE".into(),
        section: "SENORA".into(),
        invoice_ref: String::new(),
        delivery_note_no: String::new(),
        order_number: String::new(),
        shipment_type: "SEA".into(),
        alarmed_goods: false,
        supplier_code: "PROV-123".into(),
        supplier_name: SUPPLIER_NAME.into(),
        vat_code: "VAT-BD-999".into(),
        address: "Dhaka".into(),
        phone: "+880-123".into(),
        fax: String::new(),
        email: "logistics@fashioncomfort.bd".into(),
        destination: "Barcelona".into(),
        delivery_address: String::new(),
        shipment_date: String::new(),
        arrival_date: String::new(),
        arrival_time: String::new(),
        box_details: Vec::new(),
        summary_rows: Vec::new(),
        color_references: Vec::<ColorReference>::new(),
        gross_weight: 0.0,
        gross_weight_unit: "KGS".into(),
        net_weight: 0.0,
        net_weight_unit: "KGS".into(),
        volume: 0.0,
        volume_unit: "CBM".into(),
        carton_type: "Standard".into(),
        box_length_cm: 0.0,
        box_width_cm: 0.0,
        box_height_cm: 0.0,
        remarks: String::new(),
        attachments: Vec::new(),
        comments: Some(Vec::new()),
    }
}

/// Fresh inspection with a generated measurement grid: one group per preset
/// size (a single "Standard" color column each), one row per preset
/// measurement point, and every row carrying exactly one entry per group.
pub fn default_inspection(project_id: &str, title: &str, kind: &str) -> Inspection {
    let groups: Vec<QcMeasurementGroup> = PRESET_SIZES
        .iter()
        .map(|size| QcMeasurementGroup {
            id: id::measurement_group_id(size),
            size: (*size).into(),
            color_cols: vec![QcColorColumn {
                id: id::color_col_id(),
                color: "Standard".into(),
            }],
        })
        .collect();

    let rows: Vec<QcMeasurementRow> = PRESET_MEASUREMENTS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut row_groups = BTreeMap::new();
            for group in &groups {
                row_groups.insert(
                    group.id.clone(),
                    QcMeasurementEntry {
                        id: group.id.clone(),
                        size: group.size.clone(),
                        actual_value: String::new(),
                        sub_columns: vec![QcMeasurementSubColumn {
                            id: group.color_cols[0].id.clone(),
                            color: "Standard".into(),
                            standard_value: String::new(),
                        }],
                    },
                );
            }
            QcMeasurementRow {
                id: format!("m-{i}"),
                point: (i + 1).to_string(),
                name: (*name).into(),
                tolerance_plus: DEFAULT_TOLERANCE.into(),
                tolerance_minus: DEFAULT_TOLERANCE.into(),
                groups: row_groups,
                remarks: String::new(),
            }
        })
        .collect();

    Inspection {
        id: id::inspection_id(),
        project_id: project_id.into(),
        kind: kind.into(),
        status: RecordStatus::Draft,
        data: InspectionData {
            supplier_name: SUPPLIER_NAME.into(),
            supplier_address: String::new(),
            inspection_type: String::new(),
            inspector_name: String::new(),
            inspection_date: today(),
            buyer_name: String::new(),
            style_name: title.into(),
            style_number: String::new(),
            order_number: String::new(),
            total_order_quantity: 0,
            ref_number: String::new(),
            color_name: String::new(),
            composition: "100% Cotton".into(),
            gauges: String::new(),
            weight: String::new(),
            time: String::new(),
            factory_name: String::new(),
            factory_contact: String::new(),
            country_of_production: String::new(),
            shipment_groups: Vec::new(),
            measurement_qty: 0,
            controlled_qty: 0,
            attachments: Vec::new(),
            qc_defects: Vec::new(),
            qc_summary: QcSummary {
                major_found: 0,
                max_allowed: 4,
                critical_max_allowed: 0,
                minor_max_allowed: 10,
            },
            overall_result: OverallResult::Pending,
            judgement_comments: String::new(),
            additional_comments: String::new(),
            qc_measurement_table: QcMeasurementTable { groups, rows },
            global_master_tolerance: DEFAULT_TOLERANCE.into(),
            max_tolerance_color_variation: 0.0,
            measurement_comments: String::new(),
            images: Vec::new(),
            visible_sections: DEFAULT_VISIBLE_SECTIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            section_comments: BTreeMap::new(),
        },
    }
}

/// Fresh export invoice with the factory's fixed identity and routing.
pub fn default_invoice() -> Invoice {
    Invoice {
        id: id::invoice_id(),
        invoice_no: format!("FC-{:06}", now_ms() % 1_000_000),
        invoice_date: today(),
        exp_no: String::new(),
        exp_date: String::new(),
        sc_no: String::new(),
        sc_date: String::new(),
        payment_type: None,
        lc_no: None,
        lc_date: None,
        shipper_name: SUPPLIER_NAME.into(),
        shipper_address: "Dhaka, Bangladesh".into(),
        buyer_name: String::new(),
        buyer_address: String::new(),
        buyer_vat_id: String::new(),
        consignee_name: String::new(),
        consignee_address: String::new(),
        notify_party1_name: String::new(),
        notify_party1_address: String::new(),
        notify_party1_phone: String::new(),
        notify_party1_contact: String::new(),
        notify_party1_email: String::new(),
        notify_party2_name: String::new(),
        notify_party2_address: String::new(),
        bank_name: String::new(),
        bank_branch: String::new(),
        bank_swift: String::new(),
        bank_account_no: String::new(),
        export_reg_no: String::new(),
        export_reg_date: String::new(),
        port_of_loading: "Chittagong, BD".into(),
        final_destination: String::new(),
        payment_terms: "TT / LC".into(),
        mode_of_shipment: "SEA".into(),
        bl_no: String::new(),
        bl_date: String::new(),
        country_of_origin: "Bangladesh".into(),
        line_items: Vec::new(),
        net_weight: 0.0,
        gross_weight: 0.0,
        total_cbm: 0.0,
        rex_declaration: "The exporter declarations...".into(),
        attachments: Vec::new(),
        status: RecordStatus::Draft,
        remarks: Some(String::new()),
        comments: Some(Vec::new()),
    }
}

fn preset_point(
    id: &str,
    code: &str,
    label_es: &str,
    label_en: &str,
    tolerance: &str,
) -> MeasurementPoint {
    MeasurementPoint {
        id: id.into(),
        code: code.into(),
        label_es: label_es.into(),
        label_en: label_en.into(),
        values: vec![String::new()],
        tolerance: tolerance.into(),
    }
}

/// The preset measurement chart every new tech-pack page starts from.
pub fn preset_measurement_points() -> Vec<MeasurementPoint> {
    vec![
        preset_point("1", "A", "Ancho cuello", "Neck width", "0.5"),
        preset_point("2", "A1", "Bajada cuello delantero", "Front neck drop", "0.5"),
        preset_point("3", "A2", "Bajada cuello trasero", "Back neck drop", "0.5"),
        preset_point("4", "B", "Ancho hombro", "Shoulder width", "1.0"),
        preset_point("5", "C", "Ancho pecho", "Chest width", "1.0"),
        preset_point("6", "C1", "Ancho cintura", "Waist width", "1.0"),
        preset_point("7", "C2", "Ancho bajo", "Hem width", "1.0"),
        preset_point("8", "D", "Largo total", "Total length", "1.5"),
        preset_point("9", "E", "Largo manga", "Sleeve length", "1.0"),
        preset_point("10", "F", "Ancho sisa", "Armhole width", "0.5"),
        preset_point("11", "G", "Ancho bíceps", "Bicep width", "0.5"),
        preset_point("12", "H", "Puño", "Cuff opening", "0.5"),
        preset_point("13", "I", "Alto puño", "Cuff height", "0.2"),
        preset_point("14", "J", "Alto cuello", "Neck trim height", "0.2"),
    ]
}

/// Template measurement page cloned into every new project, with the style
/// name stamped into the header.
pub fn template_page(style_name: &str) -> TechPackPage {
    let date = today();
    TechPackPage {
        id: "page-1".into(),
        page_type: PageType::Measurement,
        tab_name: "Measurements".into(),
        section_title: "MEASUREMENTS".into(),
        left_panel_content: String::new(),
        measurement_versions: vec!["Original".into()],
        header: PageHeader {
            season: "SS".into(),
            year: date[..4].to_string(),
            style_name: style_name.into(),
            date: date.clone(),
            designer_name: "Factory User".into(),
            designer_email: String::new(),
            department: "WOMEN KNITWEAR".into(),
            garment_details: "Self fabric neck binding. Twin needle stitch at hem and cuffs. \
                              1x1 Rib structure."
                .into(),
        },
        specs: GarmentSpecs {
            supplier: SUPPLIER_NAME.into(),
            reference_number: String::new(),
            department_type: "Circular Knit".into(),
            garment_type: "Camiseta / T-Shirt".into(),
            sample_date: date,
            season_code: "S1".into(),
            size: "M".into(),
        },
        measurements: preset_measurement_points(),
        images: vec![
            LabeledImage {
                url: "https://picsum.photos/800/800".into(),
                label: "Front View".into(),
            },
            LabeledImage {
                url: "https://picsum.photos/400/600".into(),
                label: "Side View".into(),
            },
            LabeledImage {
                url: "https://picsum.photos/400/400".into(),
                label: "Detail".into(),
            },
        ],
    }
}

/// A full new project: one PO number, one template page, default packing,
/// every other collection empty.
pub fn new_project(title: &str, po_number: &str) -> Project {
    Project {
        id: id::project_id(),
        title: title.into(),
        product_image: None,
        product_colors: Vec::new(),
        po_numbers: vec![PoNumber {
            id: id::po_id(),
            number: po_number.into(),
            quantity: None,
            delivery_date: None,
        }],
        updated_at: now_iso(),
        status: ProjectStatus::Draft,
        tech_pack_files: Vec::new(),
        pages: vec![template_page(title)],
        comments: Vec::new(),
        inspections: Vec::new(),
        pp_meetings: Vec::new(),
        material_control: Vec::new(),
        invoices: Vec::new(),
        packing: default_packing(),
        order_sheet: None,
        consumption: None,
        material_remarks: String::new(),
        material_attachments: Vec::new(),
        material_comments: Vec::new(),
    }
}
