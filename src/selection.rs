//! Editor selection context: which project, inspection, and invoice are
//! open. Held explicitly and passed around rather than living in ambient
//! globals, so aggregate rules and selection rules stay independently
//! testable. Sub-entity pointers are scoped to the active project.

use thiserror::Error;

use crate::model::{Inspection, Project};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActivateError {
    #[error("project not found")]
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    project: Option<String>,
    inspection: Option<String>,
    invoice: Option<String>,
}

impl Selection {
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn inspection_id(&self) -> Option<&str> {
        self.inspection.as_deref()
    }

    pub fn invoice_id(&self) -> Option<&str> {
        self.invoice.as_deref()
    }

    /// Switching projects drops the sub-entity pointers: they are only
    /// meaningful within the project they were selected under.
    pub fn activate_project(&mut self, id: &str) {
        if self.project.as_deref() != Some(id) {
            self.inspection = None;
            self.invoice = None;
        }
        self.project = Some(id.to_string());
    }

    pub fn activate_inspection(&mut self, project_id: &str, inspection_id: &str) {
        self.activate_project(project_id);
        self.inspection = Some(inspection_id.to_string());
    }

    pub fn activate_invoice(&mut self, project_id: &str, invoice_id: &str) {
        self.activate_project(project_id);
        self.invoice = Some(invoice_id.to_string());
    }

    pub fn clear(&mut self) {
        self.project = None;
        self.inspection = None;
        self.invoice = None;
    }

    /// Re-selection rule: when the active inspection is deleted, the first
    /// remaining one becomes active, or none if the list emptied.
    pub fn after_inspection_removed(&mut self, removed_id: &str, remaining: &[Inspection]) {
        if self.inspection.as_deref() == Some(removed_id) {
            self.inspection = remaining.first().map(|i| i.id.clone());
        }
    }

    /// Deleting the active project clears the whole context.
    pub fn after_project_removed(&mut self, removed_id: &str) {
        if self.project.as_deref() == Some(removed_id) {
            self.clear();
        }
    }
}

/// Validate-then-activate, for callers handing over a raw id.
pub fn activate_project(
    selection: &mut Selection,
    projects: &[Project],
    id: &str,
) -> Result<(), ActivateError> {
    if !projects.iter().any(|p| p.id == id) {
        return Err(ActivateError::NotFound);
    }
    selection.activate_project(id);
    Ok(())
}
