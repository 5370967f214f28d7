//! Pure list rules for the project aggregate: lookup, stable-id upsert,
//! removal, and create-if-absent seeding for nested records. The
//! synchronization layer applies these locally before persisting.

use crate::factory;
use crate::model::{Inspection, Invoice, Project};

pub fn find<'a>(projects: &'a [Project], id: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.id == id)
}

pub fn find_mut<'a>(projects: &'a mut [Project], id: &str) -> Option<&'a mut Project> {
    projects.iter_mut().find(|p| p.id == id)
}

/// Replace in place when an entry with the same id exists (order
/// preserved), append otherwise. Returns true when an entry was replaced.
fn upsert_by_id<T, F>(list: &mut Vec<T>, entity: T, id_of: F) -> bool
where
    F: Fn(&T) -> &str,
{
    let id = id_of(&entity).to_string();
    if let Some(slot) = list.iter_mut().find(|item| id_of(item) == id) {
        *slot = entity;
        true
    } else {
        list.push(entity);
        false
    }
}

pub fn upsert_inspection(project: &mut Project, inspection: Inspection) -> bool {
    upsert_by_id(&mut project.inspections, inspection, |i| &i.id)
}

pub fn upsert_invoice(project: &mut Project, invoice: Invoice) -> bool {
    upsert_by_id(&mut project.invoices, invoice, |i| &i.id)
}

/// Returns true when an entry was removed.
pub fn remove_inspection(project: &mut Project, id: &str) -> bool {
    let before = project.inspections.len();
    project.inspections.retain(|i| i.id != id);
    project.inspections.len() != before
}

/// Result of a create-if-absent access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// An existing entry was selected.
    Existing(String),
    /// A default entry was seeded and must be persisted.
    Created(String),
}

impl EnsureOutcome {
    pub fn id(&self) -> &str {
        match self {
            EnsureOutcome::Existing(id) | EnsureOutcome::Created(id) => id,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created(_))
    }
}

/// Seed a default inspection when the project has none, otherwise select
/// the most recent (last) entry. Idempotent.
pub fn ensure_inspection(project: &mut Project) -> EnsureOutcome {
    if let Some(existing) = project.inspections.last() {
        return EnsureOutcome::Existing(existing.id.clone());
    }
    let inspection = factory::default_inspection(&project.id, &project.title, "Inline");
    let id = inspection.id.clone();
    project.inspections.push(inspection);
    EnsureOutcome::Created(id)
}

/// Seed a default invoice when the project has none, otherwise select the
/// first (canonical) invoice. Idempotent.
pub fn ensure_invoice(project: &mut Project) -> EnsureOutcome {
    if let Some(existing) = project.invoices.first() {
        return EnsureOutcome::Existing(existing.id.clone());
    }
    let invoice = factory::default_invoice();
    let id = invoice.id.clone();
    project.invoices.push(invoice);
    EnsureOutcome::Created(id)
}
