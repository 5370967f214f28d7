use uuid::Uuid;

/// Time-ordered UUID, the base token for every generated identifier.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

pub fn project_id() -> String {
    format!("proj-{}", new_uuid_v7())
}

pub fn inspection_id() -> String {
    format!("INS-{}", new_uuid_v7())
}

pub fn invoice_id() -> String {
    format!("INV-{}", new_uuid_v7())
}

pub fn po_id() -> String {
    format!("po-{}", new_uuid_v7())
}

pub fn file_id() -> String {
    format!("file-{}", new_uuid_v7())
}

pub fn color_id() -> String {
    format!("color-{}", new_uuid_v7())
}

/// Measurement-table group column, one per garment size.
pub fn measurement_group_id(size: &str) -> String {
    format!("g-{size}-{}", new_uuid_v7())
}

/// Color sub-column inside a measurement group.
pub fn color_col_id() -> String {
    format!("c-{}", new_uuid_v7())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_keep_their_prefixes() {
        assert!(project_id().starts_with("proj-"));
        assert!(inspection_id().starts_with("INS-"));
        assert!(invoice_id().starts_with("INV-"));
        assert!(measurement_group_id("M").starts_with("g-M-"));
        assert!(color_col_id().starts_with("c-"));
    }

    #[test]
    fn rapid_generation_does_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(inspection_id()));
        }
    }
}
