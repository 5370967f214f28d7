//! Persistence backend for project rows.
//!
//! The synchronization layer talks to storage through `ProjectBackend`;
//! the SQLite implementation is the production path and the in-memory
//! implementation backs tests and ephemeral sessions. Both sit behind the
//! cloneable `BackendHandle`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::row::{ProjectRow, RowPatch};

/// Columns holding JSON-encoded values. `material_remarks` is plain text
/// and handled separately.
const JSON_COLUMNS: &[&str] = &[
    "po_numbers",
    "tech_pack_files",
    "pages",
    "comments",
    "inspections",
    "pp_meetings",
    "material_control",
    "invoices",
    "packing",
    "order_sheet",
    "consumption",
    "material_attachments",
    "material_comments",
];

const TEXT_COLUMNS: &[&str] = &["id", "title", "status", "updated_at", "material_remarks"];

#[async_trait]
pub trait ProjectBackend: Send + Sync {
    /// All rows, newest `updated_at` first.
    async fn select_all(&self) -> AppResult<Vec<ProjectRow>>;
    async fn insert(&self, row: ProjectRow) -> AppResult<()>;
    /// Partial update keyed by project id; absent fields stay untouched.
    async fn update(&self, id: &str, patch: RowPatch) -> AppResult<()>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_row(row: SqliteRow) -> AppResult<ProjectRow> {
    let mut map = Map::new();
    for col in TEXT_COLUMNS {
        let value: Option<String> = row.try_get(*col).map_err(AppError::from)?;
        if let Some(value) = value {
            map.insert((*col).to_string(), Value::String(value));
        }
    }
    for col in JSON_COLUMNS {
        let raw: Option<String> = row.try_get(*col).map_err(AppError::from)?;
        if let Some(raw) = raw {
            let value: Value = serde_json::from_str(&raw)
                .map_err(|err| AppError::from(err).with_context("column", (*col).to_string()))?;
            map.insert((*col).to_string(), value);
        }
    }
    Ok(serde_json::from_value(Value::Object(map))?)
}

fn bind_column<'q>(
    q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    column: &str,
    value: &Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        Value::Null => q.bind(Option::<String>::None),
        Value::String(s) if TEXT_COLUMNS.contains(&column) => q.bind(s.clone()),
        other => q.bind(other.to_string()),
    }
}

#[async_trait]
impl ProjectBackend for SqliteBackend {
    async fn select_all(&self) -> AppResult<Vec<ProjectRow>> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY updated_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn insert(&self, row: ProjectRow) -> AppResult<()> {
        let map = match serde_json::to_value(&row)? {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::new(
                    "JSON/DATA",
                    "project row must serialize to an object",
                ))
            }
        };
        let cols: Vec<String> = map.keys().cloned().collect();
        let placeholders: Vec<String> = cols.iter().map(|_| "?".into()).collect();
        let sql = format!(
            "INSERT INTO projects ({}) VALUES ({})",
            cols.join(","),
            placeholders.join(",")
        );
        let mut query = sqlx::query(&sql);
        for col in &cols {
            let value = map.get(col).ok_or_else(|| {
                AppError::new("BACKEND/MISSING_FIELD", "Row missing value for column")
                    .with_context("column", col.clone())
            })?;
            query = bind_column(query, col, value);
        }
        query.execute(&self.pool).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: RowPatch) -> AppResult<()> {
        let map = patch.into_map()?;
        if map.is_empty() {
            return Ok(());
        }
        let cols: Vec<String> = map.keys().cloned().collect();
        let set_clause: Vec<String> = cols.iter().map(|c| format!("{c} = ?")).collect();
        let sql = format!("UPDATE projects SET {} WHERE id = ?", set_clause.join(", "));
        let mut query = sqlx::query(&sql);
        for col in &cols {
            let value = map.get(col).ok_or_else(|| {
                AppError::new("BACKEND/MISSING_FIELD", "Patch missing value for column")
                    .with_context("column", col.clone())
            })?;
            query = bind_column(query, col, value);
        }
        query = query.bind(id.to_string());
        query.execute(&self.pool).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBackend {
    rows: Mutex<Vec<Map<String, Value>>>,
}

impl MemoryBackend {
    fn row_id(map: &Map<String, Value>) -> &str {
        map.get("id").and_then(|v| v.as_str()).unwrap_or_default()
    }
}

#[async_trait]
impl ProjectBackend for MemoryBackend {
    async fn select_all(&self) -> AppResult<Vec<ProjectRow>> {
        let guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<ProjectRow> = guard
            .iter()
            .map(|map| {
                serde_json::from_value(Value::Object(map.clone())).map_err(AppError::from)
            })
            .collect::<AppResult<_>>()?;
        // RFC3339 timestamps sort lexicographically; id breaks same-instant
        // ties in favour of the later (time-ordered) identifier.
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert(&self, row: ProjectRow) -> AppResult<()> {
        let map = match serde_json::to_value(&row)? {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::new(
                    "JSON/DATA",
                    "project row must serialize to an object",
                ))
            }
        };
        let mut guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if guard.iter().any(|r| Self::row_id(r) == Self::row_id(&map)) {
            return Err(
                AppError::new("BACKEND/DUPLICATE_ID", "A project with this id already exists")
                    .with_context("id", Self::row_id(&map).to_string()),
            );
        }
        guard.push(map);
        Ok(())
    }

    async fn update(&self, id: &str, patch: RowPatch) -> AppResult<()> {
        let updates = patch.into_map()?;
        let mut guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(row) = guard.iter_mut().find(|r| Self::row_id(r) == id) {
            for (key, value) in updates {
                row.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut guard = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        guard.retain(|r| Self::row_id(r) != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct BackendHandle {
    inner: Arc<dyn ProjectBackend>,
}

impl BackendHandle {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(SqliteBackend::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(MemoryBackend::default()),
        }
    }

    /// Wrap any backend implementation, e.g. a fault-injecting test double.
    pub fn custom(backend: Arc<dyn ProjectBackend>) -> Self {
        Self { inner: backend }
    }

    pub async fn select_all(&self) -> AppResult<Vec<ProjectRow>> {
        self.inner.select_all().await
    }

    pub async fn insert(&self, row: ProjectRow) -> AppResult<()> {
        self.inner.insert(row).await
    }

    pub async fn update(&self, id: &str, patch: RowPatch) -> AppResult<()> {
        self.inner.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete(id).await
    }
}
