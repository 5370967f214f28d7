use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppResult;

/// One row per project; nested collections are embedded as JSON text.
/// `material_remarks` is plain text, everything else JSON-encoded.
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS projects (\
  id TEXT PRIMARY KEY,\
  title TEXT NOT NULL,\
  status TEXT NOT NULL,\
  po_numbers TEXT,\
  updated_at TEXT NOT NULL,\
  tech_pack_files TEXT,\
  pages TEXT,\
  comments TEXT,\
  inspections TEXT,\
  pp_meetings TEXT,\
  material_control TEXT,\
  invoices TEXT,\
  packing TEXT,\
  order_sheet TEXT,\
  consumption TEXT,\
  material_remarks TEXT,\
  material_attachments TEXT,\
  material_comments TEXT\
);\
CREATE INDEX IF NOT EXISTS idx_projects_updated_at ON projects (updated_at DESC);";

/// Open (and create if missing) the projects database and make sure the
/// schema exists.
pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    ensure_schema(&pool).await?;
    info!(target: "stitchdesk", event = "db_connected", url = %database_url);
    Ok(pool)
}

pub async fn ensure_schema(pool: &SqlitePool) -> AppResult<()> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
