//! Data and synchronization layer of a factory-operations portal for
//! garment styles.
//!
//! A "project" is one style under production: tech-pack pages and files,
//! QC inspections with measurement grids, invoices, packing, PP meetings,
//! material control, order sheet, and consumption. Each project persists
//! as a single row; nested records are embedded JSON. Mutations flow
//! through `commands`, which applies them to the in-memory aggregate
//! optimistically and pushes a partial row patch to the backend.

pub mod aql;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod factory;
pub mod id;
pub mod logging;
pub mod model;
pub mod projects;
pub mod repo;
pub mod row;
pub mod selection;
pub mod state;
pub mod storage;
pub mod time;

pub use error::{AppError, AppResult};
pub use state::AppState;
