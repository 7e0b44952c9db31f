//! Warehouse (BigQuery) destination
//!
//! Table identifiers, static schemas, row encoding, write modes and the load
//! job client. [`WarehouseLoader`] plugs a table into an ETL pipeline.

mod bigquery;
mod encode;
mod loader;
pub mod schema;
mod table;
mod write_mode;

pub use bigquery::{BigQuery, Job, JobError, JobReference, JobStatus, SourceFormat};
pub use encode::encode_rows;
pub use loader::WarehouseLoader;
pub use schema::{FieldMode, FieldType, SchemaField};
pub use table::{DatasetRef, TableId};
pub use write_mode::{TruncateOnce, WriteMode};
