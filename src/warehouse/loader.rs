//! Loader writing record batches into one warehouse table

use super::{BigQuery, SchemaField, TableId, WriteMode};
use crate::etl::{Loader, Record};
use eyre::Result;

/// Loads every batch it receives into `table`
///
/// With a schema the column types are fixed; without one the warehouse
/// autodetects them. An empty TRUNCATE batch still runs so the table ends up
/// empty.
pub struct WarehouseLoader<'a> {
    warehouse: &'a BigQuery,
    table: TableId,
    schema: Option<&'static [SchemaField]>,
}

impl<'a> WarehouseLoader<'a> {
    pub fn new(
        warehouse: &'a BigQuery,
        table: TableId,
        schema: Option<&'static [SchemaField]>,
    ) -> Self {
        Self {
            warehouse,
            table,
            schema,
        }
    }

    pub fn table(&self) -> &TableId {
        &self.table
    }
}

impl Loader for WarehouseLoader<'_> {
    type Item = Record;

    async fn load(&self, items: Vec<Record>, mode: WriteMode) -> Result<usize> {
        if items.is_empty() && mode == WriteMode::Append {
            log::debug!("Nothing to append to {}", self.table);
            return Ok(0);
        }
        self.warehouse
            .load_records(&self.table, &items, mode, self.schema)
            .await?;
        log::debug!("Wrote {} row(s) to {} ({})", items.len(), self.table, mode);
        Ok(items.len())
    }
}
