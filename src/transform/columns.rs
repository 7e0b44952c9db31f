//! Per-dataset column transforms

use super::datetime::to_target;
use crate::etl::{Record, Transformer};
use eyre::Result;
use serde_json::Value;

/// Re-expresses datetime columns in the target timezone and nulls others
///
/// Columns missing from a record are left missing, except nulled columns
/// which are always written.
///
/// # Example
/// ```
/// use isams_etl::etl::Transformer;
/// use isams_etl::transform::ColumnTransform;
/// use serde_json::json;
///
/// let transform = ColumnTransform::datetimes(&["startDate"]).with_nulled(&["endDate"]);
/// let record = json!({"startDate": "2024-01-01T00:00:00Z", "endDate": "2024-02-01"});
/// let output = transform.transform(record.as_object().unwrap().clone()).unwrap();
/// assert_eq!(output["startDate"], "2024-01-01T08:00:00+08:00");
/// assert!(output["endDate"].is_null());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColumnTransform {
    datetimes: &'static [&'static str],
    nulled: &'static [&'static str],
}

impl ColumnTransform {
    /// Leaves every record untouched
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn datetimes(columns: &'static [&'static str]) -> Self {
        Self {
            datetimes: columns,
            nulled: &[],
        }
    }

    pub fn with_nulled(mut self, columns: &'static [&'static str]) -> Self {
        self.nulled = columns;
        self
    }

    pub fn datetime_columns(&self) -> &[&'static str] {
        self.datetimes
    }

    pub fn nulled_columns(&self) -> &[&'static str] {
        self.nulled
    }

    pub fn is_passthrough(&self) -> bool {
        self.datetimes.is_empty() && self.nulled.is_empty()
    }
}

impl Transformer for ColumnTransform {
    type Input = Record;
    type Output = Record;

    fn transform(&self, mut input: Record) -> Result<Record> {
        for column in self.datetimes {
            if let Some(value) = input.get_mut(*column) {
                *value = to_target(value);
            }
        }
        for column in self.nulled {
            input.insert(column.to_string(), Value::Null);
        }
        Ok(input)
    }
}

/// Sets one column to a fixed value on every record
pub struct AddColumn {
    name: String,
    value: Value,
}

impl AddColumn {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Transformer for AddColumn {
    type Input = Record;
    type Output = Record;

    fn transform(&self, mut input: Record) -> Result<Record> {
        input.insert(self.name.clone(), self.value.clone());
        Ok(input)
    }
}
