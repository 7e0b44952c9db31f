//! Schema-aware row encoding for load jobs
//!
//! Transformed records carry datetimes as RFC 3339 strings with the target
//! offset. DATETIME and DATE columns have no zone, so those values are written
//! as wall-clock time and calendar date in that offset. Everything else passes
//! through unchanged, including columns the schema doesn't name; the load job
//! is configured to ignore those.

use super::schema::{FieldType, SchemaField, field};
use crate::error::{Error, Result};
use crate::etl::Record;
use chrono::DateTime;
use serde_json::Value;

/// Serialize records as newline-delimited JSON
pub fn encode_rows(records: &[Record], schema: Option<&[SchemaField]>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        let row = match schema {
            Some(schema) => Value::Object(encode_record(record, schema)),
            None => Value::Object(record.clone()),
        };
        serde_json::to_writer(&mut out, &row)
            .map_err(|e| Error::invalid_input(format!("row cannot be serialized: {e}")))?;
        out.push(b'\n');
    }
    Ok(out)
}

fn encode_record(record: &Record, schema: &[SchemaField]) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let encoded = match field(schema, key) {
                Some(f) => encode_value(value, f),
                None => value.clone(),
            };
            (key.clone(), encoded)
        })
        .collect()
}

fn encode_value(value: &Value, field: &SchemaField) -> Value {
    match value {
        Value::Array(items) if field.is_repeated() => {
            Value::Array(items.iter().map(|v| encode_scalar(v, field)).collect())
        }
        other => encode_scalar(other, field),
    }
}

fn encode_scalar(value: &Value, field: &SchemaField) -> Value {
    match (field.field_type, value) {
        (FieldType::Datetime, Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Value::String(dt.naive_local().format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Err(_) => value.clone(),
        },
        (FieldType::Date, Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Value::String(dt.date_naive().format("%Y-%m-%d").to_string()),
            Err(_) => value.clone(),
        },
        (FieldType::Record, Value::Object(map)) => Value::Object(encode_record(map, field.fields)),
        _ => value.clone(),
    }
}
