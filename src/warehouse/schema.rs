//! Warehouse table schemas
//!
//! Schemas are static tables declared with the `const fn` helpers below and
//! serialize to the BigQuery `TableFieldSchema` JSON shape.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Timestamp,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
    #[serde(skip_serializing_if = "no_fields")]
    pub fields: &'static [SchemaField],
}

fn no_fields(fields: &&'static [SchemaField]) -> bool {
    fields.is_empty()
}

impl SchemaField {
    pub fn is_repeated(&self) -> bool {
        self.mode == FieldMode::Repeated
    }
}

pub const fn nullable(name: &'static str, field_type: FieldType) -> SchemaField {
    SchemaField {
        name,
        field_type,
        mode: FieldMode::Nullable,
        fields: &[],
    }
}

pub const fn required(name: &'static str, field_type: FieldType) -> SchemaField {
    SchemaField {
        name,
        field_type,
        mode: FieldMode::Required,
        fields: &[],
    }
}

pub const fn repeated(name: &'static str, field_type: FieldType) -> SchemaField {
    SchemaField {
        name,
        field_type,
        mode: FieldMode::Repeated,
        fields: &[],
    }
}

pub const fn record(
    name: &'static str,
    mode: FieldMode,
    fields: &'static [SchemaField],
) -> SchemaField {
    SchemaField {
        name,
        field_type: FieldType::Record,
        mode,
        fields,
    }
}

/// Look up a top-level field by name
pub fn field<'a>(schema: &'a [SchemaField], name: &str) -> Option<&'a SchemaField> {
    schema.iter().find(|f| f.name == name)
}

/// The `{"fields": [...]}` object used in load job configurations
pub fn to_json(schema: &[SchemaField]) -> serde_json::Value {
    serde_json::json!({ "fields": schema })
}
