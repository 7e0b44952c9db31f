//! Warehouse table identifiers

use crate::error::Error;
use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::LazyLock;

static TABLE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<project>[A-Za-z0-9.:-]+)\.(?P<dataset>\w+)\.(?P<table>[\w$-]+)$")
        .expect("valid table id pattern")
});

static DATASET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<project>[A-Za-z0-9.:-]+)\.(?P<dataset>\w+)$").expect("valid dataset pattern")
});

/// A fully qualified `project.dataset.table` identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableId {
    #[serde(rename = "projectId")]
    pub project: String,
    #[serde(rename = "datasetId")]
    pub dataset: String,
    #[serde(rename = "tableId")]
    pub table: String,
}

impl FromStr for TableId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TABLE_ID.captures(s.trim()).ok_or_else(|| {
            Error::invalid_input(format!(
                "invalid table id '{s}', expected 'project.dataset.table'"
            ))
        })?;
        Ok(Self {
            project: caps["project"].to_string(),
            dataset: caps["dataset"].to_string(),
            table: caps["table"].to_string(),
        })
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// A `project.dataset` destination that dataset tables are created under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub project: String,
    pub dataset: String,
}

impl DatasetRef {
    pub fn table(&self, name: &str) -> TableId {
        TableId {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            table: name.to_string(),
        }
    }
}

impl FromStr for DatasetRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = DATASET_REF.captures(s.trim()).ok_or_else(|| {
            Error::invalid_input(format!("invalid dataset '{s}', expected 'project.dataset'"))
        })?;
        Ok(Self {
            project: caps["project"].to_string(),
            dataset: caps["dataset"].to_string(),
        })
    }
}

impl std::fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_id() {
        let id: TableId = "school-data.isams_data.students".parse().unwrap();
        assert_eq!(id.project, "school-data");
        assert_eq!(id.dataset, "isams_data");
        assert_eq!(id.table, "students");
        assert_eq!(id.to_string(), "school-data.isams_data.students");
    }

    #[test]
    fn test_parse_domain_scoped_project() {
        let id: TableId = "example.com:analytics.isams_data.terms".parse().unwrap();
        assert_eq!(id.project, "example.com:analytics");
        assert_eq!(id.dataset, "isams_data");
    }

    #[test]
    fn test_parse_invalid_table_id() {
        assert!("students".parse::<TableId>().is_err());
        assert!("a.b".parse::<TableId>().is_err());
        assert!("a.b c.d".parse::<TableId>().is_err());
    }

    #[test]
    fn test_dataset_ref_table() {
        let dest: DatasetRef = "school-data.isams_data".parse().unwrap();
        assert_eq!(
            dest.table("alumni").to_string(),
            "school-data.isams_data.alumni"
        );
        assert!("school-data".parse::<DatasetRef>().is_err());
    }

    #[test]
    fn test_table_id_serializes_as_reference() {
        let id: TableId = "p.d.t".parse().unwrap();
        let value = serde_json::to_value(&id).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"projectId": "p", "datasetId": "d", "tableId": "t"})
        );
    }
}
