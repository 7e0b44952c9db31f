//! Static registry of the datasets pulled from iSAMS

use super::schemas;
use crate::error::{Error, Result};
use crate::warehouse::SchemaField;
use std::str::FromStr;

/// Identifier of a registry dataset; also the destination table name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    Applicants,
    Students,
    Alumni,
    SchoolTerms,
    YearGroups,
    BillingCycles,
}

impl DatasetId {
    /// Every dataset in run order
    pub const ALL: [DatasetId; 6] = [
        Self::Applicants,
        Self::Students,
        Self::Alumni,
        Self::SchoolTerms,
        Self::YearGroups,
        Self::BillingCycles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applicants => "applicants",
            Self::Students => "students",
            Self::Alumni => "alumni",
            Self::SchoolTerms => "school_terms",
            Self::YearGroups => "year_groups",
            Self::BillingCycles => "billing_cycles",
        }
    }

    pub fn descriptor(&self) -> &'static DatasetDescriptor {
        &REGISTRY[*self as usize]
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(DatasetId::as_str).collect();
                Error::invalid_input(format!(
                    "unknown dataset '{s}'. Known datasets: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Whether an endpoint returns everything at once or page by page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Single,
    Multi,
}

/// Everything needed to move one dataset from the API to its table
#[derive(Debug)]
pub struct DatasetDescriptor {
    pub id: DatasetId,
    /// Resource path under the API base URL
    pub path: &'static str,
    /// Key holding the record list in the response body
    pub object: &'static str,
    pub pages: PageMode,
    pub schema: Option<&'static [SchemaField]>,
}

impl DatasetDescriptor {
    /// Destination table name inside the warehouse dataset
    pub fn table(&self) -> &'static str {
        self.id.as_str()
    }
}

/// Registry in run order; indexed by the `DatasetId` discriminant
pub static REGISTRY: [DatasetDescriptor; 6] = [
    DatasetDescriptor {
        id: DatasetId::Applicants,
        path: "/api/admissions/applicants/students",
        object: "students",
        pages: PageMode::Multi,
        schema: Some(schemas::APPLICANTS),
    },
    DatasetDescriptor {
        id: DatasetId::Students,
        path: "/api/students",
        object: "students",
        pages: PageMode::Multi,
        schema: Some(schemas::STUDENTS),
    },
    DatasetDescriptor {
        id: DatasetId::Alumni,
        path: "/api/alumni",
        object: "alumni",
        pages: PageMode::Multi,
        schema: Some(schemas::ALUMNI),
    },
    DatasetDescriptor {
        id: DatasetId::SchoolTerms,
        path: "/api/school/terms",
        object: "terms",
        pages: PageMode::Single,
        schema: Some(schemas::SCHOOL_TERMS),
    },
    DatasetDescriptor {
        id: DatasetId::YearGroups,
        path: "/api/school/yeargroups",
        object: "yearGroups",
        pages: PageMode::Single,
        schema: Some(schemas::YEAR_GROUPS),
    },
    DatasetDescriptor {
        id: DatasetId::BillingCycles,
        path: "/api/billing/invoicing/cycles",
        object: "billingCycles",
        pages: PageMode::Single,
        schema: Some(schemas::BILLING_CYCLES),
    },
];

/// Resolve dataset names to descriptors in registry order
///
/// No names selects every dataset. Unknown names fail before anything runs.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static DatasetDescriptor>> {
    let wanted = names
        .iter()
        .map(|n| n.as_ref().parse::<DatasetId>())
        .collect::<Result<Vec<_>>>()?;

    Ok(REGISTRY
        .iter()
        .filter(|d| wanted.is_empty() || wanted.contains(&d.id))
        .collect())
}

/// Narrow a selection with optional include and exclude name patterns
///
/// Include is applied first, then exclude.
pub fn filter(
    datasets: Vec<&'static DatasetDescriptor>,
    include: Option<&str>,
    exclude: Option<&str>,
) -> Result<Vec<&'static DatasetDescriptor>> {
    let mut datasets = datasets;

    if let Some(pattern) = include {
        let regex = regex::Regex::new(pattern).map_err(|e| {
            Error::invalid_input(format!("Invalid include regex pattern '{pattern}': {e}"))
        })?;
        datasets.retain(|d| regex.is_match(d.id.as_str()));
        log::debug!("After include filter '{}': {} dataset(s)", pattern, datasets.len());
    }

    if let Some(pattern) = exclude {
        let regex = regex::Regex::new(pattern).map_err(|e| {
            Error::invalid_input(format!("Invalid exclude regex pattern '{pattern}': {e}"))
        })?;
        datasets.retain(|d| !regex.is_match(d.id.as_str()));
        log::debug!("After exclude filter '{}': {} dataset(s)", pattern, datasets.len());
    }

    Ok(datasets)
}
