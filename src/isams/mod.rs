//! iSAMS datasets: the registry, its schemas and the extractors that read it

mod datasets;
mod divisions;
mod endpoint;
pub mod schemas;

pub use datasets::{DatasetDescriptor, DatasetId, PageMode, REGISTRY, filter, select};
pub use divisions::{DIVISIONS, YEAR_GROUP_IDS, divisions_path, run_divisions};
pub use endpoint::{EndpointExtractor, into_records, read_totals};
