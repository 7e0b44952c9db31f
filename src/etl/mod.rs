//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Sources are read page by page through an [`Extractor`], each page is
//! reshaped by a [`Transformer`] and handed to a [`Loader`]. The
//! [`Pipeline`] drives the three and decides the write mode of every load.

mod cursor;
mod extract;
mod load;
mod pipeline;
mod transform;

pub use cursor::{PageCursor, PageRequest, Pagination, Progress, Totals};
pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{Pipeline, RunOutcome};
pub use transform::{Then, Transformer};

/// One row as returned by the API: a JSON object keyed by field name
pub type Record = serde_json::Map<String, serde_json::Value>;
