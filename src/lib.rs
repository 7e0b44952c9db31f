//! iSAMS ETL
//!
//! Scheduled extract-load of iSAMS school-management datasets into BigQuery,
//! plus file uploads to Cloud Storage and Google Drive.

pub mod cli;
pub mod client;
pub mod error;
pub mod etl;
pub mod isams;
pub mod job_context;
pub mod settings;
pub mod storage;
pub mod transform;
pub mod warehouse;

// Re-exports for convenience
pub use client::{AccessToken, Auth, GoogleClient, IsamsClient};
pub use error::{Error, ErrorKind};
pub use etl::{Extractor, Loader, Pipeline, Record, RunOutcome, Transformer};
pub use job_context::JobContext;
pub use settings::Settings;
