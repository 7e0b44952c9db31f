//! File companion paths: bucket and drive uploads
//!
//! Local files and in-memory buffers are pushed to a Cloud Storage bucket
//! or a Google Drive folder. Loading a bucket file into the warehouse lives
//! in [`crate::warehouse::BigQuery::load_from_bucket`].

mod bucket;
mod drive;
mod formats;

pub use bucket::{Bucket, UploadMode, UploadOutcome, object_name};
pub use drive::{Drive, DriveFile, DriveTarget, DriveUpload, FOLDER_MIME_TYPE, quote};
pub use formats::FileType;
