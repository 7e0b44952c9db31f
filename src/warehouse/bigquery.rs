//! BigQuery load jobs over the REST v2 API
//!
//! Record batches are uploaded through a resumable upload session: the job
//! configuration is POSTed, the newline-delimited JSON body is PUT to the
//! returned session URI, and the job is polled until it is DONE. Bucket files
//! are loaded with a plain `jobs.insert` referencing a `gs://` URI.

use super::encode::encode_rows;
use super::schema::{self, SchemaField};
use super::table::TableId;
use super::write_mode::WriteMode;
use crate::client::GoogleClient;
use crate::client::google::api_url;
use crate::error::{Error, Result};
use crate::etl::Record;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::time::Duration;

/// Source format of a file already sitting in a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv { skip_leading_rows: u32 },
    NewlineDelimitedJson,
}

impl SourceFormat {
    fn name(&self) -> &'static str {
        match self {
            Self::Csv { .. } => "CSV",
            Self::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv {
                skip_leading_rows: 1,
            }),
            "json" | "ndjson" => Ok(Self::NewlineDelimitedJson),
            "xlsx" | "excel" => Err(Error::invalid_input(
                "Excel files cannot be loaded by the warehouse; export them as CSV first",
            )),
            _ => Err(Error::invalid_input(format!(
                "unsupported source format '{s}'. Supported: csv, json"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub error_result: Option<JobError>,
    #[serde(default)]
    pub errors: Vec<JobError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", reason, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_reference: JobReference,
    #[serde(default)]
    pub status: JobStatus,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.status.state == "DONE"
    }
}

/// BigQuery client scoped to the project that runs the load jobs
#[derive(Clone, Debug)]
pub struct BigQuery {
    google: GoogleClient,
    project: String,
    location: Option<String>,
    poll_interval: Duration,
}

impl BigQuery {
    pub fn new(google: GoogleClient, project: impl Into<String>) -> Self {
        Self {
            google,
            project: project.into(),
            location: None,
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Run jobs in a specific location (e.g. `asia-southeast1`)
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Set the delay between job status polls (default: 1s)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Load a batch of records into `table` and wait for the job to finish
    ///
    /// Without a schema the column types are autodetected. With one, values
    /// for columns the schema doesn't name are ignored by the load.
    pub async fn load_records(
        &self,
        table: &TableId,
        records: &[Record],
        mode: WriteMode,
        schema: Option<&[SchemaField]>,
    ) -> Result<Job> {
        let resource = table.to_string();
        let data = encode_rows(records, schema)?;
        let body = self.job_body(load_config(table, mode, schema, "NEWLINE_DELIMITED_JSON"));

        log::debug!(
            "Loading {} row(s) into {} ({})",
            records.len(),
            resource,
            mode
        );

        let mut url = api_url(
            &self.google.endpoints().bigquery,
            &["upload", "bigquery", "v2", "projects", self.project.as_str(), "jobs"],
        )?;
        url.query_pairs_mut().append_pair("uploadType", "resumable");

        let session = self.google.start_resumable(url, &body, &resource).await?;
        let job: Job = self
            .google
            .send_json(
                self.google
                    .http()
                    .put(session)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(data),
                &resource,
            )
            .await?;

        self.wait_for(job, table).await
    }

    /// Load a file already in a bucket (`bucket/path/to/file.csv`) into `table`
    pub async fn load_from_bucket(
        &self,
        bucket_path: &str,
        table: &TableId,
        mode: WriteMode,
        format: SourceFormat,
        schema: Option<&[SchemaField]>,
    ) -> Result<Job> {
        if bucket_path.starts_with("gs://") {
            return Err(Error::invalid_input(
                "Do not include 'gs://' in the bucket file path",
            ));
        }
        let uri = format!("gs://{}", bucket_path);

        let mut config = load_config(table, mode, schema, format.name());
        config["sourceUris"] = json!([uri]);
        if let SourceFormat::Csv { skip_leading_rows } = format {
            config["skipLeadingRows"] = json!(skip_leading_rows);
        }
        let body = self.job_body(config);

        let url = api_url(
            &self.google.endpoints().bigquery,
            &["bigquery", "v2", "projects", self.project.as_str(), "jobs"],
        )?;
        let resource = table.to_string();
        let job: Job = self
            .google
            .send_json(self.google.http().post(url).json(&body), &resource)
            .await
            .inspect_err(|e| log::error!("Failed to load {} to {}: {}", uri, resource, e))?;

        let job = self.wait_for(job, table).await?;
        log::info!("Loaded {} to {}", uri, resource);
        Ok(job)
    }

    /// Poll a job until it is DONE; a populated `errorResult` fails the load
    pub async fn wait_for(&self, mut job: Job, table: &TableId) -> Result<Job> {
        while !job.is_done() {
            tokio::time::sleep(self.poll_interval).await;
            job = self.get_job(&job.job_reference).await?;
        }

        if let Some(error) = &job.status.error_result {
            let mut message = error.to_string();
            for extra in job.status.errors.iter().filter(|e| e.message != error.message) {
                message.push_str(&format!("; {}", extra));
            }
            return Err(Error::LoadJob {
                table: table.to_string(),
                message,
            });
        }

        log::debug!("Job {} done", job.job_reference.job_id);
        Ok(job)
    }

    async fn get_job(&self, reference: &JobReference) -> Result<Job> {
        let mut url = api_url(
            &self.google.endpoints().bigquery,
            &[
                "bigquery",
                "v2",
                "projects",
                reference.project_id.as_str(),
                "jobs",
                reference.job_id.as_str(),
            ],
        )?;
        if let Some(location) = &reference.location {
            url.query_pairs_mut().append_pair("location", location);
        }
        let resource = format!("job {}", reference.job_id);
        self.google
            .send_json(self.google.http().get(url), &resource)
            .await
    }

    fn job_body(&self, load: Value) -> Value {
        let mut reference = json!({ "projectId": self.project });
        if let Some(location) = &self.location {
            reference["location"] = json!(location);
        }
        json!({
            "jobReference": reference,
            "configuration": { "load": load },
        })
    }
}

fn load_config(
    table: &TableId,
    mode: WriteMode,
    schema: Option<&[SchemaField]>,
    source_format: &str,
) -> Value {
    let mut config = json!({
        "destinationTable": table,
        "sourceFormat": source_format,
        "writeDisposition": mode.disposition(),
        "autodetect": schema.is_none(),
    });
    if let Some(fields) = schema {
        config["schema"] = schema::to_json(fields);
        // columns added upstream after the schema was written are dropped
        config["ignoreUnknownValues"] = json!(true);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::schema::{FieldType, nullable};

    const SCHEMA: &[SchemaField] = &[nullable("id", FieldType::Integer)];

    #[test]
    fn test_load_config_with_schema() {
        let table: TableId = "p.d.t".parse().unwrap();
        let config = load_config(&table, WriteMode::Truncate, Some(SCHEMA), "NEWLINE_DELIMITED_JSON");
        assert_eq!(config["writeDisposition"], "WRITE_TRUNCATE");
        assert_eq!(config["autodetect"], false);
        assert_eq!(config["schema"]["fields"][0]["name"], "id");
        assert_eq!(config["destinationTable"]["tableId"], "t");
        assert_eq!(config["ignoreUnknownValues"], true);
    }

    #[test]
    fn test_load_config_autodetect() {
        let table: TableId = "p.d.t".parse().unwrap();
        let config = load_config(&table, WriteMode::Append, None, "CSV");
        assert_eq!(config["writeDisposition"], "WRITE_APPEND");
        assert_eq!(config["autodetect"], true);
        assert!(config.get("schema").is_none());
        assert!(config.get("ignoreUnknownValues").is_none());
    }

    #[test]
    fn test_source_format_parse() {
        assert_eq!(
            "csv".parse::<SourceFormat>().unwrap(),
            SourceFormat::Csv {
                skip_leading_rows: 1
            }
        );
        assert_eq!(
            "ndjson".parse::<SourceFormat>().unwrap(),
            SourceFormat::NewlineDelimitedJson
        );
        assert!("xlsx".parse::<SourceFormat>().is_err());
        assert!("parquet".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn test_job_status_parse() {
        let job: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "p", "jobId": "job_1", "location": "US"},
            "status": {
                "state": "DONE",
                "errorResult": {"reason": "invalid", "message": "bad row"}
            }
        }))
        .unwrap();
        assert!(job.is_done());
        assert_eq!(
            job.status.error_result.unwrap().to_string(),
            "invalid: bad row"
        );
    }

    #[test]
    fn test_job_without_status_is_pending() {
        let job: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "p", "jobId": "job_1"}
        }))
        .unwrap();
        assert!(!job.is_done());
    }
}
