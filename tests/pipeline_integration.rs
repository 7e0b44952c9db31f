//! Integration tests for dataset pipelines
//!
//! A single mock server plays both the school API and the warehouse so a run
//! can be followed from the probe request to the load job dispositions.

use eyre::Result;
use isams_etl::client::{AccessToken, Auth, GoogleClient, GoogleEndpoints, IsamsClient};
use isams_etl::etl::{Pipeline, RunOutcome};
use isams_etl::isams::{DatasetId, EndpointExtractor, YEAR_GROUP_IDS, run_divisions};
use isams_etl::transform::for_dataset;
use isams_etl::warehouse::{BigQuery, TableId, WarehouseLoader};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn isams(server: &MockServer) -> IsamsClient {
    IsamsClient::try_new(
        Url::parse(&server.uri()).unwrap(),
        Auth::Bearer(AccessToken::new("isams-token")),
    )
    .unwrap()
}

fn warehouse(server: &MockServer) -> BigQuery {
    let google = GoogleClient::try_new(
        Auth::Bearer(AccessToken::new("google-token")),
        GoogleEndpoints::all(Url::parse(&server.uri()).unwrap()),
    )
    .unwrap();
    BigQuery::new(google, "proj").with_poll_interval(Duration::from_millis(5))
}

/// Accept resumable load jobs and finish them immediately
async fn mount_load_jobs(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/bigquery/v2/projects/proj/jobs"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/upload-session", server.uri()).as_str()),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": {"projectId": "proj", "jobId": "job_1"},
            "status": {"state": "DONE"}
        })))
        .mount(server)
        .await;
}

async fn requests(server: &MockServer, verb: &str, url_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == url_path)
        .collect()
}

/// Write dispositions of every load job, in submission order
async fn dispositions(server: &MockServer) -> Vec<String> {
    requests(server, "POST", "/upload/bigquery/v2/projects/proj/jobs")
        .await
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["configuration"]["load"]["writeDisposition"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect()
}

/// Rows of every uploaded batch, in upload order
async fn uploaded_rows(server: &MockServer) -> Vec<Vec<Value>> {
    requests(server, "PUT", "/upload-session")
        .await
        .iter()
        .map(|r| {
            String::from_utf8(r.body.clone())
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        })
        .collect()
}

fn students(from: u64, count: u64) -> Vec<Value> {
    (from..from + count)
        .map(|id| json!({"id": id, "forename": format!("Student {id}")}))
        .collect()
}

async fn mount_students_page(server: &MockServer, page: u64, count: u64) {
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("page", page.to_string().as_str()))
        .and(query_param("pageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "students": students((page - 1) * 1000, count),
            "totalCount": 2500,
            "totalPages": 3
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_paged_dataset_truncates_then_appends() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "students": students(0, 1),
            "totalCount": 2500,
            "totalPages": 2500
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_students_page(&server, 1, 1000).await;
    mount_students_page(&server, 2, 1000).await;
    mount_students_page(&server, 3, 500).await;
    mount_load_jobs(&server).await;

    let client = isams(&server);
    let warehouse = warehouse(&server);
    let descriptor = DatasetId::Students.descriptor();
    let table: TableId = "proj.isams.students".parse()?;
    let pipeline = Pipeline::new(
        descriptor.id.as_str(),
        EndpointExtractor::new(&client, descriptor, 1000),
        for_dataset(descriptor.id),
        WarehouseLoader::new(&warehouse, table, descriptor.schema),
    );

    let outcome = pipeline.run().await?;
    assert_eq!(outcome.rows(), 2500);
    assert!(matches!(outcome, RunOutcome::Loaded { pages: 3, .. }));

    assert_eq!(
        dispositions(&server).await,
        vec!["WRITE_TRUNCATE", "WRITE_APPEND", "WRITE_APPEND"]
    );
    let batches = uploaded_rows(&server).await;
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![1000, 1000, 500]);
    assert_eq!(batches[2][499]["id"], 2499);
    Ok(())
}

#[tokio::test]
async fn test_empty_dataset_skips_load() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alumni"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 0,
            "totalPages": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_load_jobs(&server).await;

    let client = isams(&server);
    let warehouse = warehouse(&server);
    let descriptor = DatasetId::Alumni.descriptor();
    let pipeline = Pipeline::new(
        descriptor.id.as_str(),
        EndpointExtractor::new(&client, descriptor, 1000),
        for_dataset(descriptor.id),
        WarehouseLoader::new(&warehouse, "proj.isams.alumni".parse()?, descriptor.schema),
    );

    let outcome = pipeline.run().await?;
    assert!(outcome.is_empty());
    assert!(dispositions(&server).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_single_page_dataset_converts_datetimes() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/school/terms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "terms": [{
                "id": 1,
                "name": "Term 1",
                "startDate": "2024-01-01T00:00:00Z",
                "finishDate": "2024-03-28T16:00:00Z",
                "termColour": "green"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_load_jobs(&server).await;

    let client = isams(&server);
    let warehouse = warehouse(&server);
    let descriptor = DatasetId::SchoolTerms.descriptor();
    let pipeline = Pipeline::new(
        descriptor.id.as_str(),
        EndpointExtractor::new(&client, descriptor, 1000),
        for_dataset(descriptor.id),
        WarehouseLoader::new(&warehouse, "proj.isams.school_terms".parse()?, descriptor.schema),
    );

    let outcome = pipeline.run().await?;
    assert_eq!(outcome.rows(), 1);
    assert_eq!(dispositions(&server).await, vec!["WRITE_TRUNCATE"]);

    let batches = uploaded_rows(&server).await;
    assert_eq!(batches[0][0]["name"], "Term 1");
    assert_eq!(batches[0][0]["startDate"], "2024-01-01T08:00:00");
    assert_eq!(batches[0][0]["finishDate"], "2024-03-29T00:00:00");

    // columns outside the schema are sent and left to the load job to ignore
    assert_eq!(batches[0][0]["termColour"], "green");
    let jobs = requests(&server, "POST", "/upload/bigquery/v2/projects/proj/jobs").await;
    let body: Value = serde_json::from_slice(&jobs[0].body)?;
    assert_eq!(body["configuration"]["load"]["ignoreUnknownValues"], true);
    Ok(())
}

#[tokio::test]
async fn test_failed_load_job_aborts_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/school/yeargroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "yearGroups": [{"id": 7, "name": "Year 7"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/bigquery/v2/projects/proj/jobs"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/upload-session", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": {"projectId": "proj", "jobId": "job_9"},
            "status": {"state": "RUNNING"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bigquery/v2/projects/proj/jobs/job_9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": {"projectId": "proj", "jobId": "job_9"},
            "status": {
                "state": "DONE",
                "errorResult": {"reason": "invalid", "message": "No such field: colour"}
            }
        })))
        .mount(&server)
        .await;

    let client = isams(&server);
    let warehouse = warehouse(&server);
    let descriptor = DatasetId::YearGroups.descriptor();
    let pipeline = Pipeline::new(
        descriptor.id.as_str(),
        EndpointExtractor::new(&client, descriptor, 1000),
        for_dataset(descriptor.id),
        WarehouseLoader::new(&warehouse, "proj.isams.year_groups".parse()?, descriptor.schema),
    );

    let err = pipeline.run().await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to load year_groups"));
    assert!(message.contains("No such field: colour"));
    Ok(())
}

#[tokio::test]
async fn test_divisions_tag_rows_with_year_group() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/school/yeargroups/-?\d+/divisions$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "divisions": [{"id": 1, "name": "Red"}, {"id": 2, "name": "Blue"}]
        })))
        .expect(17)
        .mount(&server)
        .await;
    mount_load_jobs(&server).await;

    let client = isams(&server);
    let warehouse = warehouse(&server);
    let loader = WarehouseLoader::new(&warehouse, "proj.isams.divisions".parse()?, None);

    let outcome = run_divisions(&client, YEAR_GROUP_IDS, &loader).await?;
    assert_eq!(outcome.rows(), 34);

    let modes = dispositions(&server).await;
    assert_eq!(modes.len(), 17);
    assert_eq!(modes[0], "WRITE_TRUNCATE");
    assert!(modes[1..].iter().all(|m| m == "WRITE_APPEND"));

    let batches = uploaded_rows(&server).await;
    assert_eq!(batches[0][0]["year_group_id"], -2);
    assert_eq!(batches[16][1]["year_group_id"], 14);
    assert_eq!(batches[16][1]["name"], "Blue");
    Ok(())
}
