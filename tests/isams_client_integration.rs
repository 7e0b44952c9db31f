//! Integration tests for the iSAMS client against a mock server
//!
//! Covers token acquisition, paged reads and the diagnosis of responses
//! that lack the expected records key.

use isams_etl::client::{AccessToken, Auth, Credentials, IsamsClient, request_access_token};
use isams_etl::error::{Error, ErrorKind};
use isams_etl::etl::{Extractor, PageRequest, Pagination, Totals};
use isams_etl::isams::{DatasetId, EndpointExtractor};
use serde_json::json;
use std::collections::HashMap;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> Credentials {
    let values: HashMap<String, String> = [
        ("CLIENT_ID", "etl-client".to_string()),
        ("CLIENT_SECRET", "s3cret".to_string()),
        ("TOKEN_URL", format!("{}/auth/connect/token", server.uri())),
        ("API_BASE_URL", server.uri()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    Credentials::from_map(&values).unwrap()
}

fn client(server: &MockServer) -> IsamsClient {
    IsamsClient::try_new(
        Url::parse(&server.uri()).unwrap(),
        Auth::Bearer(AccessToken::new("tok")),
    )
    .unwrap()
}

#[tokio::test]
async fn test_request_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/connect/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=etl-client"))
        .and(body_string_contains("client_secret=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = request_access_token(&reqwest::Client::new(), &credentials(&server))
        .await
        .unwrap();
    assert_eq!(token.secret(), "abc123");
}

#[tokio::test]
async fn test_token_response_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let err = request_access_token(&reqwest::Client::new(), &credentials(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingKey { ref key, .. } if key == "access_token"));
}

#[tokio::test]
async fn test_token_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let err = request_access_token(&reqwest::Client::new(), &credentials(&server))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_probe_reads_totals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "students": [{"id": 1}],
            "totalCount": 2500,
            "totalPages": 2500
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::Students.descriptor(), 1000);
    assert_eq!(extractor.pagination(), Pagination::Multi { page_size: 1000 });
    assert_eq!(extractor.probe().await.unwrap(), Totals::new(2500, 2500));
}

#[tokio::test]
async fn test_extract_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alumni"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alumni": [{"personId": 7, "surname": "Tan"}, {"personId": 8, "surname": "Lim"}],
            "totalCount": 52,
            "totalPages": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::Alumni.descriptor(), 50);
    let records = extractor
        .extract(Some(PageRequest::new(2, 50)))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["surname"], "Lim");
}

#[tokio::test]
async fn test_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/school/terms"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "The user is not authorised for this request"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::SchoolTerms.descriptor(), 1000);
    let err = extractor.extract(None).await.unwrap_err();
    let typed = err.downcast_ref::<Error>().unwrap();
    assert_eq!(typed.kind(), ErrorKind::Permission);
}

#[tokio::test]
async fn test_missing_key_is_response_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/school/yeargroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Service temporarily degraded"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::YearGroups.descriptor(), 1000);
    let err = extractor.extract(None).await.unwrap_err();
    let typed = err.downcast_ref::<Error>().unwrap();
    assert_eq!(typed.kind(), ErrorKind::ResponseShape);
    assert!(typed.to_string().contains("yearGroups"));
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/billing/invoicing/cycles"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .get_json("/api/billing/invoicing/cycles", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 502, .. }));
}

#[tokio::test]
async fn test_probe_without_records_key_reads_totals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 0,
            "totalPages": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::Students.descriptor(), 1000);
    let totals = extractor.probe().await.unwrap();
    assert_eq!(totals, Totals::new(0, 0));
    assert!(totals.is_empty());
}

#[tokio::test]
async fn test_probe_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admissions/applicants/students"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "The user is not authorised for this request"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let extractor = EndpointExtractor::new(&client, DatasetId::Applicants.descriptor(), 1000);
    let err = extractor.probe().await.unwrap_err();
    let typed = err.downcast_ref::<Error>().unwrap();
    assert_eq!(typed.kind(), ErrorKind::Permission);
}
