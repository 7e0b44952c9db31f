//! Google Cloud REST client
//!
//! A thin bearer-authenticated wrapper shared by the warehouse, bucket, drive
//! and secret-manager collaborators. Each API has its own base URL so tests can
//! point all of them at a single mock server.

use super::Auth;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// Base URLs of the Google APIs in use
#[derive(Clone, Debug)]
pub struct GoogleEndpoints {
    pub bigquery: Url,
    pub storage: Url,
    pub drive: Url,
    pub secret_manager: Url,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        let parse = |s: &str| Url::parse(s).expect("static Google API URL");
        Self {
            bigquery: parse("https://bigquery.googleapis.com/"),
            storage: parse("https://storage.googleapis.com/"),
            drive: parse("https://www.googleapis.com/"),
            secret_manager: parse("https://secretmanager.googleapis.com/"),
        }
    }
}

impl GoogleEndpoints {
    /// Route every API to the same base URL
    pub fn all(url: Url) -> Self {
        Self {
            bigquery: url.clone(),
            storage: url.clone(),
            drive: url.clone(),
            secret_manager: url,
        }
    }
}

/// Build `base/seg1/seg2/...`, percent-encoding each segment
pub fn api_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::invalid_input(format!("'{base}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Clone, Debug)]
pub struct GoogleClient {
    client: Client,
    endpoints: GoogleEndpoints,
}

impl GoogleClient {
    pub fn try_new(auth: Auth, endpoints: GoogleEndpoints) -> eyre::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Auth::Bearer(token) = auth {
            let mut value: reqwest::header::HeaderValue =
                format!("Bearer {}", token.secret()).parse()?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, endpoints })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &GoogleEndpoints {
        &self.endpoints
    }

    /// Send a request and fail on any non-success status
    pub async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::request(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Send a request and decode a JSON response body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T> {
        self.send(request, resource)
            .await?
            .json()
            .await
            .map_err(|e| Error::invalid_response(resource, e.to_string()))
    }

    /// Start a resumable upload session and return its session URI
    ///
    /// Used by BigQuery load jobs and Drive file creation: the metadata is
    /// POSTed first and the content is PUT to the URI in the `Location` header.
    pub async fn start_resumable(
        &self,
        url: Url,
        metadata: &serde_json::Value,
        resource: &str,
    ) -> Result<Url> {
        let response = self
            .send(self.client.post(url).json(metadata), resource)
            .await?;
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::MissingKey {
                resource: resource.to_string(),
                key: "Location".to_string(),
            })?;
        Url::parse(location)
            .map_err(|e| Error::invalid_response(resource, format!("bad session URI: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_encodes_segments() {
        let base = Url::parse("https://storage.googleapis.com/").unwrap();
        let url = api_url(&base, &["storage", "v1", "b", "bucket", "o", "exports/a b.csv"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/bucket/o/exports%2Fa%20b.csv"
        );
    }

    #[test]
    fn test_api_url_without_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:9000").unwrap();
        let url = api_url(&base, &["v1", "projects", "p", "secrets", "s", "versions", "latest:access"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/v1/projects/p/secrets/s/versions/latest:access"
        );
    }

    #[test]
    fn test_endpoints_all() {
        let url = Url::parse("http://localhost:1234").unwrap();
        let endpoints = GoogleEndpoints::all(url.clone());
        assert_eq!(endpoints.bigquery, url);
        assert_eq!(endpoints.drive, url);
    }
}
