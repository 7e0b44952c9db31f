//! iSAMS client module
//!
//! Provides `IsamsClient` for authenticated GET requests against the iSAMS
//! REST API. The bearer token is installed as a default header once and reused
//! for every request.

use super::Auth;
use crate::error::{Error, NOT_AUTHORISED_MESSAGE, Result};
use crate::etl::PageRequest;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// iSAMS client for making API requests.
///
/// # Example
/// ```no_run
/// use isams_etl::client::{AccessToken, Auth, IsamsClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://school.isams.cloud")?;
/// let client = IsamsClient::try_new(url, Auth::Bearer(AccessToken::new("token")))?;
/// let body = client.get_json("/api/school/terms", None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct IsamsClient {
    client: Client,
    url: Url,
}

impl IsamsClient {
    /// Create a new client for the API rooted at `url`
    ///
    /// # Errors
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn try_new(url: Url, auth: Auth) -> eyre::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "application/json".parse()?,
        );
        if let Auth::Bearer(token) = auth {
            let mut value: reqwest::header::HeaderValue =
                format!("Bearer {}", token.secret()).parse()?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve a resource path against the base URL.
    ///
    /// Leading slashes on `path` are ignored so `/api/students` and
    /// `api/students` resolve to the same URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let full = format!("{}/{}", base, path);
        Url::parse(&full)
            .map_err(|e| Error::invalid_input(format!("invalid resource path '{full}': {e}")))
    }

    /// GET a resource and decode the JSON body.
    ///
    /// The body is decoded regardless of the status code so callers can
    /// inspect error payloads such as the authorization-denial message.
    pub async fn get_json(&self, path: &str, page: Option<PageRequest>) -> Result<Value> {
        let url = self.endpoint(path)?;
        let resource = url.to_string();

        let mut request = self.client.get(url);
        if let Some(page) = page {
            log::trace!("GET {} page={} pageSize={}", resource, page.page, page.page_size);
            request = request.query(&page.query());
        } else {
            log::trace!("GET {}", resource);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Failed to reach '{}'", resource);
            Error::request(&resource, e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::request(&resource, e))?;

        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::invalid_response(&resource, format!("body is not JSON: {e}"))
            } else {
                Error::Status {
                    resource: resource.clone(),
                    status: status.as_u16(),
                    body,
                }
            }
        })
    }

    /// GET a resource and pull the records under `key` out of the body.
    ///
    /// A missing key is diagnosed: if the body carries the authorization-denial
    /// message the error is [`Error::PermissionDenied`], otherwise
    /// [`Error::MissingKey`].
    pub async fn get_records(
        &self,
        path: &str,
        key: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<Value>> {
        let body = self.get_json(path, page).await?;
        let resource = self.endpoint(path)?.to_string();
        take_records(body, key, &resource)
    }
}

/// Extract the array stored under `key` in an API response body
pub fn take_records(mut body: Value, key: &str, resource: &str) -> Result<Vec<Value>> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(Error::invalid_response(
            resource,
            format!("'{key}' is not a list (found {})", json_type(&other)),
        )),
        None => {
            log::error!("Error reading from '{}'. Diagnosing...", resource);
            match body.get("message").and_then(Value::as_str) {
                Some(message) if is_not_authorised(message) => {
                    log::error!("Insufficient permission for '{}'", resource);
                    Err(Error::PermissionDenied {
                        resource: resource.to_string(),
                        message: message.to_string(),
                    })
                }
                _ => Err(Error::MissingKey {
                    resource: resource.to_string(),
                    key: key.to_string(),
                }),
            }
        }
    }
}

fn is_not_authorised(message: &str) -> bool {
    !message.is_empty() && NOT_AUTHORISED_MESSAGE.contains(message.trim())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
