//! Secret Manager collaborator
//!
//! Resolves a named credential bundle stored as a JSON object in the latest
//! version of a secret.

use super::google::{GoogleClient, api_url};
use crate::error::{Error, Result};
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct AccessResponse {
    payload: Option<Payload>,
}

#[derive(Deserialize)]
struct Payload {
    data: String,
}

pub struct SecretManager {
    google: GoogleClient,
    project: String,
}

impl SecretManager {
    pub fn new(google: GoogleClient, project: impl Into<String>) -> Self {
        Self {
            google,
            project: project.into(),
        }
    }

    /// Fetch the latest version of `secret_id` as a key/value map
    pub async fn access(&self, secret_id: &str) -> Result<HashMap<String, String>> {
        let url = api_url(
            &self.google.endpoints().secret_manager,
            &[
                "v1",
                "projects",
                self.project.as_str(),
                "secrets",
                secret_id,
                "versions",
                "latest:access",
            ],
        )?;
        let resource = format!("projects/{}/secrets/{}", self.project, secret_id);
        log::debug!("Accessing secret {}", resource);

        let response: AccessResponse = self
            .google
            .send_json(self.google.http().get(url), &resource)
            .await?;

        let data = response.payload.ok_or_else(|| Error::MissingKey {
            resource: resource.clone(),
            key: "payload".to_string(),
        })?;

        decode_payload(&data.data, &resource)
    }
}

/// Decode a base64 secret payload holding a JSON object of strings
pub fn decode_payload(data: &str, resource: &str) -> Result<HashMap<String, String>> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::invalid_response(resource, format!("payload is not base64: {e}")))?;
    let values: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes)
        .map_err(|e| Error::invalid_response(resource, format!("payload is not a JSON object: {e}")))?;

    Ok(values
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload() {
        let raw = r#"{"CLIENT_ID":"etl","CLIENT_SECRET":"s","PORT":443}"#;
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
        let values = decode_payload(&encoded, "projects/p/secrets/s").unwrap();
        assert_eq!(values["CLIENT_ID"], "etl");
        assert_eq!(values["PORT"], "443");
    }

    #[test]
    fn test_decode_payload_rejects_garbage() {
        assert!(decode_payload("!!!", "projects/p/secrets/s").is_err());
        let encoded = base64::engine::general_purpose::STANDARD.encode("[1,2]");
        assert!(decode_payload(&encoded, "projects/p/secrets/s").is_err());
    }
}
