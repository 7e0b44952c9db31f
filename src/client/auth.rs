//! OAuth2 client-credentials authentication for the iSAMS API

use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// How outgoing requests authenticate
pub enum Auth {
    /// Send `Authorization: Bearer <token>`
    Bearer(AccessToken),
    /// Don't send an authorization header (local emulators)
    None,
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Opaque bearer token. Never printed.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

/// The credential bundle needed to talk to iSAMS
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: Url,
    pub api_base_url: Url,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .field("token_url", &self.token_url.as_str())
            .field("api_base_url", &self.api_base_url.as_str())
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a secret payload with `CLIENT_ID`, `CLIENT_SECRET`,
    /// `TOKEN_URL` and `API_BASE_URL` keys
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            values
                .get(key)
                .cloned()
                .ok_or_else(|| Error::invalid_input(format!("credential bundle is missing '{key}'")))
        };
        let parse = |key: &str| {
            let raw = get(key)?;
            Url::parse(&raw).map_err(|e| Error::invalid_input(format!("invalid {key} '{raw}': {e}")))
        };

        Ok(Self {
            client_id: get("CLIENT_ID")?,
            client_secret: get("CLIENT_SECRET")?,
            token_url: parse("TOKEN_URL")?,
            api_base_url: parse("API_BASE_URL")?,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchange the client id/secret for a bearer token
///
/// The token is requested once per job and never refreshed.
pub async fn request_access_token(http: &Client, credentials: &Credentials) -> Result<AccessToken> {
    let resource = credentials.token_url.as_str();
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
    ];

    let response = http
        .post(credentials.token_url.clone())
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            log::error!(
                "Unable to request access token for '{}' with client_id '{}'",
                credentials.api_base_url,
                credentials.client_id
            );
            Error::request(resource, e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::invalid_response(resource, e.to_string()))?;

    let access_token = token.access_token.ok_or_else(|| Error::MissingKey {
        resource: resource.to_string(),
        key: "access_token".to_string(),
    })?;

    match token.expires_in {
        Some(seconds) => log::debug!("Access token acquired, expires in {}s", seconds),
        None => log::debug!("Access token acquired"),
    }

    Ok(AccessToken::new(access_token))
}
