//! Job settings read from the environment

use crate::client::{AccessToken, Credentials, GoogleEndpoints};
use crate::warehouse::DatasetRef;
use eyre::{Context, Result, bail};
use std::collections::HashMap;
use url::Url;

pub const DEFAULT_SECRET_ID: &str = "isams_api_credentials";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

const DIRECT_KEYS: [(&str, &str); 4] = [
    ("CLIENT_ID", "ISAMS_CLIENT_ID"),
    ("CLIENT_SECRET", "ISAMS_CLIENT_SECRET"),
    ("TOKEN_URL", "ISAMS_TOKEN_URL"),
    ("API_BASE_URL", "ISAMS_API_BASE_URL"),
];

/// Where the iSAMS credential bundle comes from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// `ISAMS_*` environment variables
    Direct(Credentials),
    /// A secret in the secret manager of `GCP_PROJECT`
    SecretManager { secret_id: String },
}

/// Everything a job needs before it connects anywhere
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: CredentialSource,
    pub gcp_project: Option<String>,
    pub google_token: Option<AccessToken>,
    pub google_endpoints: GoogleEndpoints,
    pub warehouse: Option<DatasetRef>,
    pub location: Option<String>,
    pub page_size: u32,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// - ISAMS_CLIENT_ID, ISAMS_CLIENT_SECRET, ISAMS_TOKEN_URL, ISAMS_API_BASE_URL:
    ///   direct credentials (all four, or none)
    /// - ISAMS_SECRET_ID: secret holding the bundle when no direct credentials
    ///   are set (default `isams_api_credentials`)
    /// - GCP_PROJECT: project for the secret manager and load jobs
    /// - GOOGLE_ACCESS_TOKEN: bearer token for Google APIs
    /// - GOOGLE_API_BASE_URL: send every Google API call to this URL instead
    /// - WAREHOUSE_DATASET: `project.dataset` the tables are written to
    /// - WAREHOUSE_LOCATION: location of load jobs
    /// - ISAMS_PAGE_SIZE: page size of multi-page datasets (default 1000)
    pub fn from_env() -> Result<Self> {
        let credentials = Self::credentials_from_env()?;

        let warehouse = Self::warehouse_from_env()?;

        let google_endpoints = match var("GOOGLE_API_BASE_URL") {
            Some(raw) => GoogleEndpoints::all(
                Url::parse(&raw).with_context(|| format!("Invalid GOOGLE_API_BASE_URL: {}", raw))?,
            ),
            None => GoogleEndpoints::default(),
        };

        let page_size = match var("ISAMS_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| eyre::eyre!("ISAMS_PAGE_SIZE must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            credentials,
            gcp_project: var("GCP_PROJECT"),
            google_token: var("GOOGLE_ACCESS_TOKEN").map(AccessToken::new),
            google_endpoints,
            warehouse,
            location: var("WAREHOUSE_LOCATION"),
            page_size,
        })
    }

    /// `WAREHOUSE_DATASET` alone, for commands that never connect
    pub fn warehouse_from_env() -> Result<Option<DatasetRef>> {
        var("WAREHOUSE_DATASET")
            .map(|raw| {
                raw.parse::<DatasetRef>()
                    .with_context(|| format!("Invalid WAREHOUSE_DATASET: {}", raw))
            })
            .transpose()
    }

    fn credentials_from_env() -> Result<CredentialSource> {
        let direct: HashMap<String, String> = DIRECT_KEYS
            .iter()
            .filter_map(|(key, env)| var(env).map(|v| (key.to_string(), v)))
            .collect();

        if direct.is_empty() {
            let secret_id = var("ISAMS_SECRET_ID").unwrap_or_else(|| DEFAULT_SECRET_ID.to_string());
            return Ok(CredentialSource::SecretManager { secret_id });
        }
        if direct.len() < DIRECT_KEYS.len() {
            let missing: Vec<_> = DIRECT_KEYS
                .iter()
                .filter(|(key, _)| !direct.contains_key(*key))
                .map(|(_, env)| *env)
                .collect();
            bail!(
                "Incomplete iSAMS credentials, missing: {}",
                missing.join(", ")
            );
        }
        let credentials = Credentials::from_map(&direct).context("Invalid iSAMS credentials")?;
        Ok(CredentialSource::Direct(credentials))
    }

    /// Project that owns load jobs and secrets
    pub fn project(&self) -> Result<&str> {
        self.gcp_project
            .as_deref()
            .or_else(|| self.warehouse.as_ref().map(|w| w.project.as_str()))
            .ok_or_else(|| eyre::eyre!("GCP_PROJECT environment variable not set"))
    }

    pub fn require_warehouse(&self) -> Result<&DatasetRef> {
        self.warehouse
            .as_ref()
            .ok_or_else(|| eyre::eyre!("WAREHOUSE_DATASET environment variable not set"))
    }
}
