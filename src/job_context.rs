//! Connected clients shared by every step of a job
//!
//! The context is built once per invocation and handed to each pipeline by
//! reference. The iSAMS token is requested here and never refreshed.

use crate::client::{
    Auth, Credentials, GoogleClient, IsamsClient, SecretManager, request_access_token,
};
use crate::isams::DatasetDescriptor;
use crate::settings::{CredentialSource, Settings};
use crate::warehouse::{BigQuery, DatasetRef, TableId};
use eyre::{Context, Result};

pub struct JobContext {
    isams: IsamsClient,
    warehouse: BigQuery,
    destination: DatasetRef,
    page_size: u32,
}

/// Google client authenticated with `GOOGLE_ACCESS_TOKEN` when set
pub fn google_client(settings: &Settings) -> Result<GoogleClient> {
    let auth = match &settings.google_token {
        Some(token) => Auth::Bearer(token.clone()),
        None => {
            log::warn!("GOOGLE_ACCESS_TOKEN not set, calling Google APIs without credentials");
            Auth::None
        }
    };
    GoogleClient::try_new(auth, settings.google_endpoints.clone())
        .context("Failed to create Google API client")
}

/// Resolve the iSAMS credential bundle, from the secret manager if needed
pub async fn resolve_credentials(
    settings: &Settings,
    google: &GoogleClient,
) -> Result<Credentials> {
    match &settings.credentials {
        CredentialSource::Direct(credentials) => Ok(credentials.clone()),
        CredentialSource::SecretManager { secret_id } => {
            let project = settings.project()?;
            let values = SecretManager::new(google.clone(), project)
                .access(secret_id)
                .await
                .with_context(|| format!("Failed to read secret '{}'", secret_id))?;
            Ok(Credentials::from_map(&values)
                .with_context(|| format!("Secret '{}' is not a credential bundle", secret_id))?)
        }
    }
}

/// Authenticate against iSAMS and build a client carrying the token
pub async fn connect_isams(credentials: &Credentials) -> Result<IsamsClient> {
    let http = reqwest::Client::new();
    let token = request_access_token(&http, credentials)
        .await
        .context("Failed to generate an iSAMS access token")?;
    log::debug!("Access token acquired for {}", credentials.api_base_url);
    IsamsClient::try_new(credentials.api_base_url.clone(), Auth::Bearer(token))
        .context("Failed to create iSAMS client")
}

impl JobContext {
    pub fn new(
        isams: IsamsClient,
        warehouse: BigQuery,
        destination: DatasetRef,
        page_size: u32,
    ) -> Self {
        Self {
            isams,
            warehouse,
            destination,
            page_size,
        }
    }

    /// Authenticate and build every client the job needs
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let destination = settings.require_warehouse()?.clone();
        let project = settings.project()?.to_string();

        let google = google_client(settings)?;
        let credentials = resolve_credentials(settings, &google).await?;
        let isams = connect_isams(&credentials).await?;

        let warehouse = BigQuery::new(google, project).with_location(settings.location.clone());
        Ok(Self::new(isams, warehouse, destination, settings.page_size))
    }

    pub fn isams(&self) -> &IsamsClient {
        &self.isams
    }

    pub fn warehouse(&self) -> &BigQuery {
        &self.warehouse
    }

    pub fn destination(&self) -> &DatasetRef {
        &self.destination
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn table(&self, name: &str) -> TableId {
        self.destination.table(name)
    }

    pub fn table_for(&self, dataset: &DatasetDescriptor) -> TableId {
        self.table(dataset.table())
    }
}
