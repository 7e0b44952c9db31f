//! Cloud Storage uploads over the JSON API

use super::FileType;
use crate::client::GoogleClient;
use crate::client::google::api_url;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use std::path::Path;
use std::str::FromStr;

/// What to do when the object already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Keep the existing object and skip the upload
    Ignore,
    /// Replace the existing object
    Overwrite,
}

impl FromStr for UploadMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "i" | "ignore" => Ok(Self::Ignore),
            "t" | "truncate" => Ok(Self::Overwrite),
            _ => Err(Error::invalid_input(format!(
                "'{s}' is not recognised. Use 'i' for ignore or 't' for truncate"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { object: String },
    Skipped { object: String },
}

impl UploadOutcome {
    pub fn object(&self) -> &str {
        match self {
            Self::Uploaded { object } | Self::Skipped { object } => object,
        }
    }
}

/// Object name for `file_name` under an optional prefix
pub fn object_name(prefix: Option<&str>, file_name: &str) -> String {
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}", prefix, file_name),
        None => file_name.to_string(),
    }
}

/// One Cloud Storage bucket
#[derive(Clone, Debug)]
pub struct Bucket {
    google: GoogleClient,
    name: String,
}

impl Bucket {
    pub fn new(google: GoogleClient, name: impl Into<String>) -> Self {
        Self {
            google,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self, object: &str) -> String {
        format!("gs://{}/{}", self.name, object)
    }

    /// Whether an object with this exact name exists
    pub async fn exists(&self, object: &str) -> Result<bool> {
        let url = api_url(
            &self.google.endpoints().storage,
            &["storage", "v1", "b", self.name.as_str(), "o", object],
        )?;
        let resource = self.resource(object);
        let response = self
            .google
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| Error::request(&resource, e))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::Status {
                resource,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Upload bytes as `object`
    pub async fn upload_bytes(
        &self,
        object: &str,
        data: Vec<u8>,
        file_type: FileType,
        mode: UploadMode,
    ) -> Result<UploadOutcome> {
        if mode == UploadMode::Ignore && self.exists(object).await? {
            log::info!("Skipping {} as it already exists", self.resource(object));
            return Ok(UploadOutcome::Skipped {
                object: object.to_string(),
            });
        }

        let mut url = api_url(
            &self.google.endpoints().storage,
            &["upload", "storage", "v1", "b", self.name.as_str(), "o"],
        )?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);

        let resource = self.resource(object);
        let request = self
            .google
            .http()
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, file_type.content_type())
            .body(data);
        self.google
            .send(request, &resource)
            .await
            .inspect_err(|_| log::error!("Failed to upload {} {}", file_type, resource))?;

        log::info!("Uploaded {} {}", file_type, resource);
        Ok(UploadOutcome::Uploaded {
            object: object.to_string(),
        })
    }

    /// Upload a local file as `<prefix>/<file name>`
    ///
    /// The extension must be a supported [`FileType`] and the path must be
    /// an existing regular file.
    pub async fn upload_file(
        &self,
        path: &Path,
        prefix: Option<&str>,
        mode: UploadMode,
    ) -> Result<UploadOutcome> {
        let file_type = FileType::from_path(path)?;
        let file_name = checked_file_name(path)?;
        let data = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.upload_bytes(&object_name(prefix, &file_name), data, file_type, mode)
            .await
    }
}

/// Name of an existing regular file, or a value error
pub(crate) fn checked_file_name(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::invalid_input(format!("{} not found", path.display())));
    }
    if !path.is_file() {
        return Err(Error::invalid_input(format!(
            "{} is not a file",
            path.display()
        )));
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_input(format!("{} has no file name", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_object_name() {
        assert_eq!(object_name(Some("exports/2024"), "a.csv"), "exports/2024/a.csv");
        assert_eq!(object_name(Some("exports/"), "a.csv"), "exports/a.csv");
        assert_eq!(object_name(Some(""), "a.csv"), "a.csv");
        assert_eq!(object_name(None, "a.csv"), "a.csv");
    }

    #[test]
    fn test_upload_mode_parse() {
        assert_eq!("i".parse::<UploadMode>().unwrap(), UploadMode::Ignore);
        assert_eq!("T".parse::<UploadMode>().unwrap(), UploadMode::Overwrite);
        assert_eq!("x".parse::<UploadMode>().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_checked_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fees.csv");
        std::fs::write(&file, "a,b\n1,2\n").unwrap();

        assert_eq!(checked_file_name(&file).unwrap(), "fees.csv");
        assert!(checked_file_name(dir.path()).unwrap_err().to_string().contains("is not a file"));
        assert!(checked_file_name(&dir.path().join("missing.csv"))
            .unwrap_err()
            .to_string()
            .contains("not found"));
    }
}
