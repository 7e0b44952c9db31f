//! Google Drive uploads with duplicate detection
//!
//! Files are matched by exact name inside the destination folder. With
//! duplicate updating enabled the first match gets new content; otherwise a
//! new file is always created next to any existing ones.

use super::FileType;
use super::bucket::checked_file_name;
use crate::client::GoogleClient;
use crate::client::google::api_url;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use url::Url;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// The drive that uploads land in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveTarget {
    Shared { drive_id: String },
    MyDrive,
}

impl DriveTarget {
    /// A shared drive takes its id as given; a personal drive must be
    /// addressed as `my-drive`
    pub fn new(is_shared_drive: bool, drive_id: &str) -> Result<Self> {
        match (is_shared_drive, drive_id) {
            (true, id) if !id.trim().is_empty() => Ok(Self::Shared {
                drive_id: id.to_string(),
            }),
            (true, _) => Err(Error::invalid_input("a shared drive needs a drive id")),
            (false, "my-drive") => Ok(Self::MyDrive),
            (false, other) => Err(Error::invalid_input(format!(
                "Invalid parent folder id '{other}'; use 'my-drive' for a personal drive"
            ))),
        }
    }

    pub fn drive_id(&self) -> &str {
        match self {
            Self::Shared { drive_id } => drive_id,
            Self::MyDrive => "root",
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveUpload {
    Created(DriveFile),
    Updated(DriveFile),
}

impl DriveUpload {
    pub fn file(&self) -> &DriveFile {
        match self {
            Self::Created(file) | Self::Updated(file) => file,
        }
    }
}

/// Quote a value for a Drive search query
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[derive(Clone, Debug)]
pub struct Drive {
    google: GoogleClient,
    target: DriveTarget,
}

impl Drive {
    pub fn new(google: GoogleClient, target: DriveTarget) -> Self {
        Self { google, target }
    }

    pub fn target(&self) -> &DriveTarget {
        &self.target
    }

    fn files_url(&self, upload: bool) -> Result<Url> {
        let segments: &[&str] = if upload {
            &["upload", "drive", "v3", "files"]
        } else {
            &["drive", "v3", "files"]
        };
        let mut url = api_url(&self.google.endpoints().drive, segments)?;
        url.query_pairs_mut()
            .append_pair("supportsAllDrives", &self.target.is_shared().to_string());
        Ok(url)
    }

    async fn list(&self, query: &str, fields: &str, newest_only: bool) -> Result<Vec<DriveFile>> {
        let mut url = self.files_url(false)?;
        {
            let shared = self.target.is_shared().to_string();
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("fields", fields)
                .append_pair("includeItemsFromAllDrives", &shared);
            if newest_only {
                pairs
                    .append_pair("orderBy", "modifiedTime desc")
                    .append_pair("pageSize", "1");
            }
        }
        log::trace!("Drive query: {}", query);
        let list: FileList = self
            .google
            .send_json(self.google.http().get(url), "drive files")
            .await?;
        Ok(list.files)
    }

    /// Non-trashed files named exactly `name` in `folder_id`
    pub async fn duplicates(&self, folder_id: &str, name: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "{} in parents and name={} and trashed=false",
            quote(folder_id),
            quote(name)
        );
        self.list(&query, "files(id, name)", false)
            .await
            .inspect_err(|e| log::error!("Unable to read folder id {}: {}", folder_id, e))
    }

    /// Most recently modified folder named `name` under `parent_id`
    ///
    /// With `create` set, a missing folder is created and returned.
    pub async fn find_folder(
        &self,
        parent_id: &str,
        name: &str,
        create: bool,
    ) -> Result<Option<DriveFile>> {
        let query = format!(
            "{} in parents and name={} and mimeType={} and trashed=false",
            quote(parent_id),
            quote(name),
            quote(FOLDER_MIME_TYPE)
        );
        let found = self
            .list(&query, "files(id, name, modifiedTime)", true)
            .await
            .inspect_err(|e| {
                log::error!("Unable to autodetect '{}' in folder id '{}': {}", name, parent_id, e)
            })?;

        if let Some(folder) = found.into_iter().next() {
            return Ok(Some(folder));
        }
        if !create {
            return Ok(None);
        }

        let mut url = self.files_url(false)?;
        url.query_pairs_mut().append_pair("fields", "id, name");
        let metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });
        let folder: DriveFile = self
            .google
            .send_json(self.google.http().post(url).json(&metadata), name)
            .await
            .inspect_err(|_| log::error!("Unable to create '{}' in folder id '{}'", name, parent_id))?;
        log::info!("Created folder '{}' ({})", folder.name, folder.id);
        Ok(Some(folder))
    }

    /// Create a new file in `folder_id`, regardless of existing names
    pub async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        data: Vec<u8>,
        file_type: FileType,
    ) -> Result<DriveFile> {
        log::info!("Creating {}", name);
        let mut url = self.files_url(true)?;
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("fields", "id, name");
        let metadata = json!({
            "name": name,
            "parents": [folder_id],
            "driveId": self.target.drive_id(),
        });

        let session = self.google.start_resumable(url, &metadata, name).await?;
        self.google
            .send_json(
                self.google
                    .http()
                    .put(session)
                    .header(reqwest::header::CONTENT_TYPE, file_type.content_type())
                    .body(data),
                name,
            )
            .await
            .inspect_err(|e| log::error!("Error processing {}: {}", name, e))
    }

    /// Replace the content of an existing file
    pub async fn update_file(
        &self,
        file: &DriveFile,
        data: Vec<u8>,
        file_type: FileType,
    ) -> Result<DriveFile> {
        log::info!("Updating {}", file.name);
        let mut url = api_url(
            &self.google.endpoints().drive,
            &["upload", "drive", "v3", "files", file.id.as_str()],
        )?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("supportsAllDrives", &self.target.is_shared().to_string());

        self.google
            .send_json(
                self.google
                    .http()
                    .patch(url)
                    .header(reqwest::header::CONTENT_TYPE, file_type.content_type())
                    .body(data),
                &file.name,
            )
            .await
            .inspect_err(|e| log::error!("Error processing {}: {}", file.name, e))
    }

    /// Upload in-memory content named `name` into `folder_id`
    pub async fn upload_bytes(
        &self,
        folder_id: &str,
        name: &str,
        data: Vec<u8>,
        file_type: FileType,
        update_duplicates: bool,
    ) -> Result<DriveUpload> {
        if update_duplicates {
            let duplicates = self.duplicates(folder_id, name).await?;
            if let Some(existing) = duplicates.first() {
                let updated = self.update_file(existing, data, file_type).await?;
                return Ok(DriveUpload::Updated(updated));
            }
        }
        let created = self.create_file(folder_id, name, data, file_type).await?;
        Ok(DriveUpload::Created(created))
    }

    /// Upload a local file into `folder_id` under its own file name
    pub async fn upload_file(
        &self,
        folder_id: &str,
        path: &Path,
        update_duplicates: bool,
    ) -> Result<DriveUpload> {
        let file_type = FileType::from_path(path)?;
        let name = checked_file_name(path)?;
        let data = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.upload_bytes(folder_id, &name, data, file_type, update_duplicates)
            .await
            .inspect_err(|e| log::error!("Upload failed for {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_drive_target() {
        assert_eq!(DriveTarget::new(false, "my-drive").unwrap().drive_id(), "root");
        let shared = DriveTarget::new(true, "0ABCdef").unwrap();
        assert_eq!(shared.drive_id(), "0ABCdef");
        assert!(shared.is_shared());
        assert_eq!(
            DriveTarget::new(false, "0ABCdef").unwrap_err().kind(),
            ErrorKind::Value
        );
        assert!(DriveTarget::new(true, " ").is_err());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("fees.csv"), "'fees.csv'");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn test_drive_file_parse() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "f1",
            "name": "fees.csv",
            "modifiedTime": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(file.modified_time.as_deref(), Some("2024-01-01T00:00:00Z"));
    }
}
