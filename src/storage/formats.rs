//! Supported upload file types

use crate::error::{Error, Result};
use std::path::Path;
use std::str::FromStr;

/// A file type accepted by the bucket and drive uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Text,
    Excel,
    Log,
}

impl FileType {
    pub const ALL: [FileType; 4] = [Self::Csv, Self::Text, Self::Excel, Self::Log];

    /// Extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Text => ".txt",
            Self::Excel => ".xlsx",
            Self::Log => ".log",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Text | Self::Log => "text/plain",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Human-readable name used in log lines
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Text => "Text",
            Self::Excel => "Excel",
            Self::Log => "Log",
        }
    }

    /// File type of a path, judged by its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for FileType {
    type Err = Error;

    /// Parses an extension, with or without the leading dot
    fn from_str(s: &str) -> Result<Self> {
        let ext = if s.starts_with('.') {
            s.to_string()
        } else {
            format!(".{s}")
        };
        Self::ALL
            .into_iter()
            .find(|t| t.extension() == ext)
            .ok_or_else(|| {
                let supported: Vec<_> = Self::ALL.iter().map(FileType::extension).collect();
                Error::invalid_input(format!(
                    "Invalid file type '{s}'. Supported: {}",
                    supported.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        assert_eq!(".csv".parse::<FileType>().unwrap(), FileType::Csv);
        assert_eq!("xlsx".parse::<FileType>().unwrap(), FileType::Excel);
        assert_eq!(".log".parse::<FileType>().unwrap().content_type(), "text/plain");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ".pdf".parse::<FileType>().unwrap_err();
        assert!(err.to_string().contains(".csv, .txt, .xlsx, .log"));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            FileType::from_path(Path::new("/tmp/exports/fees.csv")).unwrap(),
            FileType::Csv
        );
        assert!(FileType::from_path(Path::new("/tmp/README")).is_err());
    }
}
