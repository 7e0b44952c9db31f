//! Typed errors for the extract-load pipeline
//!
//! Components return [`Error`] so callers can tell operator mistakes,
//! permission problems and malformed payloads apart. Orchestration code wraps
//! these in `eyre` reports; the typed error stays reachable through
//! `Report::downcast_ref::<Error>()`.

use std::path::PathBuf;

/// The message iSAMS puts in the body when a token lacks the required scope
pub const NOT_AUTHORISED_MESSAGE: &str = "The user is not authorised for this request";

/// Broad category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input: write mode, file type, path, dataset name
    Value,
    /// The API denied the token's scope
    Permission,
    /// The payload is missing an expected key or has the wrong shape
    ResponseShape,
    /// Network, HTTP status or local I/O failure
    Transport,
    /// A warehouse load job finished with an error
    Warehouse,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("insufficient permission for '{resource}': {message}")]
    PermissionDenied { resource: String, message: String },

    #[error("response from '{resource}' is missing expected key '{key}'")]
    MissingKey { resource: String, key: String },

    #[error("unexpected response from '{resource}': {detail}")]
    InvalidResponse { resource: String, detail: String },

    #[error("failed to reach '{resource}'")]
    Request {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{resource}' returned {status}: {body}")]
    Status {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("load job into '{table}' failed: {message}")]
    LoadJob { table: String, message: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn request(resource: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            resource: resource.into(),
            source,
        }
    }

    pub fn invalid_response(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Value,
            Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::MissingKey { .. } | Self::InvalidResponse { .. } => ErrorKind::ResponseShape,
            Self::Request { .. } | Self::Status { .. } | Self::Io { .. } => ErrorKind::Transport,
            Self::LoadJob { .. } => ErrorKind::Warehouse,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::invalid_input("bad").kind(), ErrorKind::Value);
        assert_eq!(
            Error::PermissionDenied {
                resource: "/api/students".into(),
                message: NOT_AUTHORISED_MESSAGE.into(),
            }
            .kind(),
            ErrorKind::Permission
        );
        assert_eq!(
            Error::MissingKey {
                resource: "/api/students".into(),
                key: "students".into(),
            }
            .kind(),
            ErrorKind::ResponseShape
        );
        assert_eq!(
            Error::LoadJob {
                table: "p.d.t".into(),
                message: "boom".into(),
            }
            .kind(),
            ErrorKind::Warehouse
        );
    }

    #[test]
    fn test_messages_name_the_resource() {
        let err = Error::MissingKey {
            resource: "https://school.example/api/school/terms".into(),
            key: "terms".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/api/school/terms"));
        assert!(msg.contains("'terms'"));
    }

    #[test]
    fn test_survives_eyre_context() {
        let report = eyre::Report::new(Error::invalid_input("nope")).wrap_err("while loading");
        let err = report.downcast_ref::<Error>().unwrap();
        assert_eq!(err.kind(), ErrorKind::Value);
    }
}
