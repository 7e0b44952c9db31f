//! Write dispositions for warehouse loads

use crate::error::Error;
use std::str::FromStr;

/// How a load treats rows already in the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace every existing row with the loaded batch
    Truncate,
    /// Add the loaded batch after the existing rows
    Append,
}

impl WriteMode {
    /// BigQuery `writeDisposition` value
    pub fn disposition(&self) -> &'static str {
        match self {
            Self::Truncate => "WRITE_TRUNCATE",
            Self::Append => "WRITE_APPEND",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncate => write!(f, "truncate"),
            Self::Append => write!(f, "append"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "t" | "truncate" => Ok(Self::Truncate),
            "a" | "append" => Ok(Self::Append),
            _ => Err(Error::invalid_input(format!(
                "'{s}' is not recognised. Use 'a' for append or 't' for truncate"
            ))),
        }
    }
}

/// Hands out TRUNCATE for the first write of a run and APPEND afterwards
///
/// The downgrade happens in [`TruncateOnce::record_write`], which callers
/// invoke only after a write succeeded.
#[derive(Debug, Default)]
pub struct TruncateOnce {
    written: bool,
}

impl TruncateOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> WriteMode {
        if self.written {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        }
    }

    pub fn record_write(&mut self) {
        self.written = true;
    }
}
