//! Error types for update map construction and record schema loading.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::UpdateMap;

/// Errors while projecting a record into an update map.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("update map input must be a record, got {actual}")]
    InvalidInput { actual: String },

    /// A semi-structured value could not be encoded.
    #[error("failed to encode field {field} ({key}) to JSON: {source}")]
    Serialization {
        field: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("embedded field {field} exceeds the nesting limit of {limit}")]
    DepthExceeded { field: String, limit: usize },
}

impl BuildError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Serialization { .. } => 1,
            _ => 2,
        }
    }
}

/// A failed build together with everything inserted before the failure.
///
/// Entries written before the error are kept; nothing is rolled back.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PartialBuild<'a> {
    pub partial: UpdateMap<'a>,
    #[source]
    pub error: BuildError,
}

impl<'a> PartialBuild<'a> {
    /// Split into the entries written so far and the error.
    pub fn into_parts(self) -> (UpdateMap<'a>, BuildError) {
        (self.partial, self.error)
    }

    /// Returns the exit code of the underlying error.
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

/// Errors while loading record schemas and payloads.
#[derive(Debug, Error)]
pub enum SchemaError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record schema: {message}")]
    InvalidSchema { message: String },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaError::FileNotFound { .. } | SchemaError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
