//! Record schema and payload loading.
//!
//! Handles loading schemas and payloads from files and strings.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::RecordSchema;

/// Load and validate a record schema from a file path.
///
/// # Errors
///
/// Returns `SchemaError::FileNotFound` if the file doesn't exist,
/// `SchemaError::InvalidJson` if it isn't a well-formed schema document,
/// or `SchemaError::InvalidSchema` if field names are empty or repeated.
pub fn load_record_schema(path: &Path) -> Result<RecordSchema, SchemaError> {
    let schema: RecordSchema = read_json(path)?;
    schema.validate()?;
    Ok(schema)
}

/// Load and validate a record schema from a JSON string.
///
/// # Errors
///
/// Returns `SchemaError::InvalidJson` or `SchemaError::InvalidSchema`.
pub fn load_record_schema_str(content: &str) -> Result<RecordSchema, SchemaError> {
    let schema: RecordSchema =
        serde_json::from_str(content).map_err(|source| SchemaError::InvalidJson { source })?;
    schema.validate()?;
    Ok(schema)
}

/// Load a JSON payload from a file path.
///
/// # Errors
///
/// Returns `SchemaError::FileNotFound` if the file doesn't exist,
/// or `SchemaError::InvalidJson` if the file isn't valid JSON.
pub fn load_payload(path: &Path) -> Result<Value, SchemaError> {
    read_json(path)
}

/// Load a JSON payload from a string.
///
/// # Errors
///
/// Returns `SchemaError::InvalidJson` if the string isn't valid JSON.
pub fn load_payload_str(content: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(content).map_err(|source| SchemaError::InvalidJson { source })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| SchemaError::InvalidJson { source })
}
