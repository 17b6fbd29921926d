//! Runtime record schemas.
//!
//! A [`RecordSchema`] describes the fields of a record type as data, so that
//! plain JSON payloads can be projected without a hand-written [`Record`]
//! impl:
//!
//! ```json
//! {
//!   "name": "User",
//!   "fields": [
//!     { "name": "ID", "relational": "column:user_id" },
//!     { "name": "FirstName", "property": "firstName", "optional": true },
//!     { "name": "Settings", "relational": "type:jsonb", "serialization": "user_settings" },
//!     { "name": "Address", "relational": "embedded;embeddedPrefix:addr_",
//!       "fields": [ { "name": "Street" }, { "name": "City" } ] }
//!   ]
//! }
//! ```
//!
//! Payload properties are looked up by `property`, or by `name` when no
//! property is given.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotations::Annotations;
use crate::error::SchemaError;
use crate::record::{Field, FieldValue, Record, RecordView, Shape};
use crate::types::json_type_name;

/// Field layout of one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

/// One field of a [`RecordSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    /// Declared field name, fed to the naming strategy.
    pub name: String,
    /// Payload property holding the value; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relational: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization: Option<String>,
    /// `null` in the payload counts as absent.
    #[serde(default)]
    pub optional: bool,
    /// Nested layout; makes the field a record that can be embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSchema>>,
}

impl FieldSchema {
    /// The payload property this field reads.
    pub fn payload_key(&self) -> &str {
        self.property.as_deref().unwrap_or(&self.name)
    }

    pub fn annotations(&self) -> Annotations<'_> {
        Annotations {
            relational: self.relational.as_deref(),
            document: self.document.as_deref(),
            serialization: self.serialization.as_deref(),
        }
    }
}

impl RecordSchema {
    /// Check field names: non-empty and unique per level.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` naming the offending field path.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::InvalidSchema {
                message: "record name is empty".to_string(),
            });
        }
        validate_fields(&self.fields, &self.name)
    }

    /// View a payload as a record of this type.
    pub fn bind<'a>(&'a self, value: &'a Value) -> SchemaRecord<'a> {
        SchemaRecord {
            fields: &self.fields,
            value,
        }
    }
}

fn validate_fields(fields: &[FieldSchema], path: &str) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(SchemaError::InvalidSchema {
                message: format!("{}: field {} has an empty name", path, index),
            });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::InvalidSchema {
                message: format!("{}: duplicate field {}", path, field.name),
            });
        }
        if let Some(nested) = &field.fields {
            validate_fields(nested, &format!("{}.{}", path, field.name))?;
        }
    }
    Ok(())
}

/// A JSON payload viewed through a [`RecordSchema`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaRecord<'a> {
    fields: &'a [FieldSchema],
    value: &'a Value,
}

impl Record for SchemaRecord<'_> {
    fn shape(&self) -> Shape<'_> {
        self.view()
    }
}

impl<'a> RecordView<'a> for SchemaRecord<'a> {
    fn view(&self) -> Shape<'a> {
        match self.value {
            Value::Object(object) => Shape::Fields(
                self.fields
                    .iter()
                    .map(|field| bind_field(field, object))
                    .collect(),
            ),
            Value::Null => Shape::Absent,
            other => Shape::Other(json_type_name(other)),
        }
    }
}

fn bind_field<'a>(schema: &'a FieldSchema, object: &'a Map<String, Value>) -> Field<'a> {
    let value = match object.get(schema.payload_key()) {
        None => None,
        Some(Value::Null) if schema.optional => None,
        Some(value) => Some(match &schema.fields {
            Some(nested) => FieldValue::boxed_record(
                Box::new(SchemaRecord {
                    fields: nested,
                    value,
                }),
                value,
            ),
            None => FieldValue::Scalar(value),
        }),
    };

    Field::with_value(&schema.name, value).annotations(schema.annotations())
}
