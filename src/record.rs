//! Field metadata extraction.
//!
//! A [`Record`] describes its own fields, in declaration order, every time it
//! is traversed. Implementations are usually a single `vec![...]` of
//! [`Field`] constructors:
//!
//! ```
//! use serde::Serialize;
//! use update_map::{Field, Record, Shape};
//!
//! #[derive(Serialize)]
//! struct Address {
//!     street: Option<String>,
//!     city: String,
//! }
//!
//! impl Record for Address {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Fields(vec![
//!             Field::optional("Street", &self.street),
//!             Field::new("City", &self.city),
//!         ])
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     address: Address,
//! }
//!
//! impl Record for User {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Fields(vec![
//!             Field::new("ID", &self.id).relational("column:user_id"),
//!             Field::record("Address", &self.address).relational("embedded;embeddedPrefix:addr_"),
//!         ])
//!     }
//! }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::annotations::Annotations;

/// Object-safe JSON encoding, implemented for every `Serialize` type.
pub trait Encode {
    /// Convert into a dynamic JSON value.
    fn to_value(&self) -> serde_json::Result<Value>;

    /// Serialize to compact JSON bytes.
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + ?Sized> Encode for T {
    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A value whose fields can be projected into an update map.
pub trait Record {
    /// Describe the current value.
    fn shape(&self) -> Shape<'_>;
}

/// What a [`Record`] looks like right now.
pub enum Shape<'a> {
    /// A composite value with fields in declaration order.
    Fields(Vec<Field<'a>>),
    /// An absent reference (`None`, JSON `null`).
    Absent,
    /// Not a composite; carries the name of the type encountered.
    Other(&'static str),
}

impl<R: Record + ?Sized> Record for &R {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<R: Record> Record for Option<R> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(record) => record.shape(),
            None => Shape::Absent,
        }
    }
}

/// A record whose fields borrow from `'a` rather than from the view itself.
///
/// Nested groups are reached through views, so values found below an
/// embedded field live as long as the outermost record.
pub trait RecordView<'a> {
    fn view(&self) -> Shape<'a>;
}

impl<'a, R: Record + ?Sized> RecordView<'a> for &'a R {
    fn view(&self) -> Shape<'a> {
        R::shape(*self)
    }
}

/// Current value of a present field.
pub enum FieldValue<'a> {
    /// Stored as a single value.
    Scalar(&'a dyn Encode),
    /// A composite that can be flattened when marked `embedded`.
    Record(RecordValue<'a>),
}

impl<'a> FieldValue<'a> {
    /// A composite value from a record view and the value it encodes as.
    pub fn boxed_record(record: Box<dyn RecordView<'a> + 'a>, encode: &'a dyn Encode) -> Self {
        FieldValue::Record(RecordValue { record, encode })
    }

    /// The encoder used when the value is stored whole.
    pub fn encoder(&self) -> &'a dyn Encode {
        match self {
            FieldValue::Scalar(encode) => *encode,
            FieldValue::Record(record) => record.encode,
        }
    }
}

/// A composite field value: walkable as a record, encodable as a whole.
pub struct RecordValue<'a> {
    record: Box<dyn RecordView<'a> + 'a>,
    encode: &'a dyn Encode,
}

impl<'a> RecordValue<'a> {
    /// The record view of the value.
    pub fn record(&self) -> &(dyn RecordView<'a> + 'a) {
        self.record.as_ref()
    }
}

/// Metadata and current value of one field.
pub struct Field<'a> {
    pub(crate) name: &'a str,
    pub(crate) annotations: Annotations<'a>,
    /// `None` when the field is an absent reference.
    pub(crate) value: Option<FieldValue<'a>>,
}

impl<'a> Field<'a> {
    /// A plain field; always present.
    pub fn new<T: Serialize>(name: &'a str, value: &'a T) -> Self {
        Self::with_value(name, Some(FieldValue::Scalar(value)))
    }

    /// A reference-like field; `None` is absent.
    pub fn optional<T: Serialize>(name: &'a str, value: &'a Option<T>) -> Self {
        let value = value
            .as_ref()
            .map(|value| FieldValue::Scalar(value as &dyn Encode));
        Self::with_value(name, value)
    }

    /// A composite field; flattened when annotated `embedded`.
    pub fn record<R: Record + Serialize>(name: &'a str, value: &'a R) -> Self {
        Self::with_value(
            name,
            Some(FieldValue::boxed_record(Box::new(value), value)),
        )
    }

    /// An optional composite field; `None` is absent.
    pub fn optional_record<R: Record + Serialize>(name: &'a str, value: &'a Option<R>) -> Self {
        let value = value
            .as_ref()
            .map(|value| FieldValue::boxed_record(Box::new(value), value));
        Self::with_value(name, value)
    }

    /// A field with an explicit value.
    pub fn with_value(name: &'a str, value: Option<FieldValue<'a>>) -> Self {
        Self {
            name,
            annotations: Annotations::default(),
            value,
        }
    }

    /// Replace all annotations at once.
    pub fn annotations(mut self, annotations: Annotations<'a>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Set the composite relational annotation.
    pub fn relational(mut self, tag: &'a str) -> Self {
        self.annotations.relational = Some(tag);
        self
    }

    /// Set the document-store annotation.
    pub fn document(mut self, tag: &'a str) -> Self {
        self.annotations.document = Some(tag);
        self
    }

    /// Set the serialization annotation.
    pub fn serialization(mut self, tag: &'a str) -> Self {
        self.annotations.serialization = Some(tag);
        self
    }

    /// Declared field name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The three annotation strings attached to the field.
    pub fn annotation_set(&self) -> &Annotations<'a> {
        &self.annotations
    }

    /// Current value; `None` when absent.
    pub fn value(&self) -> Option<&FieldValue<'a>> {
        self.value.as_ref()
    }

    /// Whether the field holds an absent reference.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}
