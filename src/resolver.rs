//! Key resolution - turns field annotations into an output key.
//!
//! Sources are tried in a fixed order and the first non-empty candidate wins.
//! The order depends only on whether the field is semi-structured:
//!
//! | Position | Ordinary field | Semi-structured field |
//! |----------|----------------|-----------------------|
//! | 1 | `column:` directive | `column:` directive |
//! | 2 | document annotation | document annotation |
//! | 3 | naming strategy | serialization annotation |
//! | 4 | serialization annotation | naming strategy |
//!
//! When every source is empty the key is `""` and the field is skipped.

use serde::Serialize;
use tracing::trace;

use crate::annotations::Annotations;
use crate::naming::{first_char_to_lower, NamingStrategy};

/// A place a key can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// `column:<name>` in the relational annotation.
    Column,
    /// First segment of the document annotation.
    Document,
    /// First segment of the serialization annotation.
    Serialization,
    /// The naming strategy applied to the declared name.
    Naming,
}

/// Precedence for ordinary relational columns.
pub const ORDINARY_PRECEDENCE: &[KeySource] = &[
    KeySource::Column,
    KeySource::Document,
    KeySource::Naming,
    KeySource::Serialization,
];

/// Precedence for semi-structured (JSONB) columns.
pub const SEMI_STRUCTURED_PRECEDENCE: &[KeySource] = &[
    KeySource::Column,
    KeySource::Document,
    KeySource::Serialization,
    KeySource::Naming,
];

/// The source order for a field.
pub fn precedence(semi_structured: bool) -> &'static [KeySource] {
    if semi_structured {
        SEMI_STRUCTURED_PRECEDENCE
    } else {
        ORDINARY_PRECEDENCE
    }
}

impl KeySource {
    /// The candidate key this source offers, if any.
    pub fn candidate(
        self,
        field_name: &str,
        annotations: &Annotations<'_>,
        naming: &NamingStrategy,
    ) -> Option<String> {
        let candidate = match self {
            KeySource::Column => annotations.column().map(str::to_string),
            KeySource::Document => annotations.document_name().map(str::to_string),
            KeySource::Serialization => annotations.serialization_name().map(str::to_string),
            KeySource::Naming => Some(naming.resolve(field_name)),
        };
        candidate.filter(|key| !key.is_empty())
    }

    /// Lowercase name, as shown by `explain`.
    pub fn as_str(self) -> &'static str {
        match self {
            KeySource::Column => "column",
            KeySource::Document => "document",
            KeySource::Serialization => "serialization",
            KeySource::Naming => "naming",
        }
    }
}

/// Outcome of key resolution for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    /// The unprefixed key; empty means skip.
    pub key: String,
    /// Which source produced the key.
    pub source: Option<KeySource>,
    pub semi_structured: bool,
}

impl ResolvedKey {
    /// No source produced a key; the field is left out.
    pub fn is_skipped(&self) -> bool {
        self.key.is_empty()
    }
}

/// Resolve the relational key of a field.
pub fn resolve_key(
    field_name: &str,
    annotations: &Annotations<'_>,
    naming: &NamingStrategy,
) -> ResolvedKey {
    let semi_structured = annotations.is_semi_structured();

    for &source in precedence(semi_structured) {
        if let Some(key) = source.candidate(field_name, annotations, naming) {
            trace!(
                field = field_name,
                key = %key,
                source = source.as_str(),
                semi_structured,
                "resolved key"
            );
            return ResolvedKey {
                key,
                source: Some(source),
                semi_structured,
            };
        }
    }

    trace!(field = field_name, "no key source matched");
    ResolvedKey {
        key: String::new(),
        source: None,
        semi_structured,
    }
}

/// Resolve the key of a field for document-store maps.
///
/// Document annotation first, then the declared name with its first letter
/// lowercased.
pub fn resolve_document_key(field_name: &str, annotations: &Annotations<'_>) -> String {
    annotations
        .document_name()
        .map(str::to_string)
        .unwrap_or_else(|| first_char_to_lower(field_name))
}
