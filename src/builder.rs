//! Update map construction - flattens a record into column/value pairs.

use serde::Serialize;
use tracing::{debug, trace};

use crate::annotations::Annotations;
use crate::error::{BuildError, PartialBuild};
use crate::record::{Encode, Field, FieldValue, Record, RecordValue, RecordView, Shape};
use crate::resolver::{resolve_document_key, resolve_key, KeySource};
use crate::types::{BuildOptions, RawJson, SkipSet, UpdateMap, UpdateValue};

/// Build a relational update map with the default [`BuildOptions`].
///
/// See [`build_relational_update_map_with`].
pub fn build_relational_update_map<'a, R: Record + ?Sized>(
    obj: &'a R,
    skip: &SkipSet,
) -> Result<UpdateMap<'a>, PartialBuild<'a>> {
    build_relational_update_map_with(obj, skip, &BuildOptions::default())
}

/// Build a relational update map.
///
/// Keys follow the precedence in [`crate::resolver`]. Fields annotated
/// `embedded` are flattened in place with their `embeddedPrefix`;
/// semi-structured fields are stored as [`RawJson`]. Absent values are left
/// out. Every other value is stored as-is, default values included, and is
/// not encoded until the map is rendered.
///
/// An absent `obj` yields an empty map.
///
/// # Errors
///
/// Returns [`PartialBuild`] carrying the entries inserted so far when `obj`
/// is not a record, when a semi-structured value cannot be encoded, or when
/// embedded groups nest deeper than `options.max_depth`. Traversal stops at
/// the first error.
pub fn build_relational_update_map_with<'a, R: Record + ?Sized>(
    obj: &'a R,
    skip: &SkipSet,
    options: &BuildOptions,
) -> Result<UpdateMap<'a>, PartialBuild<'a>> {
    let mut result = UpdateMap::new();

    let fields = match obj.shape() {
        Shape::Fields(fields) => fields,
        Shape::Absent => return Ok(result),
        Shape::Other(actual) => {
            return Err(PartialBuild {
                partial: result,
                error: BuildError::InvalidInput {
                    actual: actual.to_string(),
                },
            })
        }
    };

    let walker = Walker { options };
    let outcome = walker.walk(fields, "", "", 0, &mut |leaf: Leaf<'a>| {
        insert_relational(leaf, skip, &mut result)
    });

    match outcome {
        Ok(()) => Ok(result),
        Err(error) => Err(PartialBuild {
            partial: result,
            error,
        }),
    }
}

/// Build a document-store update map.
///
/// No flattening and no semi-structured encoding: every present field is
/// stored whole under its document annotation, or its declared name with the
/// first letter lowercased. Skip keys are matched against that key.
///
/// Never fails: absent values and non-record input are left out.
pub fn build_document_update_map<'a, R: Record + ?Sized>(
    obj: &'a R,
    skip: &SkipSet,
) -> UpdateMap<'a> {
    let mut result = UpdateMap::new();

    let Shape::Fields(fields) = obj.shape() else {
        return result;
    };

    for field in fields {
        let Field {
            name,
            annotations,
            value,
        } = field;

        let key = resolve_document_key(name, &annotations);
        if key.is_empty() || skip.contains(&key) {
            trace!(field = name, key = %key, "no key or key in skip set");
            continue;
        }
        let Some(value) = value else {
            continue;
        };

        result.insert(key, UpdateValue::Value(value.encoder()));
    }

    result
}

/// Encode a semi-structured value to JSON bytes.
///
/// Non-finite floats (`NaN`, infinities) have no JSON form; `serde_json`
/// writes them as `null` rather than failing.
pub fn encode_semi_structured(value: &dyn Encode) -> serde_json::Result<RawJson> {
    value.to_json().map(RawJson::new)
}

/// How one field was mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyExplanation {
    /// Declared names from the root, joined with `.`.
    pub field: String,
    /// Final key including embedded prefixes; empty when the field is skipped.
    pub key: String,
    /// Source of the key, `None` when nothing resolved.
    pub source: Option<KeySource>,
    pub semi_structured: bool,
    /// The field currently holds no value.
    pub absent: bool,
}

/// List the key every reachable field resolves to, in traversal order.
///
/// Embedded groups are expanded when present; absent groups contribute
/// nothing, as in [`build_relational_update_map_with`].
///
/// # Errors
///
/// Same structural errors as a build: non-record input or too-deep nesting.
pub fn explain_keys<R: Record + ?Sized>(
    obj: &R,
    options: &BuildOptions,
) -> Result<Vec<KeyExplanation>, BuildError> {
    let mut explanations = Vec::new();

    let fields = match obj.shape() {
        Shape::Fields(fields) => fields,
        Shape::Absent => return Ok(explanations),
        Shape::Other(actual) => {
            return Err(BuildError::InvalidInput {
                actual: actual.to_string(),
            })
        }
    };

    let walker = Walker { options };
    walker.walk(fields, "", "", 0, &mut |leaf: Leaf<'_>| {
        explanations.push(KeyExplanation {
            absent: leaf.value.is_none(),
            field: leaf.path,
            key: leaf.key,
            source: leaf.source,
            semi_structured: leaf.semi_structured,
        });
        Ok(())
    })?;

    Ok(explanations)
}

// --- Internal implementation ---

/// A non-embedded field reached by the walk, with its final key.
struct Leaf<'a> {
    name: &'a str,
    path: String,
    key: String,
    source: Option<KeySource>,
    semi_structured: bool,
    value: Option<FieldValue<'a>>,
}

type Visit<'a, 'f> = dyn FnMut(Leaf<'a>) -> Result<(), BuildError> + 'f;

struct Walker<'o> {
    options: &'o BuildOptions,
}

impl Walker<'_> {
    fn walk<'a>(
        &self,
        fields: Vec<Field<'a>>,
        prefix: &str,
        path: &str,
        depth: usize,
        visit: &mut Visit<'a, '_>,
    ) -> Result<(), BuildError> {
        for field in fields {
            let Field {
                name,
                annotations,
                value,
            } = field;

            debug!(
                field = name,
                relational = annotations.relational.unwrap_or_default(),
                document = annotations.document.unwrap_or_default(),
                serialization = annotations.serialization.unwrap_or_default(),
                "processing field"
            );

            let field_path = if path.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", path, name)
            };

            let value = match value {
                Some(FieldValue::Record(record)) if annotations.is_embedded() => {
                    self.walk_embedded(&field_path, &annotations, &record, prefix, depth, visit)?;
                    continue;
                }
                None if annotations.is_embedded() => {
                    debug!(field = %field_path, "skipping absent embedded field");
                    continue;
                }
                Some(FieldValue::Scalar(scalar)) if annotations.is_embedded() => {
                    debug!(field = %field_path, "embedded marker on a non-record field, storing as a column");
                    Some(FieldValue::Scalar(scalar))
                }
                other => other,
            };

            let resolved = resolve_key(name, &annotations, &self.options.naming);
            let key = if resolved.is_skipped() {
                String::new()
            } else {
                format!("{}{}", prefix, resolved.key)
            };

            visit(Leaf {
                name,
                path: field_path,
                key,
                source: resolved.source,
                semi_structured: resolved.semi_structured,
                value,
            })?;
        }

        Ok(())
    }

    fn walk_embedded<'a>(
        &self,
        path: &str,
        annotations: &Annotations<'_>,
        value: &RecordValue<'a>,
        prefix: &str,
        depth: usize,
        visit: &mut Visit<'a, '_>,
    ) -> Result<(), BuildError> {
        if depth >= self.options.max_depth {
            return Err(BuildError::DepthExceeded {
                field: path.to_string(),
                limit: self.options.max_depth,
            });
        }

        let prefix = format!("{}{}", prefix, annotations.embedded_prefix());
        debug!(field = path, prefix = %prefix, "flattening embedded field");

        match value.record().view() {
            Shape::Fields(fields) => self.walk(fields, &prefix, path, depth + 1, visit),
            Shape::Absent => {
                debug!(field = path, "skipping absent embedded field");
                Ok(())
            }
            Shape::Other(actual) => Err(BuildError::InvalidInput {
                actual: actual.to_string(),
            }),
        }
    }
}

fn insert_relational<'a>(
    leaf: Leaf<'a>,
    skip: &SkipSet,
    result: &mut UpdateMap<'a>,
) -> Result<(), BuildError> {
    if leaf.key.is_empty() {
        trace!(field = %leaf.path, "no key resolved, skipping");
        return Ok(());
    }
    if skip.contains(&leaf.key) {
        trace!(field = %leaf.path, key = %leaf.key, "key in skip set");
        return Ok(());
    }
    let Some(value) = leaf.value else {
        trace!(field = %leaf.path, key = %leaf.key, "absent value, skipping");
        return Ok(());
    };

    let encoder = value.encoder();
    if !leaf.semi_structured {
        result.insert(leaf.key, UpdateValue::Value(encoder));
        return Ok(());
    }

    match encode_semi_structured(encoder) {
        Ok(raw) => {
            result.insert(leaf.key, UpdateValue::Raw(raw));
            Ok(())
        }
        Err(source) => Err(BuildError::Serialization {
            field: leaf.name.to_string(),
            key: leaf.key,
            source,
        }),
    }
}
