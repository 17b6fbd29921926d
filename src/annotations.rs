//! Per-field naming annotations.
//!
//! Three annotation strings can be attached to a field:
//!
//! | Annotation | Example | Read as |
//! |------------|---------|---------|
//! | relational | `column:user_id;embedded;embeddedPrefix:addr_;type:jsonb` | `;`-separated directives |
//! | document | `user_id,omitempty` | first `,` segment |
//! | serialization | `userId,omitempty` | first `,` segment |
//!
//! A first segment of `-` disables that annotation as a naming source.

/// Directive carrying an explicit column name.
pub const COLUMN_DIRECTIVE: &str = "column:";

/// Directive marking a field for in-place flattening.
pub const EMBEDDED_DIRECTIVE: &str = "embedded";

/// Directive carrying the key prefix of an embedded group.
pub const EMBEDDED_PREFIX_DIRECTIVE: &str = "embeddedPrefix:";

/// Token marking a semi-structured (JSONB) column. Also matches `type:jsonb`.
pub const SEMI_STRUCTURED_TOKEN: &str = "jsonb";

/// Marker that disables an annotation as a naming source.
pub const DISABLED_MARKER: &str = "-";

/// The annotation strings attached to one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotations<'a> {
    /// Composite relational annotation (`column:..;embedded;..`).
    pub relational: Option<&'a str>,
    /// Document-store field name annotation.
    pub document: Option<&'a str>,
    /// General serialization name annotation.
    pub serialization: Option<&'a str>,
}

impl<'a> Annotations<'a> {
    /// Value of the `column:` directive, if present and non-empty.
    pub fn column(&self) -> Option<&'a str> {
        directive_value(self.relational?, COLUMN_DIRECTIVE)
    }

    /// Whether the relational annotation carries the `embedded` directive.
    pub fn is_embedded(&self) -> bool {
        self.relational
            .is_some_and(|tag| directives(tag).any(|d| d == EMBEDDED_DIRECTIVE))
    }

    /// Prefix for keys of an embedded group; empty when not declared.
    pub fn embedded_prefix(&self) -> &'a str {
        self.relational
            .and_then(|tag| directive_value(tag, EMBEDDED_PREFIX_DIRECTIVE))
            .unwrap_or("")
    }

    /// Whether the field is a semi-structured (JSONB) column.
    ///
    /// Matches the `jsonb` token anywhere in the relational annotation.
    pub fn is_semi_structured(&self) -> bool {
        self.relational
            .is_some_and(|tag| tag.contains(SEMI_STRUCTURED_TOKEN))
    }

    /// Name from the document annotation.
    pub fn document_name(&self) -> Option<&'a str> {
        first_segment(self.document?)
    }

    /// Name from the serialization annotation.
    pub fn serialization_name(&self) -> Option<&'a str> {
        first_segment(self.serialization?)
    }
}

fn directives(tag: &str) -> impl Iterator<Item = &str> {
    tag.split(';').map(str::trim)
}

fn directive_value<'t>(tag: &'t str, directive: &str) -> Option<&'t str> {
    directives(tag)
        .find_map(|d| d.strip_prefix(directive))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn first_segment(tag: &str) -> Option<&str> {
    tag.split(',')
        .next()
        .filter(|name| !name.is_empty() && *name != DISABLED_MARKER)
}
