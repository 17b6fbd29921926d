//! Update Map
//!
//! Projection of typed records into flat update maps.
//!
//! A record describes its fields together with naming annotations; this
//! library turns it into a `column -> value` map ready to be used as the
//! payload of a partial update against a relational or document store.
//! Ordinary values are borrowed from the record as-is; only semi-structured
//! values are encoded during the build.
//!
//! # Example
//!
//! ```
//! use serde::Serialize;
//! use serde_json::json;
//! use update_map::{build_relational_update_map, update_map_to_json, Field, Record, Shape, SkipSet};
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     first_name: String,
//!     nickname: Option<String>,
//!     settings: serde_json::Value,
//! }
//!
//! impl Record for User {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Fields(vec![
//!             Field::new("ID", &self.id).relational("column:user_id"),
//!             Field::new("FirstName", &self.first_name).serialization("firstName"),
//!             Field::optional("Nickname", &self.nickname),
//!             Field::new("Settings", &self.settings)
//!                 .relational("type:jsonb")
//!                 .serialization("user_settings"),
//!         ])
//!     }
//! }
//!
//! let user = User {
//!     id: 1,
//!     first_name: "Jane".into(),
//!     nickname: None,
//!     settings: json!({"theme": "dark"}),
//! };
//!
//! let map = build_relational_update_map(&user, &SkipSet::new()).unwrap();
//!
//! assert!(!map.contains_key("nickname"));
//! assert_eq!(
//!     map["user_settings"].as_raw().unwrap().as_bytes(),
//!     br#"{"theme":"dark"}"#
//! );
//! assert_eq!(
//!     update_map_to_json(&map).unwrap(),
//!     json!({"user_id": 1, "first_name": "Jane", "user_settings": {"theme": "dark"}})
//! );
//! ```
//!
//! # Key Precedence
//!
//! | Order | Ordinary field | Semi-structured (`jsonb`) field |
//! |-------|----------------|---------------------------------|
//! | 1 | `column:` directive | `column:` directive |
//! | 2 | document annotation | document annotation |
//! | 3 | naming strategy | serialization annotation |
//! | 4 | serialization annotation | naming strategy |
//!
//! A field whose sources are all empty is skipped.
//!
//! # Relational Directives
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `column:<name>` | Explicit key |
//! | `embedded` | Flatten the record's fields into the parent map |
//! | `embeddedPrefix:<text>` | Prefix every key of the embedded group |
//! | `type:jsonb` / `jsonb` | Store the value as encoded JSON bytes |

mod annotations;
mod builder;
mod error;
mod loader;
mod naming;
mod record;
mod resolver;
mod schema;
mod types;

pub use annotations::Annotations;
pub use builder::{
    build_document_update_map, build_relational_update_map, build_relational_update_map_with,
    encode_semi_structured, explain_keys, KeyExplanation,
};
pub use error::{BuildError, PartialBuild, SchemaError};
pub use loader::{load_payload, load_payload_str, load_record_schema, load_record_schema_str};
pub use naming::{
    default_naming_strategy, first_char_to_lower, set_default_naming_strategy, to_snake_case,
    NamingStrategy,
};
pub use record::{Encode, Field, FieldValue, Record, RecordValue, RecordView, Shape};
pub use resolver::{
    precedence, resolve_document_key, resolve_key, KeySource, ResolvedKey, ORDINARY_PRECEDENCE,
    SEMI_STRUCTURED_PRECEDENCE,
};
pub use schema::{FieldSchema, RecordSchema, SchemaRecord};
pub use types::{
    json_type_name, update_map_to_json, BuildOptions, RawJson, SkipSet, UpdateMap, UpdateValue,
    DEFAULT_MAX_DEPTH,
};
