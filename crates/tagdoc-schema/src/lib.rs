#![warn(missing_docs)]
//! `tagdoc-schema` - schema definitions for tagdoc documents.
//!
//! A schema is an ordered list of named [`Field`]s. Tags in a document bind to the field whose
//! name matches the tag name. Schemas are read once (usually from YAML) and are immutable after
//! load; the structured-view engine in `tagdoc-core` shares them behind an `Arc`.
//!
//! ```rust
//! use tagdoc_schema::{FieldType, Schema};
//!
//! let schema = Schema::from_yaml_str(
//!     r#"
//! name: quiz
//! fields:
//!   - name: question
//!     type: group
//!   - name: answer
//! "#,
//! )
//! .unwrap();
//!
//! let (_, answer) = schema.field("answer").unwrap();
//! assert_eq!(answer.field_type, FieldType::Text);
//! ```

mod definition;
mod error;
mod schema;

pub use definition::{Constraints, FieldDefinition, FieldType, SchemaDefinition};
pub use error::SchemaError;
pub use schema::{Field, FieldId, Schema};
