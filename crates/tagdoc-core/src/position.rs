//! Position model
//!
//! Owns one immutable snapshot of the structured view: the text it was built from, the
//! partition sequence and the tag tree. It is never patched in place; a document change
//! produces a new model, which the session publishes with a single `Arc` swap so readers
//! never observe a half-built tree.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagdoc_core::PositionModel;
//! use tagdoc_schema::Schema;
//!
//! let model = PositionModel::build("<a>x<b>yy</b></a>", 0, Arc::new(Schema::empty()));
//! let b = model.find_tag_by_offset(8, 9).unwrap();
//! assert_eq!(model.tag(b).unwrap().name, "b");
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::document::Document;
use crate::partition::{Partition, partition_at, partition_chars};
use crate::tags::{Tag, TagId, TagTree};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use tagdoc_schema::{FieldId, FieldType, Schema};

/// Immutable structured view of one document revision.
#[derive(Debug, Clone)]
pub struct PositionModel {
    stamp: u64,
    text: String,
    chars: Vec<char>,
    partitions: Vec<Partition>,
    tree: TagTree,
    schema: Arc<Schema>,
}

impl PositionModel {
    /// Partition `text` and build its tag tree. `stamp` is the document stamp it reflects.
    pub fn build(text: &str, stamp: u64, schema: Arc<Schema>) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let partitions = partition_chars(&chars);
        let tree = TagTree::build(&chars, &partitions, &schema);
        log::debug!(
            "built position model at stamp {stamp}: {} partitions, {} tags",
            partitions.len(),
            tree.len()
        );
        Self {
            stamp,
            text: text.to_string(),
            chars,
            partitions,
            tree,
            schema,
        }
    }

    /// Build from the document's current text and stamp.
    pub fn from_document(document: &Document, schema: Arc<Schema>) -> Self {
        Self::build(&document.text(), document.stamp(), schema)
    }

    /// Document stamp this model was built from.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Returns `true` if `document` has changed since this model was built.
    pub fn is_stale(&self, document: &Document) -> bool {
        document.stamp() != self.stamp
    }

    /// The text this model was built from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.chars.len()
    }

    /// Schema tags were bound against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Partition sequence.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Partition containing `offset`.
    pub fn partition_at(&self, offset: usize) -> Option<&Partition> {
        partition_at(&self.partitions, offset)
    }

    /// Underlying tag tree.
    pub fn tree(&self) -> &TagTree {
        &self.tree
    }

    /// Top-level tags.
    pub fn roots(&self) -> &[TagId] {
        self.tree.roots()
    }

    /// Tag by id.
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tree.get(id)
    }

    /// Parent of a tag.
    pub fn parent(&self, id: TagId) -> Option<TagId> {
        self.tree.parent(id)
    }

    /// Ancestors of a tag, innermost first.
    pub fn ancestors(&self, id: TagId) -> impl Iterator<Item = TagId> + '_ {
        self.tree.ancestors(id)
    }

    /// Innermost tag fully containing `[start, end)`, if any.
    pub fn find_tag_by_offset(&self, start: usize, end: usize) -> Option<TagId> {
        self.tree.find_by_offset(start, end)
    }

    /// Text in `range` (clamped to the model).
    pub fn slice(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Full source of a tag, including its markup.
    pub fn tag_text(&self, id: TagId) -> Option<String> {
        self.tag(id).map(|t| self.slice(t.range()))
    }

    /// Text between a tag's opening and closing markup.
    pub fn content_text(&self, id: TagId) -> Option<String> {
        self.tag(id).map(|t| self.slice(t.content.clone()))
    }

    /// Tags bound to `field`, in document order.
    pub fn tags_for_field(&self, field: FieldId) -> impl Iterator<Item = TagId> + '_ {
        self.tree
            .iter()
            .filter(move |(_, t)| t.field == Some(field))
            .map(|(id, _)| id)
    }

    /// Tags named `name`, in document order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = TagId> + 'a {
        self.tree
            .iter()
            .filter(move |(_, t)| t.name == name)
            .map(|(id, _)| id)
    }

    /// Check the tree against the schema.
    ///
    /// Unclosed elements are reported even with an empty schema; every other check needs
    /// declared fields.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        let mut occurrences: HashMap<FieldId, usize> = HashMap::new();

        for (_, tag) in self.tree.iter() {
            if !tag.closed {
                out.push(Diagnostic::schema(
                    tag.range(),
                    DiagnosticSeverity::Error,
                    "unclosed-tag",
                    format!("element <{}> is not closed", tag.name),
                ));
            }
            if self.schema.is_empty() {
                continue;
            }

            let Some((field_id, field)) = tag
                .field
                .and_then(|f| Some((f, self.schema.field_by_id(f)?)))
            else {
                out.push(Diagnostic::schema(
                    tag.range(),
                    DiagnosticSeverity::Warning,
                    "unknown-element",
                    format!("element <{}> is not declared in the schema", tag.name),
                ));
                continue;
            };

            let count = occurrences.entry(field_id).or_default();
            *count += 1;
            if let Some(max) = field.constraints.max_occurs
                && *count > max
            {
                out.push(Diagnostic::schema(
                    tag.range(),
                    DiagnosticSeverity::Error,
                    "too-many",
                    format!("<{}> may occur at most {max} time(s)", tag.name),
                ));
            }

            let parent_name = tag
                .parent
                .and_then(|p| self.tree.get(p))
                .map(|p| p.name.as_str());
            if !field.allows_parent(parent_name) {
                out.push(Diagnostic::schema(
                    tag.range(),
                    DiagnosticSeverity::Error,
                    "invalid-parent",
                    format!(
                        "<{}> is not allowed inside {}",
                        tag.name,
                        parent_name.map_or("the top level".to_string(), |p| format!("<{p}>"))
                    ),
                ));
            }

            for key in tag.attributes.keys() {
                if !field.allows_attribute(key) {
                    out.push(Diagnostic::schema(
                        tag.range(),
                        DiagnosticSeverity::Warning,
                        "unknown-attribute",
                        format!("attribute '{key}' is not declared for <{}>", tag.name),
                    ));
                }
            }

            if matches!(field.field_type, FieldType::Group | FieldType::Flag) {
                continue;
            }
            let content = self.slice(tag.content.clone());
            let content = content.trim();
            if field.field_type == FieldType::Number && content.parse::<f64>().is_err() {
                out.push(Diagnostic::schema(
                    tag.content.clone(),
                    DiagnosticSeverity::Error,
                    "not-a-number",
                    format!("<{}> must contain a number", tag.name),
                ));
            }
            if !field.matches_pattern(content) {
                out.push(Diagnostic::schema(
                    tag.content.clone(),
                    DiagnosticSeverity::Error,
                    "pattern-mismatch",
                    format!("content of <{}> does not match its pattern", tag.name),
                ));
            }
        }

        for (field_id, field) in self.schema.fields() {
            if field.constraints.required && !occurrences.contains_key(&field_id) {
                out.push(Diagnostic::schema(
                    0..0,
                    DiagnosticSeverity::Error,
                    "missing-required",
                    format!("required element <{}> is missing", field.name),
                ));
            }
        }

        out
    }
}
