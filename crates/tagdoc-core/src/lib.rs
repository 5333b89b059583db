#![warn(missing_docs)]
//! Tagdoc Core - Headless Structured View over Tagged Text
//!
//! # Overview
//!
//! `tagdoc-core` keeps a schema-driven, offset-addressable view over a flat, human-editable
//! tagged-text document (custom `<tag>` markup with embedded `~f[...]` Latex formulas), keeps it
//! synchronized as the text is edited, and lets tooling perform reversible structural edits.
//! It does no rendering; editors, tree viewers and dialogs are expected to sit on top.
//!
//! # Core Features
//!
//! - **Partitioning**: total, never-failing classification of raw text into markup/text spans
//! - **Tag Tree**: arena-backed element tree bound to schema fields, innermost-tag offset lookup
//! - **Latex Extraction**: balanced-bracket `~f[...]` spans swapped for placeholder keys and back
//! - **Bounded Undo/Redo**: structural actions replayed from captured results, all-or-nothing on failure
//! - **Spellchecking**: hot-reloadable dictionary with acronym and alphabet filters
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DocumentSession (single writer)            │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  ActionStack         │  Dictionary / Latex  │  ← Edits / Analysis
//! ├──────────────────────┴──────────────────────┤
//! │  PositionModel (TagTree + partitions)       │  ← Structured view
//! ├─────────────────────────────────────────────┤
//! │  Partitioner                                │  ← Tokenizing
//! ├─────────────────────────────────────────────┤
//! │  Document (Rope + modification stamp)       │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use tagdoc_core::{Dictionary, DocumentSession};
//! use tagdoc_schema::Schema;
//!
//! let schema = Schema::from_yaml_str("fields:\n  - name: q\n  - name: a\n").unwrap();
//! let mut session = DocumentSession::new("<q>Сколько будет ~f[2+2]?</q>", schema);
//!
//! let q = session.find_tag_by_offset(5, 6).unwrap();
//! session.set_attribute(q, "id", "1").unwrap();
//! assert_eq!(session.document().text(), r#"<q id="1">Сколько будет ~f[2+2]?</q>"#);
//!
//! let dict = Dictionary::from_words(["сколько", "будет"]);
//! assert!(session.check_spelling(&dict).is_empty());
//!
//! session.undo().unwrap();
//! assert_eq!(session.document().text(), "<q>Сколько будет ~f[2+2]?</q>");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - rope-backed text buffer with modification stamp
//! - [`partition`] - markup partitioner
//! - [`tags`] - arena tag tree and attribute parsing
//! - [`position`] - position model (offset queries, schema validation)
//! - [`latex`] - Latex span extraction and placeholder round-trip
//! - [`actions`] - reversible actions and the bounded action stack
//! - [`spellcheck`] - dictionary service
//! - [`session`] - session facade tying the above together
//!
//! # Offsets
//!
//! All offsets are character offsets (Unicode scalar values), half-open `start..end`.

pub mod actions;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod latex;
pub mod partition;
pub mod position;
pub mod session;
pub mod spellcheck;
pub mod tags;

pub use actions::{
    Action, ActionError, ActionKind, ActionResult, ActionStack, DEFAULT_HISTORY_DEPTH,
};
pub use config::{ConfigError, SessionConfig};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use document::{Document, DocumentError};
pub use latex::{
    LatexError, PlaceholderMap, Segment, find_spans, from_placeholder_form, to_placeholder_form,
    try_from_placeholder_form,
};
pub use partition::{Partition, PartitionKind, partition, partition_at};
pub use position::PositionModel;
pub use session::{
    DocumentSession, SessionChange, SessionChangeCallback, SessionChangeType, SessionError,
};
pub use spellcheck::{Alphabet, Dictionary, DictionaryConfig, Misspelling, SpellCheckError};
pub use tags::{Attributes, Tag, TagId, TagTree};
