//! Reversible structural actions
//!
//! Every structural operation is captured as an [`Action`]: a display name, the operation kind,
//! and an [`ActionResult`] holding exactly the text and offsets needed to reverse it and to
//! re-apply it. Undo and redo work from the captured result alone, never from ambient state,
//! and verify the document before touching it so a failed reversal leaves the text unchanged.
//!
//! [`ActionStack`] keeps two bounded histories (default depth [`DEFAULT_HISTORY_DEPTH`]). When a
//! reversal fails, both histories are dropped: a partially valid history is never kept.

use crate::document::{Document, DocumentError};
use crate::partition::is_valid_name;
use crate::tags::{Attributes, Tag, escape_attribute};
use std::collections::VecDeque;
use std::ops::Range;
use thiserror::Error;

/// Default undo/redo depth.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Errors produced while applying or reversing an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The text an action expects to find is no longer where its result says.
    #[error("action '{action}' target is gone: expected {expected:?} at offset {offset}")]
    TargetMissing {
        /// Action name.
        action: String,
        /// Offset the action points at.
        offset: usize,
        /// Text expected there.
        expected: String,
    },
    /// Forward application failed on the document.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// An element name or attribute key that would not re-parse as written.
    #[error("invalid element or attribute name: {0:?}")]
    InvalidName(String),
    /// The operation has nothing to do (e.g. an empty folder listing).
    #[error("nothing to apply: {0}")]
    Empty(&'static str),
}

/// Kind of structural operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Content of an external file inserted at an offset.
    ImportFile {
        /// Source the content was read from (host-defined).
        source: String,
    },
    /// One `<include src=".."/>` element inserted per folder entry.
    IncludeFolder {
        /// Folder the entries belong to.
        folder: String,
        /// Number of include elements inserted.
        entries: usize,
    },
    /// A range wrapped in a new element.
    InsertTag {
        /// Element name.
        name: String,
    },
    /// An element removed with its content.
    DeleteTag {
        /// Element name.
        name: String,
    },
    /// An element's markup removed, content kept.
    UnwrapTag {
        /// Element name.
        name: String,
    },
    /// An attribute set on an element's opening tag.
    SetAttribute {
        /// Element name.
        name: String,
        /// Attribute key.
        key: String,
    },
}

/// Captured state of one applied action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// `text` was inserted at `offset`.
    Inserted {
        /// Insertion offset.
        offset: usize,
        /// Inserted text.
        text: String,
    },
    /// `text` was removed from `offset`.
    Removed {
        /// Removal offset.
        offset: usize,
        /// Removed text.
        text: String,
    },
    /// `old` at `offset` was replaced with `new`.
    Replaced {
        /// Replacement offset.
        offset: usize,
        /// Text before the action.
        old: String,
        /// Text after the action.
        new: String,
    },
}

/// A reversible structural operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    kind: ActionKind,
    result: ActionResult,
}

impl Action {
    /// Display name (e.g. for "Undo <name>" menu entries).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operation kind.
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Captured result.
    pub fn result(&self) -> &ActionResult {
        &self.result
    }

    /// Insert externally provided file content at `offset`.
    pub fn import_file(
        doc: &mut Document,
        offset: usize,
        source: &str,
        content: &str,
    ) -> Result<Self, ActionError> {
        if content.is_empty() {
            return Err(ActionError::Empty("imported content is empty"));
        }
        doc.insert(offset, content)?;
        Ok(Self {
            name: format!("Import {source}"),
            kind: ActionKind::ImportFile {
                source: source.to_string(),
            },
            result: ActionResult::Inserted {
                offset,
                text: content.to_string(),
            },
        })
    }

    /// Insert one `<include src="folder/entry"/>` line per entry at `offset`.
    pub fn include_folder(
        doc: &mut Document,
        offset: usize,
        folder: &str,
        entries: &[String],
    ) -> Result<Self, ActionError> {
        if entries.is_empty() {
            return Err(ActionError::Empty("folder has no entries"));
        }
        let folder = folder.trim_end_matches('/');
        let text: String = entries
            .iter()
            .map(|entry| {
                let mut attrs = Attributes::new();
                attrs.insert("src".to_string(), format!("{folder}/{entry}"));
                format!("{}\n", render_start_tag("include", &attrs, true))
            })
            .collect();
        doc.insert(offset, &text)?;
        Ok(Self {
            name: format!("Include {folder}"),
            kind: ActionKind::IncludeFolder {
                folder: folder.to_string(),
                entries: entries.len(),
            },
            result: ActionResult::Inserted { offset, text },
        })
    }

    /// Wrap `range` in a new `<name ...>` element.
    pub fn insert_tag(
        doc: &mut Document,
        range: Range<usize>,
        name: &str,
        attributes: &Attributes,
    ) -> Result<Self, ActionError> {
        check_name(name)?;
        for key in attributes.keys() {
            check_name(key)?;
        }
        let old = doc.slice(range.clone())?;
        let new = format!(
            "{}{old}</{name}>",
            render_start_tag(name, attributes, false)
        );
        doc.replace(range.clone(), &new)?;
        Ok(Self {
            name: format!("Insert <{name}>"),
            kind: ActionKind::InsertTag {
                name: name.to_string(),
            },
            result: ActionResult::Replaced {
                offset: range.start,
                old,
                new,
            },
        })
    }

    /// Remove `tag` together with its content.
    pub fn delete_tag(doc: &mut Document, tag: &Tag) -> Result<Self, ActionError> {
        let text = doc.remove(tag.range())?;
        Ok(Self {
            name: format!("Delete <{}>", tag.name),
            kind: ActionKind::DeleteTag {
                name: tag.name.clone(),
            },
            result: ActionResult::Removed {
                offset: tag.start,
                text,
            },
        })
    }

    /// Remove `tag`'s markup, keeping its content.
    pub fn unwrap_tag(doc: &mut Document, tag: &Tag) -> Result<Self, ActionError> {
        let new = doc.slice(tag.content.clone())?;
        let old = doc.replace(tag.range(), &new)?;
        Ok(Self {
            name: format!("Unwrap <{}>", tag.name),
            kind: ActionKind::UnwrapTag {
                name: tag.name.clone(),
            },
            result: ActionResult::Replaced {
                offset: tag.start,
                old,
                new,
            },
        })
    }

    /// Set (or add) attribute `key` on `tag`'s opening tag.
    pub fn set_attribute(
        doc: &mut Document,
        tag: &Tag,
        key: &str,
        value: &str,
    ) -> Result<Self, ActionError> {
        check_name(key)?;
        let open = tag.start..tag.content.start;
        let mut attributes = tag.attributes.clone();
        attributes.insert(key.to_string(), value.to_string());
        let new = render_start_tag(&tag.name, &attributes, tag.empty);
        let old = doc.replace(open, &new)?;
        Ok(Self {
            name: format!("Set {key} on <{}>", tag.name),
            kind: ActionKind::SetAttribute {
                name: tag.name.clone(),
                key: key.to_string(),
            },
            result: ActionResult::Replaced {
                offset: tag.start,
                old,
                new,
            },
        })
    }

    /// Reverse the action using only its captured result.
    pub fn undo(&self, doc: &mut Document) -> Result<(), ActionError> {
        match &self.result {
            ActionResult::Inserted { offset, text } => {
                self.expect_text(doc, *offset, text)?;
                doc.remove(*offset..*offset + text.chars().count())?;
            }
            ActionResult::Removed { offset, text } => {
                self.expect_offset(doc, *offset)?;
                doc.insert(*offset, text)?;
            }
            ActionResult::Replaced { offset, old, new } => {
                self.expect_text(doc, *offset, new)?;
                doc.replace(*offset..*offset + new.chars().count(), old)?;
            }
        }
        Ok(())
    }

    /// Re-apply the action using only its captured result.
    pub fn redo(&self, doc: &mut Document) -> Result<(), ActionError> {
        match &self.result {
            ActionResult::Inserted { offset, text } => {
                self.expect_offset(doc, *offset)?;
                doc.insert(*offset, text)?;
            }
            ActionResult::Removed { offset, text } => {
                self.expect_text(doc, *offset, text)?;
                doc.remove(*offset..*offset + text.chars().count())?;
            }
            ActionResult::Replaced { offset, old, new } => {
                self.expect_text(doc, *offset, old)?;
                doc.replace(*offset..*offset + old.chars().count(), new)?;
            }
        }
        Ok(())
    }

    fn expect_text(&self, doc: &Document, offset: usize, expected: &str) -> Result<(), ActionError> {
        if doc.matches_at(offset, expected) {
            Ok(())
        } else {
            Err(self.target_missing(offset, expected))
        }
    }

    fn expect_offset(&self, doc: &Document, offset: usize) -> Result<(), ActionError> {
        if offset <= doc.len_chars() {
            Ok(())
        } else {
            Err(self.target_missing(offset, ""))
        }
    }

    fn target_missing(&self, offset: usize, expected: &str) -> ActionError {
        ActionError::TargetMissing {
            action: self.name.clone(),
            offset,
            expected: expected.to_string(),
        }
    }
}

fn check_name(name: &str) -> Result<(), ActionError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ActionError::InvalidName(name.to_string()))
    }
}

/// Render `<name a="v"...>` (or `.../>`), escaping `&` and `"` in values.
pub(crate) fn render_start_tag(name: &str, attributes: &Attributes, empty: bool) -> String {
    let mut out = format!("<{name}");
    for (key, value) in attributes {
        out.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
    }
    out.push_str(if empty { "/>" } else { ">" });
    out
}

/// Two bounded histories of applied actions.
#[derive(Debug, Clone)]
pub struct ActionStack {
    undo_stack: VecDeque<Action>,
    redo_stack: VecDeque<Action>,
    max_depth: usize,
}

impl Default for ActionStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl ActionStack {
    /// Create a stack keeping at most `max_depth` entries per history (minimum 1).
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Maximum depth of each history.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Record an applied action. Clears the redo history; evicts the oldest entry when full.
    pub fn push(&mut self, action: Action) {
        self.redo_stack.clear();
        Self::push_bounded(&mut self.undo_stack, action, self.max_depth);
    }

    fn push_bounded(stack: &mut VecDeque<Action>, action: Action, max_depth: usize) {
        stack.push_back(action);
        while stack.len() > max_depth {
            stack.pop_front();
        }
    }

    /// Undo the most recent action. Returns its name, or `None` if there is nothing to undo.
    ///
    /// On failure both histories are cleared and the error is returned.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<String>, ActionError> {
        let Some(action) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(err) = action.undo(doc) {
            log::warn!("undo of '{}' failed, dropping history: {err}", action.name());
            self.invalidate();
            return Err(err);
        }
        let name = action.name().to_string();
        Self::push_bounded(&mut self.redo_stack, action, self.max_depth);
        Ok(Some(name))
    }

    /// Redo the most recently undone action. Returns its name, or `None` if there is nothing
    /// to redo.
    ///
    /// On failure both histories are cleared and the error is returned.
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<String>, ActionError> {
        let Some(action) = self.redo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(err) = action.redo(doc) {
            log::warn!("redo of '{}' failed, dropping history: {err}", action.name());
            self.invalidate();
            return Err(err);
        }
        let name = action.name().to_string();
        Self::push_bounded(&mut self.undo_stack, action, self.max_depth);
        Ok(Some(name))
    }

    /// Drop both histories.
    pub fn invalidate(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Can undo
    pub fn has_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo
    pub fn has_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo history depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo history depth.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Name of the action [`ActionStack::undo`] would reverse.
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.back().map(Action::name)
    }

    /// Name of the action [`ActionStack::redo`] would re-apply.
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.back().map(Action::name)
    }

    /// Undo history, oldest first.
    pub fn undo_actions(&self) -> impl Iterator<Item = &Action> {
        self.undo_stack.iter()
    }
}
