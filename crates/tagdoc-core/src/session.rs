//! Document session
//!
//! [`DocumentSession`] ties one [`Document`] to its current [`PositionModel`] and its
//! [`ActionStack`]. It is the single writer: every mutation goes through it, and every mutation
//! rebuilds the model before returning, so an offset query never sees a stale tree.
//!
//! # Example
//!
//! ```rust
//! use tagdoc_core::{DocumentSession, SessionChangeType};
//! use tagdoc_schema::Schema;
//!
//! let mut session = DocumentSession::new("<quiz></quiz>", Schema::empty());
//! session.subscribe(|change| println!("{:?}", change.change_type));
//!
//! session.import_file(6, "q1.txt", "<q>2+2?</q>").unwrap();
//! assert_eq!(session.document().text(), "<quiz><q>2+2?</q></quiz>");
//!
//! session.undo().unwrap();
//! assert_eq!(session.document().text(), "<quiz></quiz>");
//! assert!(session.has_redo());
//! ```

use crate::actions::{Action, ActionError, ActionStack};
use crate::config::SessionConfig;
use crate::diagnostics::Diagnostic;
use crate::document::{Document, DocumentError};
use crate::position::PositionModel;
use crate::spellcheck::{Dictionary, SpellCheckError};
use crate::tags::{Attributes, Tag, TagId};
use std::ops::Range;
use std::sync::Arc;
use tagdoc_schema::Schema;
use thiserror::Error;

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The tag id does not exist in the current model.
    #[error("unknown tag id {0:?}")]
    UnknownTag(TagId),
    /// An action failed to apply or reverse.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// A document edit failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What changed in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeType {
    /// Text edited out-of-band through [`DocumentSession::edit`].
    DocumentEdited,
    /// The position model was rebuilt.
    ModelRebuilt,
    /// An action was pushed, undone or redone.
    HistoryChanged,
    /// Both histories were dropped.
    HistoryInvalidated,
}

/// Change record passed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// Change type
    pub change_type: SessionChangeType,
    /// Document stamp before the change.
    pub old_stamp: u64,
    /// Document stamp after the change.
    pub new_stamp: u64,
}

/// State change callback.
pub type SessionChangeCallback = Box<dyn FnMut(&SessionChange) + Send>;

/// One editing session over a document.
pub struct DocumentSession {
    document: Document,
    schema: Arc<Schema>,
    model: Arc<PositionModel>,
    history: ActionStack,
    callbacks: Vec<SessionChangeCallback>,
}

impl DocumentSession {
    /// Create a session with default configuration.
    pub fn new(text: &str, schema: Schema) -> Self {
        Self::with_config(text, schema, &SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(text: &str, schema: Schema, config: &SessionConfig) -> Self {
        let document = Document::new(text);
        let schema = Arc::new(schema);
        let model = Arc::new(PositionModel::from_document(&document, schema.clone()));
        Self {
            document,
            schema,
            model,
            history: ActionStack::new(config.history_depth),
            callbacks: Vec::new(),
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Current model snapshot. Holding it keeps it valid after later edits.
    pub fn model(&self) -> Arc<PositionModel> {
        self.model.clone()
    }

    /// Current document stamp.
    pub fn stamp(&self) -> u64 {
        self.document.stamp()
    }

    /// Action history.
    pub fn history(&self) -> &ActionStack {
        &self.history
    }

    /// Subscribe to session changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SessionChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Edit the text out-of-band (typing, paste, another tool).
    ///
    /// The model is rebuilt and both histories are dropped, since captured results may no
    /// longer describe the text.
    pub fn edit<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        let old_stamp = self.document.stamp();
        let result = f(&mut self.document);
        if self.document.stamp() != old_stamp {
            self.notify(SessionChangeType::DocumentEdited, old_stamp);
            self.rebuild_model();
            if self.history.has_undo() || self.history.has_redo() {
                self.history.invalidate();
                self.notify(SessionChangeType::HistoryInvalidated, old_stamp);
            }
        }
        result
    }

    /// Rebuild the position model from the current text.
    pub fn rebuild_model(&mut self) {
        let old_stamp = self.model.stamp();
        self.model = Arc::new(PositionModel::from_document(&self.document, self.schema.clone()));
        self.notify(SessionChangeType::ModelRebuilt, old_stamp);
    }

    /// Innermost tag containing `[start, end)`.
    pub fn find_tag_by_offset(&self, start: usize, end: usize) -> Option<TagId> {
        self.model.find_tag_by_offset(start, end)
    }

    /// Insert externally read file content at `offset`.
    pub fn import_file(
        &mut self,
        offset: usize,
        source: &str,
        content: &str,
    ) -> Result<(), SessionError> {
        self.perform(|doc| Action::import_file(doc, offset, source, content))
    }

    /// Insert an include element for every entry of `folder`.
    pub fn include_folder(
        &mut self,
        offset: usize,
        folder: &str,
        entries: &[String],
    ) -> Result<(), SessionError> {
        self.perform(|doc| Action::include_folder(doc, offset, folder, entries))
    }

    /// Wrap `range` in a new element.
    pub fn insert_tag(
        &mut self,
        range: Range<usize>,
        name: &str,
        attributes: &Attributes,
    ) -> Result<(), SessionError> {
        self.perform(|doc| Action::insert_tag(doc, range, name, attributes))
    }

    /// Delete an element and its content.
    pub fn delete_tag(&mut self, id: TagId) -> Result<(), SessionError> {
        self.perform_on_tag(id, |doc, tag| Action::delete_tag(doc, tag))
    }

    /// Remove an element's markup, keeping its content.
    pub fn unwrap_tag(&mut self, id: TagId) -> Result<(), SessionError> {
        self.perform_on_tag(id, |doc, tag| Action::unwrap_tag(doc, tag))
    }

    /// Set an attribute on an element.
    pub fn set_attribute(&mut self, id: TagId, key: &str, value: &str) -> Result<(), SessionError> {
        self.perform_on_tag(id, |doc, tag| Action::set_attribute(doc, tag, key, value))
    }

    fn perform_on_tag<F>(&mut self, id: TagId, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Document, &Tag) -> Result<Action, ActionError>,
    {
        let model = self.model.clone();
        let tag = model.tag(id).ok_or(SessionError::UnknownTag(id))?;
        self.perform(|doc| f(doc, tag))
    }

    fn perform<F>(&mut self, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Document) -> Result<Action, ActionError>,
    {
        let old_stamp = self.document.stamp();
        let action = f(&mut self.document)?;
        log::debug!("applied '{}'", action.name());
        self.rebuild_model();
        self.history.push(action);
        self.notify(SessionChangeType::HistoryChanged, old_stamp);
        Ok(())
    }

    /// Can undo
    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    /// Can redo
    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    /// Undo the last action. Returns its name, or `None` if there was nothing to undo.
    ///
    /// On failure the history is dropped and the error returned; the text is left unchanged.
    pub fn undo(&mut self) -> Result<Option<String>, SessionError> {
        let old_stamp = self.document.stamp();
        let outcome = self.history.undo(&mut self.document);
        self.after_history_step(old_stamp, outcome)
    }

    /// Redo the last undone action. Returns its name, or `None` if there was nothing to redo.
    ///
    /// On failure the history is dropped and the error returned; the text is left unchanged.
    pub fn redo(&mut self) -> Result<Option<String>, SessionError> {
        let old_stamp = self.document.stamp();
        let outcome = self.history.redo(&mut self.document);
        self.after_history_step(old_stamp, outcome)
    }

    fn after_history_step(
        &mut self,
        old_stamp: u64,
        outcome: Result<Option<String>, ActionError>,
    ) -> Result<Option<String>, SessionError> {
        match outcome {
            Ok(Some(name)) => {
                self.rebuild_model();
                self.notify(SessionChangeType::HistoryChanged, old_stamp);
                Ok(Some(name))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.notify(SessionChangeType::HistoryInvalidated, old_stamp);
                Err(err.into())
            }
        }
    }

    /// Drop both histories.
    pub fn invalidate_history(&mut self) {
        self.history.invalidate();
        self.notify(SessionChangeType::HistoryInvalidated, self.document.stamp());
    }

    /// Spellcheck the current model.
    pub fn check_spelling(&self, dictionary: &Dictionary) -> Vec<SpellCheckError> {
        dictionary.check_document_tree(&self.model)
    }

    /// Validate the current model against the schema.
    pub fn validate(&self) -> Vec<Diagnostic> {
        self.model.validate()
    }

    fn notify(&mut self, change_type: SessionChangeType, old_stamp: u64) {
        let change = SessionChange {
            change_type,
            old_stamp,
            new_stamp: self.document.stamp(),
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
