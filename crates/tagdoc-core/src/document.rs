//! Document buffer
//!
//! A rope-backed character buffer plus a modification stamp. Every successful mutation bumps the
//! stamp, which is how the position model detects that it was built from an older text.
//!
//! All offsets are character offsets (Unicode scalar values), half-open `start..end`.

use ropey::Rope;
use std::ops::Range;
use thiserror::Error;

/// Errors returned by [`Document`] mutations and slices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Offset past the end of the document.
    #[error("invalid offset: {0}")]
    InvalidOffset(usize),
    /// Range reversed or past the end of the document.
    #[error("invalid range: {start}..{end}")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },
}

/// Owned, mutable text buffer with a modification stamp.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
    stamp: u64,
}

impl Document {
    /// Create a document from initial text (stamp `0`).
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            stamp: 0,
        }
    }

    /// Full text as a `String`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` for an empty document.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Current modification stamp.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Copy of the text in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<String, DocumentError> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).to_string())
    }

    /// Returns `true` if the text at `offset` is exactly `expected`.
    pub fn matches_at(&self, offset: usize, expected: &str) -> bool {
        let end = offset + expected.chars().count();
        end <= self.len_chars() && self.rope.slice(offset..end) == expected
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        if offset > self.len_chars() {
            return Err(DocumentError::InvalidOffset(offset));
        }
        if text.is_empty() {
            return Ok(());
        }
        self.rope.insert(offset, text);
        self.bump();
        Ok(())
    }

    /// Remove the text in `range`, returning it.
    pub fn remove(&mut self, range: Range<usize>) -> Result<String, DocumentError> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(String::new());
        }
        let removed = self.rope.slice(range.clone()).to_string();
        self.rope.remove(range);
        self.bump();
        Ok(removed)
    }

    /// Replace the text in `range` with `text`, returning the replaced text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<String, DocumentError> {
        self.check_range(&range)?;
        let removed = self.rope.slice(range.clone()).to_string();
        self.rope.remove(range.clone());
        self.rope.insert(range.start, text);
        self.bump();
        Ok(removed)
    }

    /// Replace the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.bump();
    }

    /// Convert a character offset to a zero-based `(line, column)` pair.
    pub fn offset_to_line_col(&self, offset: usize) -> Result<(usize, usize), DocumentError> {
        if offset > self.len_chars() {
            return Err(DocumentError::InvalidOffset(offset));
        }
        let line = self.rope.char_to_line(offset);
        Ok((line, offset - self.rope.line_to_char(line)))
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(DocumentError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.stamp += 1;
    }
}
