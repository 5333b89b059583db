//! Dictionary-backed spellchecking
//!
//! [`Dictionary`] is a caller-owned service: the host constructs it from a
//! [`DictionaryConfig`], calls [`Dictionary::refresh_if_stale`] at the start of each check cycle,
//! then checks plain text or a whole [`PositionModel`].
//!
//! A word is flagged when it is
//!
//! - not in the dictionary (case-insensitive),
//! - not entirely uppercase (acronyms are exempt),
//! - made only of letters of the configured [`Alphabet`].
//!
//! ```rust
//! use tagdoc_core::Dictionary;
//!
//! let dict = Dictionary::from_words(["тест"]);
//! let flagged = dict.check_text("Тест ТЕСТ тест тестт");
//! assert_eq!(flagged.len(), 1);
//! assert_eq!(flagged[0].word, "тестт");
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::latex::find_spans;
use crate::position::PositionModel;
use crate::tags::TagId;
use serde::Deserialize;
use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use unicode_segmentation::UnicodeSegmentation;

/// Letters a word must consist of to be checked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    /// Cyrillic letters (U+0400..U+052F).
    #[default]
    Cyrillic,
    /// ASCII Latin letters.
    Latin,
    /// Any alphabetic character.
    Any,
}

impl Alphabet {
    /// Returns `true` if `c` belongs to the alphabet.
    pub fn contains(self, c: char) -> bool {
        match self {
            Alphabet::Cyrillic => matches!(c, '\u{0400}'..='\u{052F}') && c.is_alphabetic(),
            Alphabet::Latin => c.is_ascii_alphabetic(),
            Alphabet::Any => c.is_alphabetic(),
        }
    }
}

/// Where the dictionary comes from and which words it judges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Word list file; `None` means an empty dictionary.
    pub path: Option<PathBuf>,
    /// Target alphabet.
    pub alphabet: Alphabet,
}

/// A flagged word in checked text (character offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    /// Offset of the word.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// The word as written.
    pub word: String,
}

impl Misspelling {
    /// Range of the word.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// A flagged word in a document tree, with the element it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellCheckError {
    /// The word, with absolute document offsets.
    pub misspelling: Misspelling,
    /// Innermost element containing the word; `None` for top-level text.
    pub tag: Option<TagId>,
}

impl SpellCheckError {
    /// Convert to a diagnostic for hosts that show spelling alongside other problems.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            range: self.misspelling.range(),
            severity: DiagnosticSeverity::Information,
            code: "spelling",
            source: "tagdoc-spell",
            message: format!("Unknown word: {}", self.misspelling.word),
        }
    }
}

/// Hot-reloadable word list.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    config: DictionaryConfig,
    words: HashSet<String>,
    loaded: bool,
    cached_path: Option<PathBuf>,
    cached_modified: Option<SystemTime>,
}

impl Dictionary {
    /// Create a dictionary for `config`. Nothing is read until the first
    /// [`Dictionary::refresh_if_stale`].
    pub fn new(config: DictionaryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// In-memory dictionary with the default alphabet; never reloads.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
            loaded: true,
            ..Self::default()
        }
    }

    /// Replace the target alphabet.
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.config.alphabet = alphabet;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Point the dictionary at another file (or none). Takes effect on the next refresh.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.config.path = path;
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if no word is known.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Reload the word list if the configured path or its modification time changed.
    ///
    /// Returns `true` if the word list was replaced. An unset or missing path yields an empty
    /// dictionary; a file that exists but cannot be read keeps the previous words.
    pub fn refresh_if_stale(&mut self) -> bool {
        let path = self.config.path.clone();
        let modified = path.as_deref().and_then(modified_time);

        if self.loaded && self.cached_path == path && self.cached_modified == modified {
            return false;
        }

        let words = match (&path, modified) {
            (Some(path), Some(_)) => match read_words(path) {
                Ok(words) => {
                    log::info!("loaded {} words from {}", words.len(), path.display());
                    words
                }
                Err(err) => {
                    log::warn!("failed to read dictionary {}: {err}", path.display());
                    return false;
                }
            },
            (Some(path), None) => {
                log::info!("dictionary {} not found, using empty word list", path.display());
                HashSet::new()
            }
            (None, _) => HashSet::new(),
        };

        self.words = words;
        self.loaded = true;
        self.cached_path = path;
        self.cached_modified = modified;
        true
    }

    /// Flag unknown words in `text`. Offsets are relative to `text`, in characters.
    pub fn check_text(&self, text: &str) -> Vec<Misspelling> {
        let mut out = Vec::new();
        let mut char_offset = 0;
        let mut byte_offset = 0;

        for (byte, word) in text.split_word_bound_indices() {
            char_offset += text[byte_offset..byte].chars().count();
            byte_offset = byte;

            if self.is_misspelled(word) {
                out.push(Misspelling {
                    offset: char_offset,
                    length: word.chars().count(),
                    word: word.to_string(),
                });
            }
        }
        out
    }

    fn is_misspelled(&self, word: &str) -> bool {
        if !word.chars().any(char::is_alphabetic) {
            return false;
        }
        if !word.chars().all(|c| self.config.alphabet.contains(c)) {
            return false;
        }
        if word.chars().all(|c| !c.is_lowercase()) {
            return false;
        }
        !self.contains(word)
    }

    /// Walk the model's tree and check every text run, skipping `~f[...]` Latex spans.
    ///
    /// Offsets in the result are absolute document offsets.
    pub fn check_document_tree(&self, model: &PositionModel) -> Vec<SpellCheckError> {
        let mut out = Vec::new();
        for run in model.tree().top_level_text() {
            self.check_run(model, run.clone(), None, &mut out);
        }
        for &root in model.roots() {
            self.check_tag(model, root, &mut out);
        }
        out.sort_by_key(|e| e.misspelling.offset);
        out
    }

    fn check_tag(&self, model: &PositionModel, id: TagId, out: &mut Vec<SpellCheckError>) {
        let Some(tag) = model.tag(id) else {
            return;
        };
        for run in &tag.text_runs {
            self.check_run(model, run.clone(), Some(id), out);
        }
        for &child in &tag.children {
            self.check_tag(model, child, out);
        }
    }

    fn check_run(
        &self,
        model: &PositionModel,
        run: Range<usize>,
        tag: Option<TagId>,
        out: &mut Vec<SpellCheckError>,
    ) {
        let text = model.slice(run.clone());
        let formulas = find_spans(&text);
        for mut misspelling in self.check_text(&text) {
            let inside_formula = formulas
                .iter()
                .any(|f| f.start <= misspelling.offset && misspelling.offset < f.end);
            if inside_formula {
                continue;
            }
            misspelling.offset += run.start;
            out.push(SpellCheckError { misspelling, tag });
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// One word per line. Blank lines and `#` comments are skipped, as are a leading numeric
/// count line and hunspell-style `/FLAGS` suffixes.
fn read_words(path: &Path) -> std::io::Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_word_list(&content))
}

fn parse_word_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(i, line)| {
            !line.is_empty()
                && !line.starts_with('#')
                && !(*i == 0 && line.chars().all(|c| c.is_ascii_digit()))
        })
        .filter_map(|(_, line)| line.split('/').next())
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}
