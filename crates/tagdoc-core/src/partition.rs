//! Markup partitioner
//!
//! Scans raw text once and classifies every character into exactly one [`Partition`].
//! The scan never fails: malformed or unterminated constructs degrade to the nearest
//! recognizable kind, so the output always covers `[0, len)` contiguously.

use std::ops::Range;

/// Syntactic role of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    /// Opening tag: `<name ...>`
    Tag,
    /// Closing tag: `</name>`
    EndTag,
    /// Self-closing tag: `<name .../>`
    EmptyTag,
    /// Tag cut off by end of buffer or by a stray `<` before its `>`.
    IncompleteTag,
    /// Character data outside markup.
    Text,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>` and other `<!...>` declarations.
    Declaration,
    /// `<? ... ?>`
    ProcessingInstruction,
    /// `<![CDATA[ ... ]]>`
    CData,
}

impl PartitionKind {
    /// Returns `true` for the kinds that open, close or complete an element.
    pub fn is_tag(self) -> bool {
        matches!(
            self,
            PartitionKind::Tag
                | PartitionKind::EndTag
                | PartitionKind::EmptyTag
                | PartitionKind::IncompleteTag
        )
    }
}

/// A classified span of text (character offsets, half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Syntactic role.
    pub kind: PartitionKind,
}

impl Partition {
    /// Create a partition.
    pub fn new(start: usize, end: usize, kind: PartitionKind) -> Self {
        Self { start, end, kind }
    }

    /// The partition as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Partitions are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `offset` falls inside the partition.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Partition `text` into a contiguous sequence of classified spans.
///
/// The empty string yields an empty sequence.
pub fn partition(text: &str) -> Vec<Partition> {
    let chars: Vec<char> = text.chars().collect();
    partition_chars(&chars)
}

/// Same as [`partition`], over pre-collected characters.
pub fn partition_chars(chars: &[char]) -> Vec<Partition> {
    let mut scanner = Scanner {
        chars,
        out: Vec::new(),
    };
    scanner.run();
    scanner.out
}

/// Binary search for the partition containing `offset`.
pub fn partition_at(partitions: &[Partition], offset: usize) -> Option<&Partition> {
    let idx = partitions.partition_point(|p| p.end <= offset);
    partitions.get(idx).filter(|p| p.contains(offset))
}

struct Scanner<'a> {
    chars: &'a [char],
    out: Vec<Partition>,
}

impl Scanner<'_> {
    fn run(&mut self) {
        let mut pos = 0;
        while pos < self.chars.len() {
            let (end, kind) = if self.chars[pos] == '<' {
                self.scan_markup(pos)
            } else {
                (self.scan_text(pos), PartitionKind::Text)
            };
            self.emit(pos, end, kind);
            pos = end;
        }
    }

    fn emit(&mut self, start: usize, end: usize, kind: PartitionKind) {
        debug_assert!(start < end);
        if kind == PartitionKind::Text
            && let Some(last) = self.out.last_mut()
            && last.kind == PartitionKind::Text
            && last.end == start
        {
            last.end = end;
            return;
        }
        self.out.push(Partition::new(start, end, kind));
    }

    fn scan_text(&self, start: usize) -> usize {
        self.chars[start..]
            .iter()
            .position(|&c| c == '<')
            .map_or(self.chars.len(), |i| start + i)
    }

    /// `pos` points at a `<`.
    fn scan_markup(&self, pos: usize) -> (usize, PartitionKind) {
        let rest = &self.chars[pos..];
        if starts_with(rest, "<!--") {
            return (self.find_after(pos + 4, "-->"), PartitionKind::Comment);
        }
        if starts_with(rest, "<![CDATA[") {
            return (self.find_after(pos + 9, "]]>"), PartitionKind::CData);
        }
        if starts_with(rest, "<!") {
            return (self.scan_declaration(pos + 2), PartitionKind::Declaration);
        }
        if starts_with(rest, "<?") {
            return (
                self.find_after(pos + 2, "?>"),
                PartitionKind::ProcessingInstruction,
            );
        }
        if starts_with(rest, "</") {
            return self.scan_tag(pos, pos + 2, true);
        }
        match rest.get(1) {
            Some(&c) if is_name_start(c) => self.scan_tag(pos, pos + 1, false),
            // A lone `<` is plain text; consume up to the next `<`.
            _ => (self.scan_text(pos + 1), PartitionKind::Text),
        }
    }

    /// End offset just past `terminator`, or end of buffer.
    fn find_after(&self, from: usize, terminator: &str) -> usize {
        let needle: Vec<char> = terminator.chars().collect();
        let mut i = from;
        while i + needle.len() <= self.chars.len() {
            if self.chars[i..i + needle.len()] == needle[..] {
                return i + needle.len();
            }
            i += 1;
        }
        self.chars.len()
    }

    fn scan_declaration(&self, from: usize) -> usize {
        let mut depth = 0usize;
        for (i, &c) in self.chars.iter().enumerate().skip(from) {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => return i + 1,
                _ => {}
            }
        }
        self.chars.len()
    }

    fn scan_tag(&self, start: usize, from: usize, closing: bool) -> (usize, PartitionKind) {
        let mut quote: Option<char> = None;
        let mut i = from;
        while i < self.chars.len() {
            let c = self.chars[i];
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '"' | '\'' => quote = Some(c),
                    '<' => return (i, PartitionKind::IncompleteTag),
                    '>' => {
                        let kind = if closing {
                            PartitionKind::EndTag
                        } else if i > start + 1 && self.chars[i - 1] == '/' {
                            PartitionKind::EmptyTag
                        } else {
                            PartitionKind::Tag
                        };
                        return (i + 1, kind);
                    }
                    _ => {}
                },
            }
            i += 1;
        }
        (self.chars.len(), PartitionKind::IncompleteTag)
    }
}

fn starts_with(chars: &[char], prefix: &str) -> bool {
    let mut it = chars.iter();
    prefix.chars().all(|p| it.next() == Some(&p))
}

pub(crate) fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// Returns `true` if `name` scans back as a single element or attribute name.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}
