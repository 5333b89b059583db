//! Latex extraction
//!
//! Locates `~f[...]` formula spans inside markdown text and swaps them for placeholder keys so
//! that a markdown pipeline cannot mangle them, then splits placeholder-bearing text back into
//! plain and Latex segments.
//!
//! Span boundaries follow an asymmetric bracket rule: after the `~f[` marker every `[` raises the
//! depth, every `]` lowers it while it is positive, and the first `]` seen at depth zero closes
//! the span (inclusive). `~f[a[b]c]d` therefore yields `~f[a[b]c]`.
//!
//! ```rust
//! use tagdoc_core::latex::{Segment, from_placeholder_form, to_placeholder_form};
//!
//! let (text, map) = to_placeholder_form("x ~f[a &lt; b] y");
//! assert_eq!(text, "x $$LATEX_0LATEX_END$$ y");
//!
//! let segments = from_placeholder_form(&text, &map);
//! assert_eq!(segments[1].latex_source(), Some("~f[a < b]"));
//! ```

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::OnceLock;
use thiserror::Error;

/// Marker that opens a Latex span.
pub const LATEX_MARKER: &str = "~f[";

const KEY_PREFIX: &str = "$$LATEX_";
const KEY_SUFFIX: &str = "LATEX_END$$";

/// Entities unescaped inside captured Latex text.
const ENTITIES: [(&str, &str); 4] = [("&lt;", "<"), ("&gt;", ">"), ("&#91;", "["), ("&#93;", "]")];

/// Contract violations detected while splitting placeholder-bearing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatexError {
    /// A well-formed placeholder key has no entry in the map it was split against.
    #[error("placeholder '{0}' has no entry in the placeholder map")]
    UnmappedPlaceholder(String),
}

/// Placeholder key → original Latex source (the full `~f[...]` span, entity-unescaped).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: HashMap<String, String>,
    /// Keys that occurred literally in the source text; they are not placeholders.
    literal_keys: HashSet<String>,
}

impl PlaceholderMap {
    /// Latex source recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of recorded placeholders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no placeholder was minted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded `(key, source)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if `key` appeared verbatim in the text the map was produced from.
    pub fn is_literal(&self, key: &str) -> bool {
        self.literal_keys.contains(key)
    }
}

/// A piece of placeholder-bearing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Ordinary text, verbatim.
    PlainText(String),
    /// A placeholder and the Latex source it stands for.
    LatexText {
        /// The placeholder key as it appears in the text.
        placeholder: String,
        /// The recorded Latex source.
        source: String,
    },
}

impl Segment {
    /// The segment as it appears in the placeholder-bearing text.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::PlainText(text) => text,
            Segment::LatexText { placeholder, .. } => placeholder,
        }
    }

    /// Latex source, for Latex segments.
    pub fn latex_source(&self) -> Option<&str> {
        match self {
            Segment::PlainText(_) => None,
            Segment::LatexText { source, .. } => Some(source),
        }
    }

    /// Returns `true` for Latex segments.
    pub fn is_latex(&self) -> bool {
        matches!(self, Segment::LatexText { .. })
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\$LATEX_\d+LATEX_END\$\$").expect("valid placeholder regex"))
}

fn placeholder_key(n: usize) -> String {
    format!("{KEY_PREFIX}{n}{KEY_SUFFIX}")
}

/// Find `~f[...]` spans (character offsets, end exclusive), in order and non-overlapping.
///
/// A marker whose bracket never closes produces no span; scanning resumes after the marker.
pub fn find_spans(text: &str) -> Vec<Range<usize>> {
    let chars: Vec<char> = text.chars().collect();
    let marker: Vec<char> = LATEX_MARKER.chars().collect();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos + marker.len() <= chars.len() {
        if chars[pos..pos + marker.len()] != marker[..] {
            pos += 1;
            continue;
        }

        let body = pos + marker.len();
        match close_bracket(&chars[body..]) {
            Some(close) => {
                let end = body + close + 1;
                spans.push(pos..end);
                pos = end;
            }
            None => {
                log::debug!("unterminated Latex span at offset {pos}");
                pos = body;
            }
        }
    }

    spans
}

/// Offset of the `]` that closes the span, relative to the body start.
fn close_bracket(body: &[char]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in body.iter().enumerate() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            ']' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Unescape `&lt;`, `&gt;`, `&#91;` and `&#93;`.
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        for (entity, replacement) in ENTITIES {
            if let Some(after) = rest.strip_prefix(entity) {
                out.push_str(replacement);
                rest = after;
                continue 'scan;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// Strip the `~f[` marker and closing `]` from a span's source.
pub fn latex_body(span: &str) -> &str {
    let inner = span.strip_prefix(LATEX_MARKER).unwrap_or(span);
    inner.strip_suffix(']').unwrap_or(inner)
}

/// Replace every Latex span with a fresh placeholder key.
///
/// Counter values whose key already occurs in `text` are skipped, so a minted key never
/// collides with literal content.
pub fn to_placeholder_form(text: &str) -> (String, PlaceholderMap) {
    let mut map = PlaceholderMap {
        literal_keys: placeholder_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        ..PlaceholderMap::default()
    };

    let spans = find_spans(text);
    if spans.is_empty() {
        return (text.to_string(), map);
    }

    let mut out = String::with_capacity(text.len());
    let mut counter = 0usize;
    let byte_at: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain([text.len()])
        .collect();

    let mut last = 0;
    for span in spans {
        let (start, end) = (byte_at[span.start], byte_at[span.end]);
        out.push_str(&text[last..start]);

        let mut key = placeholder_key(counter);
        while map.literal_keys.contains(&key) {
            counter += 1;
            key = placeholder_key(counter);
        }
        counter += 1;

        out.push_str(&key);
        map.entries.insert(key, unescape_entities(&text[start..end]));
        last = end;
    }
    out.push_str(&text[last..]);

    (out, map)
}

/// Split placeholder-bearing text into plain and Latex segments.
///
/// # Panics
///
/// Panics if a placeholder key is neither in `map` nor recorded as literal content: the text
/// and the map diverged, which is a caller bug. Use [`try_from_placeholder_form`] to get an
/// error instead.
pub fn from_placeholder_form(text: &str, map: &PlaceholderMap) -> Vec<Segment> {
    match try_from_placeholder_form(text, map) {
        Ok(segments) => segments,
        Err(err) => panic!("{err}"),
    }
}

/// Fallible variant of [`from_placeholder_form`].
pub fn try_from_placeholder_form(
    text: &str,
    map: &PlaceholderMap,
) -> Result<Vec<Segment>, LatexError> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut last = 0;

    for m in placeholder_regex().find_iter(text) {
        let key = m.as_str();
        plain.push_str(&text[last..m.start()]);
        last = m.end();

        if let Some(source) = map.get(key) {
            if !plain.is_empty() {
                segments.push(Segment::PlainText(std::mem::take(&mut plain)));
            }
            segments.push(Segment::LatexText {
                placeholder: key.to_string(),
                source: source.to_string(),
            });
        } else if map.is_literal(key) {
            plain.push_str(key);
        } else {
            return Err(LatexError::UnmappedPlaceholder(key.to_string()));
        }
    }

    plain.push_str(&text[last..]);
    if !plain.is_empty() {
        segments.push(Segment::PlainText(plain));
    }
    Ok(segments)
}
