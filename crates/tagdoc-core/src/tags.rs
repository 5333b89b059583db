//! Tag tree
//!
//! Builds an arena of [`Tag`] nodes from a partition sequence. Parents are stored as arena
//! indices ([`TagId`]) so the tree has no ownership cycles and parent lookup is O(1).
//!
//! Construction is stack-based and never fails:
//!
//! - an opening tag pushes a node, a self-closing tag adds a closed leaf;
//! - an end tag closes the nearest open node with the same name, implicitly closing anything
//!   opened after it (those nodes are marked `closed == false`);
//! - an end tag matching nothing, and incomplete tags, are ignored;
//! - nodes still open at end of buffer extend to the end of the text.

use crate::partition::{Partition, PartitionKind, is_name_char, is_name_start};
use indexmap::IndexMap;
use std::ops::Range;
use tagdoc_schema::{FieldId, Schema};

/// Index of a tag in its [`TagTree`] arena. Ids follow document order of the opening tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagId(pub usize);

/// Attributes in source order.
pub type Attributes = IndexMap<String, String>;

/// One structural element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Element name.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Attributes,
    /// Offset of the opening `<`.
    pub start: usize,
    /// Offset just past the closing tag (or the end of the implicit close).
    pub end: usize,
    /// Content between the opening and closing tag. Empty for self-closing tags.
    pub content: Range<usize>,
    /// Children in document order.
    pub children: Vec<TagId>,
    /// Enclosing tag, `None` at top level.
    pub parent: Option<TagId>,
    /// Schema field whose name equals the tag name.
    pub field: Option<FieldId>,
    /// `false` when the element was closed implicitly or never closed.
    pub closed: bool,
    /// Self-closing (`<name/>`).
    pub empty: bool,
    /// Text partitions directly inside this element (not inside children).
    pub text_runs: Vec<Range<usize>>,
}

impl Tag {
    /// Full element range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns `true` if `[start, end)` lies within the element.
    pub fn contains_range(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Arena-backed tree of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTree {
    nodes: Vec<Tag>,
    roots: Vec<TagId>,
    top_level_text: Vec<Range<usize>>,
}

impl TagTree {
    /// Build the tree for `chars` from its partitions, binding tags to `schema` fields by name.
    pub fn build(chars: &[char], partitions: &[Partition], schema: &Schema) -> Self {
        let mut tree = TagTree::default();
        let mut open: Vec<TagId> = Vec::new();

        for p in partitions {
            match p.kind {
                PartitionKind::Tag | PartitionKind::EmptyTag => {
                    let Some((name, attributes)) = parse_start_tag(&chars[p.start..p.end]) else {
                        continue;
                    };
                    let empty = p.kind == PartitionKind::EmptyTag;
                    let id = tree.push_node(Tag {
                        field: schema.field(&name).map(|(id, _)| id),
                        name,
                        attributes,
                        start: p.start,
                        end: p.end,
                        content: p.end..p.end,
                        children: Vec::new(),
                        parent: open.last().copied(),
                        closed: empty,
                        empty,
                        text_runs: Vec::new(),
                    });
                    if !empty {
                        open.push(id);
                    }
                }
                PartitionKind::EndTag => {
                    let name = parse_end_tag(&chars[p.start..p.end]);
                    let Some(depth) = open.iter().rposition(|id| tree.nodes[id.0].name == name)
                    else {
                        continue;
                    };
                    // Implicitly close everything opened after the match.
                    for id in open.drain(depth + 1..) {
                        let node = &mut tree.nodes[id.0];
                        node.end = p.start;
                        node.content.end = p.start;
                    }
                    if let Some(id) = open.pop() {
                        let node = &mut tree.nodes[id.0];
                        node.end = p.end;
                        node.content.end = p.start;
                        node.closed = true;
                    }
                }
                PartitionKind::Text => match open.last() {
                    Some(id) => tree.nodes[id.0].text_runs.push(p.range()),
                    None => tree.top_level_text.push(p.range()),
                },
                _ => {}
            }
        }

        let len = chars.len();
        for id in open {
            let node = &mut tree.nodes[id.0];
            node.end = len;
            node.content.end = len;
        }

        tree
    }

    fn push_node(&mut self, tag: Tag) -> TagId {
        let id = TagId(self.nodes.len());
        match tag.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(tag);
        id
    }

    /// Top-level tags in document order.
    pub fn roots(&self) -> &[TagId] {
        &self.roots
    }

    /// Text partitions outside any element.
    pub fn top_level_text(&self) -> &[Range<usize>] {
        &self.top_level_text
    }

    /// Tag by id.
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.nodes.get(id.0)
    }

    /// Parent of a tag.
    pub fn parent(&self, id: TagId) -> Option<TagId> {
        self.get(id)?.parent
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: TagId) -> impl Iterator<Item = TagId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Nesting depth (`0` for roots).
    pub fn depth(&self, id: TagId) -> usize {
        self.ancestors(id).count()
    }

    /// All tags in document order.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> {
        self.nodes.iter().enumerate().map(|(i, t)| (TagId(i), t))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no tags.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Innermost tag whose range fully contains `[start, end)`.
    ///
    /// Adjacent siblings that both contain a zero-width query resolve to the first one.
    pub fn find_by_offset(&self, start: usize, end: usize) -> Option<TagId> {
        if start > end {
            return None;
        }
        let mut found = None;
        let mut level = self.roots.as_slice();
        while let Some(id) = self.find_in_level(level, start, end) {
            found = Some(id);
            level = &self.nodes[id.0].children;
        }
        found
    }

    fn find_in_level(&self, level: &[TagId], start: usize, end: usize) -> Option<TagId> {
        // Siblings are sorted and non-overlapping: only the first one ending at or after `end`
        // can contain the query.
        let idx = level.partition_point(|id| self.nodes[id.0].end < end);
        level
            .get(idx)
            .copied()
            .filter(|id| self.nodes[id.0].contains_range(start, end))
    }
}

/// Parse `<name attr="v" ...>` / `<name .../>` into a name and ordered attributes.
pub(crate) fn parse_start_tag(chars: &[char]) -> Option<(String, Attributes)> {
    let mut i = 1;
    if !chars.get(i).copied().is_some_and(is_name_start) {
        return None;
    }
    let name = read_name(chars, &mut i);
    let mut attributes = Attributes::new();

    loop {
        skip_ws(chars, &mut i);
        match chars.get(i) {
            None | Some('>') => break,
            Some('/') => {
                i += 1;
                continue;
            }
            Some(&c) if is_name_start(c) => {
                let key = read_name(chars, &mut i);
                skip_ws(chars, &mut i);
                let value = if chars.get(i) == Some(&'=') {
                    i += 1;
                    skip_ws(chars, &mut i);
                    unescape_attribute(&read_value(chars, &mut i))
                } else {
                    String::new()
                };
                attributes.entry(key).or_insert(value);
            }
            Some(_) => i += 1,
        }
    }

    Some((name, attributes))
}

fn parse_end_tag(chars: &[char]) -> String {
    let mut i = 2;
    skip_ws(chars, &mut i);
    read_name(chars, &mut i)
}

fn read_name(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while chars.get(*i).copied().is_some_and(is_name_char) {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

fn read_value(chars: &[char], i: &mut usize) -> String {
    match chars.get(*i) {
        Some(&q @ ('"' | '\'')) => {
            *i += 1;
            let start = *i;
            while chars.get(*i).is_some_and(|&c| c != q) {
                *i += 1;
            }
            let value = chars[start..*i].iter().collect();
            if *i < chars.len() {
                *i += 1;
            }
            value
        }
        _ => {
            let start = *i;
            while chars
                .get(*i)
                .is_some_and(|&c| !c.is_whitespace() && c != '>' && c != '/')
            {
                *i += 1;
            }
            chars[start..*i].iter().collect()
        }
    }
}

/// Entities recognized in attribute values; `&` is last so `&amp;quot;` stays literal.
const ATTRIBUTE_ENTITIES: [(&str, char); 5] = [
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
];

/// Decode attribute entities in one pass. Unknown `&` sequences are kept verbatim.
pub(crate) fn unescape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    'scan: while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        for (entity, replacement) in ATTRIBUTE_ENTITIES {
            if let Some(after) = rest.strip_prefix(entity) {
                out.push(replacement);
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

/// Encode a value for a double-quoted attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn skip_ws(chars: &[char], i: &mut usize) {
    while chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_parse_start_tag_attribute_forms() {
        let (name, attrs) =
            parse_start_tag(&chars(r#"<item a="1" b='two' c=3 d e = "x y"/>"#)).unwrap();
        assert_eq!(name, "item");
        let pairs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("a", "1"), ("b", "two"), ("c", "3"), ("d", ""), ("e", "x y")]
        );
    }

    #[test]
    fn test_parse_start_tag_keeps_first_duplicate() {
        let (_, attrs) = parse_start_tag(&chars(r#"<a k="1" k="2">"#)).unwrap();
        assert_eq!(attrs.get("k").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_attribute_entities() {
        let (_, attrs) =
            parse_start_tag(&chars(r#"<a t="a&quot;b" u='it&apos;s &amp;quot;' v="x & y">"#))
                .unwrap();
        assert_eq!(attrs.get("t").map(String::as_str), Some("a\"b"));
        assert_eq!(attrs.get("u").map(String::as_str), Some("it's &quot;"));
        assert_eq!(attrs.get("v").map(String::as_str), Some("x & y"));
    }

    #[test]
    fn test_escape_then_unescape_is_identity() {
        for value in ["a\"b", "&quot;", "x & y", "&amp;&", "<tag>", ""] {
            assert_eq!(unescape_attribute(&escape_attribute(value)), value);
        }
    }

    #[test]
    fn test_parse_end_tag() {
        assert_eq!(parse_end_tag(&chars("</ name >")), "name");
        assert_eq!(parse_end_tag(&chars("</a>")), "a");
    }
}
