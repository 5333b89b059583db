use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tagdoc_core::latex::{latex_body, unescape_entities};
use tagdoc_core::{
    LatexError, PlaceholderMap, Segment, find_spans, from_placeholder_form, to_placeholder_form,
    try_from_placeholder_form,
};

fn rejoin(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.latex_source().unwrap_or(s.as_str()))
        .collect()
}

#[test]
fn test_span_boundaries() {
    assert_eq!(find_spans("~f[a[b]c]d"), vec![0..9]);
    assert_eq!(find_spans("x~f[1]y~f[[2]]z"), vec![1..6, 7..14]);
    assert_eq!(find_spans("~f[[a][b]]"), vec![0..10]);
    assert_eq!(find_spans("~f[]"), vec![0..4]);
    assert!(find_spans("no formulas [here]").is_empty());
}

#[test]
fn test_unterminated_marker_yields_no_span() {
    assert!(find_spans("~f[a[b").is_empty());
    // The second marker is inside the unterminated first one and still closes.
    assert_eq!(find_spans("~f[a ~f[b]"), vec![5..10]);
}

#[test]
fn test_spans_are_character_offsets() {
    let text = "Ответ: ~f[\\alpha] и ~f[β]";
    assert_eq!(find_spans(text), vec![7..17, 20..25]);
}

#[test]
fn test_placeholder_round_trip() {
    let text = "Ответ: ~f[\\alpha] и ~f[β].";
    let (replaced, map) = to_placeholder_form(text);
    assert_eq!(
        replaced,
        "Ответ: $$LATEX_0LATEX_END$$ и $$LATEX_1LATEX_END$$."
    );
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("$$LATEX_0LATEX_END$$"), Some("~f[\\alpha]"));

    let segments = from_placeholder_form(&replaced, &map);
    assert_eq!(
        segments,
        vec![
            Segment::PlainText("Ответ: ".to_string()),
            Segment::LatexText {
                placeholder: "$$LATEX_0LATEX_END$$".to_string(),
                source: "~f[\\alpha]".to_string(),
            },
            Segment::PlainText(" и ".to_string()),
            Segment::LatexText {
                placeholder: "$$LATEX_1LATEX_END$$".to_string(),
                source: "~f[β]".to_string(),
            },
            Segment::PlainText(".".to_string()),
        ]
    );
    assert_eq!(rejoin(&segments), text);
}

#[test]
fn test_entities_unescaped_in_captured_source() {
    let (replaced, map) = to_placeholder_form("~f[a &lt; b &#91;1&#93;] &lt; c");
    assert_eq!(replaced, "$$LATEX_0LATEX_END$$ &lt; c");
    let source = map.get("$$LATEX_0LATEX_END$$").unwrap();
    assert_eq!(source, "~f[a < b [1]]");
    assert_eq!(latex_body(source), "a < b [1]");
}

#[test]
fn test_literal_key_is_not_reused() {
    let text = "see $$LATEX_0LATEX_END$$ and ~f[x]";
    let (replaced, map) = to_placeholder_form(text);
    assert_eq!(replaced, "see $$LATEX_0LATEX_END$$ and $$LATEX_1LATEX_END$$");
    assert!(map.is_literal("$$LATEX_0LATEX_END$$"));
    assert_eq!(map.get("$$LATEX_0LATEX_END$$"), None);

    let segments = from_placeholder_form(&replaced, &map);
    assert_eq!(
        segments,
        vec![
            Segment::PlainText("see $$LATEX_0LATEX_END$$ and ".to_string()),
            Segment::LatexText {
                placeholder: "$$LATEX_1LATEX_END$$".to_string(),
                source: "~f[x]".to_string(),
            },
        ]
    );
}

#[test]
fn test_text_without_spans_is_unchanged() {
    let (replaced, map) = to_placeholder_form("просто текст");
    assert_eq!(replaced, "просто текст");
    assert!(map.is_empty());
    assert_eq!(
        from_placeholder_form(&replaced, &map),
        vec![Segment::PlainText("просто текст".to_string())]
    );
    assert!(from_placeholder_form("", &map).is_empty());
}

#[test]
fn test_unmapped_placeholder_is_an_error() {
    let result = try_from_placeholder_form("a $$LATEX_3LATEX_END$$", &PlaceholderMap::default());
    assert_eq!(
        result,
        Err(LatexError::UnmappedPlaceholder("$$LATEX_3LATEX_END$$".to_string()))
    );
}

#[test]
#[should_panic(expected = "has no entry")]
fn test_unmapped_placeholder_panics() {
    from_placeholder_form("$$LATEX_0LATEX_END$$", &PlaceholderMap::default());
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => r"[a-zа-я ~f\[\]\\^]{1,4}",
        2 => prop::sample::select(vec!["&lt;", "&gt;", "&#91;", "&#93;", "&amp;", "&"])
            .prop_map(str::to_string),
        1 => (0usize..3).prop_map(|n| format!("$$LATEX_{n}LATEX_END$$")),
    ]
}

/// `text` with every Latex span replaced by its entity-unescaped source.
fn unescape_spans(text: &str) -> (String, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut sources = Vec::new();
    let mut last = 0;
    for span in find_spans(text) {
        out.extend(&chars[last..span.start]);
        let source = unescape_entities(&chars[span.clone()].iter().collect::<String>());
        out.push_str(&source);
        sources.push(source);
        last = span.end;
    }
    out.extend(&chars[last..]);
    (out, sources)
}

proptest! {
    #[test]
    fn placeholder_form_round_trips(
        text in prop::collection::vec(fragment(), 0..16).prop_map(|parts| parts.concat())
    ) {
        let (replaced, map) = to_placeholder_form(&text);
        let (expected, sources) = unescape_spans(&text);
        prop_assert_eq!(map.len(), sources.len());

        let segments = from_placeholder_form(&replaced, &map);
        let placeholders: String = segments.iter().map(Segment::as_str).collect();
        prop_assert_eq!(&placeholders, &replaced);
        prop_assert_eq!(rejoin(&segments), expected);

        let latex: Vec<&Segment> = segments.iter().filter(|s| s.is_latex()).collect();
        prop_assert_eq!(latex.len(), sources.len());
        for (segment, source) in latex.into_iter().zip(&sources) {
            prop_assert_eq!(map.get(segment.as_str()), Some(source.as_str()));
            prop_assert_eq!(segment.latex_source(), Some(source.as_str()));
        }
    }
}
