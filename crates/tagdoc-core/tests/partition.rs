use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tagdoc_core::{Partition, PartitionKind, partition};

fn spans(text: &str) -> Vec<(usize, usize, PartitionKind)> {
    partition(text)
        .into_iter()
        .map(|p| (p.start, p.end, p.kind))
        .collect()
}

fn assert_total(text: &str, parts: &[Partition]) {
    let len = text.chars().count();
    if len == 0 {
        assert!(parts.is_empty());
        return;
    }
    assert_eq!(parts.first().map(|p| p.start), Some(0));
    assert_eq!(parts.last().map(|p| p.end), Some(len));
    for pair in parts.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "gap or overlap in {text:?}");
    }
    assert!(parts.iter().all(|p| p.start < p.end));
}

#[test]
fn test_tags_and_text() {
    assert_eq!(
        spans(r#"<a x="1">hi</a>"#),
        vec![
            (0, 9, PartitionKind::Tag),
            (9, 11, PartitionKind::Text),
            (11, 15, PartitionKind::EndTag),
        ]
    );
    assert_eq!(spans("<br/>"), vec![(0, 5, PartitionKind::EmptyTag)]);
    assert_eq!(spans("<br />x"), vec![(0, 6, PartitionKind::EmptyTag), (6, 7, PartitionKind::Text)]);
}

#[test]
fn test_comment_cdata_pi_declaration() {
    assert_eq!(
        spans("a<!-- c -->b"),
        vec![
            (0, 1, PartitionKind::Text),
            (1, 11, PartitionKind::Comment),
            (11, 12, PartitionKind::Text),
        ]
    );
    assert_eq!(spans("<![CDATA[x<y]]>"), vec![(0, 15, PartitionKind::CData)]);
    assert_eq!(
        spans(r#"<?xml version="1.0"?>"#),
        vec![(0, 21, PartitionKind::ProcessingInstruction)]
    );
    // `>` inside the internal subset does not close the declaration.
    assert_eq!(
        spans(r#"<!DOCTYPE q [<!ENTITY e "x">]>"#),
        vec![(0, 30, PartitionKind::Declaration)]
    );
}

#[test]
fn test_unterminated_constructs_degrade() {
    assert_eq!(
        spans("text<tag attr"),
        vec![(0, 4, PartitionKind::Text), (4, 13, PartitionKind::IncompleteTag)]
    );
    assert_eq!(
        spans("<a <b>"),
        vec![(0, 3, PartitionKind::IncompleteTag), (3, 6, PartitionKind::Tag)]
    );
    assert_eq!(spans("</a"), vec![(0, 3, PartitionKind::IncompleteTag)]);
    assert_eq!(spans("<!-- x"), vec![(0, 6, PartitionKind::Comment)]);
    assert_eq!(spans("<![CDATA[x"), vec![(0, 10, PartitionKind::CData)]);
    assert_eq!(spans("<?pi"), vec![(0, 4, PartitionKind::ProcessingInstruction)]);
    assert_eq!(spans("<a title=\"x"), vec![(0, 11, PartitionKind::IncompleteTag)]);
}

#[test]
fn test_literal_lt_is_text() {
    assert_eq!(spans("1 < 2 <3"), vec![(0, 8, PartitionKind::Text)]);
    assert_eq!(spans("a <"), vec![(0, 3, PartitionKind::Text)]);
}

#[test]
fn test_markdown_and_latex_stay_text() {
    let text = "Вопрос: ~f[a[b]c] **жирный**";
    assert_eq!(spans(text), vec![(0, text.chars().count(), PartitionKind::Text)]);
}

#[test]
fn test_offsets_are_characters() {
    assert_eq!(
        spans("тест<б/>"),
        vec![(0, 4, PartitionKind::Text), (4, 8, PartitionKind::EmptyTag)]
    );
}

#[test]
fn test_empty_input() {
    assert!(partition("").is_empty());
}

#[test]
fn test_kind_helpers() {
    assert!(PartitionKind::IncompleteTag.is_tag());
    assert!(!PartitionKind::Comment.is_tag());
    let p = Partition::new(2, 5, PartitionKind::Text);
    assert_eq!(p.len(), 3);
    assert!(p.contains(4) && !p.contains(5));
}

proptest! {
    #[test]
    fn partition_is_total_for_markup_soup(text in r#"[<>/!?\[\]"'=a-z\- тЖ]{0,80}"#) {
        let parts = partition(&text);
        assert_total(&text, &parts);
        for pair in parts.windows(2) {
            prop_assert!(
                !(pair[0].kind == PartitionKind::Text && pair[1].kind == PartitionKind::Text),
                "adjacent text partitions must merge"
            );
        }
    }

    #[test]
    fn partition_is_total_for_any_text(text in "\\PC{0,120}") {
        let parts = partition(&text);
        assert_total(&text, &parts);
        prop_assert_eq!(partition(&text), parts);
    }
}
