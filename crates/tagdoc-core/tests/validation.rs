use pretty_assertions::assert_eq;
use std::sync::Arc;
use tagdoc_core::{DiagnosticSeverity, PositionModel};
use tagdoc_schema::Schema;

const QUIZ_SCHEMA: &str = r#"
name: quiz
fields:
  - name: quiz
    type: group
    constraints: { required: true, attributes: [id] }
  - name: q
    constraints: { parents: [quiz], max_occurs: 1 }
  - name: score
    type: number
  - name: code
    constraints: { pattern: "[A-Z]{3}" }
  - name: title
    constraints: { required: true }
"#;

fn validate(text: &str, schema: &str) -> Vec<(&'static str, String)> {
    let schema = Schema::from_yaml_str(schema).unwrap();
    let model = PositionModel::build(text, 0, Arc::new(schema));
    model
        .validate()
        .into_iter()
        .map(|d| (d.code, model.slice(d.range)))
        .collect()
}

#[test]
fn test_every_rule_reports_in_document_order() {
    let text = concat!(
        r#"<quiz lang="ru"><q>a</q><q>b</q>"#,
        "<score> x </score><code>AB</code><foo/></quiz><q>c</q>",
    );
    let found = validate(text, QUIZ_SCHEMA);
    let codes: Vec<&str> = found.iter().map(|(code, _)| *code).collect();
    assert_eq!(
        codes,
        vec![
            "unknown-attribute",
            "too-many",
            "not-a-number",
            "pattern-mismatch",
            "unknown-element",
            "too-many",
            "invalid-parent",
            "missing-required",
        ]
    );

    // Content checks point at the content, element checks at the whole element.
    assert_eq!(found[1].1, "<q>b</q>");
    assert_eq!(found[2].1, " x ");
    assert_eq!(found[3].1, "AB");
    assert_eq!(found[4].1, "<foo/>");
    assert_eq!(found[7].1, "");
}

#[test]
fn test_valid_document_is_clean() {
    let text = r#"<quiz id="1"><title>Т</title><q>a</q><score> 4.5 </score><code>ABC</code></quiz>"#;
    assert!(validate(text, QUIZ_SCHEMA).is_empty());
}

#[test]
fn test_group_and_flag_content_is_not_checked() {
    let schema = "fields:\n  - name: g\n    type: group\n    constraints: { pattern: 'x' }\n  - name: f\n    type: flag\n";
    assert!(validate("<g>anything<f>at all</f></g>", schema).is_empty());
}

#[test]
fn test_unclosed_reported_without_schema() {
    let model = PositionModel::build("<a><b>x</a><c>", 0, Arc::new(Schema::empty()));
    let diagnostics = model.validate();
    let unclosed: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.code == "unclosed-tag")
        .map(|d| model.slice(d.range.clone()))
        .collect();
    assert_eq!(unclosed, vec!["<b>x".to_string(), "<c>".to_string()]);
    assert!(
        diagnostics
            .iter()
            .all(|d| d.severity == DiagnosticSeverity::Error && d.source == "tagdoc-schema")
    );
}

#[test]
fn test_top_level_parent_rule() {
    let schema = "fields:\n  - name: quiz\n  - name: q\n    constraints: { parents: [quiz] }\n";
    let found = validate("<q>loose</q><quiz><q>ok</q></quiz>", schema);
    assert_eq!(found, vec![("invalid-parent", "<q>loose</q>".to_string())]);
}
