use pretty_assertions::assert_eq;
use std::io::Write;
use tagdoc_schema::{FieldId, FieldType, Schema, SchemaError};

const QUIZ: &str = r#"
name: quiz
fields:
  - name: question
    type: group
    constraints:
      required: true
  - name: answer
    constraints:
      parents: [question]
      max_occurs: 4
      attributes: [correct]
  - name: score
    type: number
    constraints:
      pattern: "[0-9]+"
"#;

#[test]
fn test_load_fields_in_declaration_order() {
    let schema = Schema::from_yaml_str(QUIZ).unwrap();

    assert_eq!(schema.name(), Some("quiz"));
    assert_eq!(schema.len(), 3);
    let names: Vec<&str> = schema.fields().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, vec!["question", "answer", "score"]);

    let (id, answer) = schema.field("answer").unwrap();
    assert_eq!(id, FieldId(1));
    assert_eq!(answer.field_type, FieldType::Text);
    assert_eq!(answer.constraints.max_occurs, Some(4));
    assert!(schema.field_by_id(FieldId(0)).unwrap().constraints.required);
    assert!(schema.field("missing").is_none());
}

#[test]
fn test_constraint_helpers() {
    let schema = Schema::from_yaml_str(QUIZ).unwrap();
    let (_, answer) = schema.field("answer").unwrap();
    assert!(answer.allows_parent(Some("question")));
    assert!(!answer.allows_parent(None));
    assert!(answer.allows_attribute("correct"));
    assert!(!answer.allows_attribute("weight"));

    let (_, score) = schema.field("score").unwrap();
    assert!(score.matches_pattern("42"));
    assert!(!score.matches_pattern("42a"), "pattern is anchored");

    let (_, question) = schema.field("question").unwrap();
    assert!(question.allows_parent(None));
    assert!(question.matches_pattern("anything"));
}

#[test]
fn test_duplicate_field_rejected() {
    let err = Schema::from_yaml_str("fields:\n  - name: a\n  - name: a\n").unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateField(name) if name == "a"));
}

#[test]
fn test_unknown_parent_rejected() {
    let yaml = "fields:\n  - name: a\n    constraints:\n      parents: [nope]\n";
    let err = Schema::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownParent { parent, .. } if parent == "nope"));
}

#[test]
fn test_bad_pattern_and_missing_name() {
    let yaml = "fields:\n  - name: a\n    constraints:\n      pattern: \"(\"\n";
    assert!(matches!(
        Schema::from_yaml_str(yaml),
        Err(SchemaError::RegexCompile { .. })
    ));

    let yaml = "fields:\n  - type: number\n";
    assert!(matches!(
        Schema::from_yaml_str(yaml),
        Err(SchemaError::MissingField("name"))
    ));

    assert!(matches!(
        Schema::from_yaml_str("fields: [[["),
        Err(SchemaError::Yaml(_))
    ));
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(QUIZ.as_bytes()).unwrap();

    let schema = Schema::from_path(file.path()).unwrap();
    assert_eq!(schema.len(), 3);

    let missing = file.path().with_extension("does-not-exist");
    assert!(matches!(Schema::from_path(missing), Err(SchemaError::Io(_))));
}

#[test]
fn test_empty_schema() {
    let schema = Schema::empty();
    assert!(schema.is_empty());
    assert!(schema.name().is_none());
}
