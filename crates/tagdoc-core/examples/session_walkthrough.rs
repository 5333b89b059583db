//! Session walkthrough
//!
//! Builds a small quiz document, performs structural edits, walks the undo history and runs
//! validation and spellchecking over the result.

use std::sync::{Arc, Mutex};
use tagdoc_core::{Attributes, Dictionary, DocumentSession, from_placeholder_form, to_placeholder_form};
use tagdoc_schema::Schema;

const SCHEMA: &str = r#"
name: quiz
fields:
  - name: quiz
    type: group
    constraints: { required: true }
  - name: q
    constraints: { parents: [quiz], attributes: [id] }
  - name: points
    type: number
"#;

fn main() {
    println!("=== Tagged document session ===\n");

    let schema = Schema::from_yaml_str(SCHEMA).unwrap();
    let mut session = DocumentSession::new("<quiz>Сколько будет ~f[2+2]?</quiz>", schema);

    let changes = Arc::new(Mutex::new(0));
    let changes_clone = changes.clone();
    session.subscribe(move |change| {
        *changes_clone.lock().unwrap() += 1;
        println!(
            "  change: {:?} (stamp {} -> {})",
            change.change_type, change.old_stamp, change.new_stamp
        );
    });

    println!("1. Wrap the question text:");
    session.insert_tag(6..28, "q", &Attributes::new()).unwrap();
    println!("  {}", session.document().text());

    println!("\n2. Set an attribute and import a footer:");
    let q = session.find_tag_by_offset(10, 11).unwrap();
    session.set_attribute(q, "id", "1").unwrap();
    let end = session.document().len_chars() - "</quiz>".len();
    session.import_file(end, "points.txt", "<points>x</points>").unwrap();
    println!("  {}", session.document().text());

    println!("\n3. Tree:");
    let model = session.model();
    for (id, tag) in model.tree().iter() {
        let depth = model.tree().depth(id);
        println!("  {}<{}> {:?}", "  ".repeat(depth), tag.name, tag.range());
    }

    println!("\n4. Validation:");
    for diagnostic in session.validate() {
        println!("  [{}] {:?}: {}", diagnostic.code, diagnostic.range, diagnostic.message);
    }

    println!("\n5. Spellcheck:");
    let dict = Dictionary::from_words(["сколько"]);
    for error in session.check_spelling(&dict) {
        println!("  '{}' at {}", error.misspelling.word, error.misspelling.offset);
    }

    println!("\n6. Latex placeholders:");
    let content = model.content_text(q).unwrap_or_default();
    let (replaced, map) = to_placeholder_form(&content);
    println!("  {replaced}");
    for segment in from_placeholder_form(&replaced, &map) {
        println!("  {segment:?}");
    }

    println!("\n7. Undo everything:");
    while let Some(name) = session.undo().unwrap() {
        println!("  undone: {name}");
    }
    println!("  {}", session.document().text());

    println!("\nTotal changes observed: {}", changes.lock().unwrap());
}
