use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tagdoc_core::{Dictionary, DocumentSession, PositionModel, partition, to_placeholder_form};
use tagdoc_schema::Schema;

const WORDS: [&str; 8] = [
    "вопрос", "ответ", "число", "сумма", "задача", "пример", "решение", "тест",
];

fn large_quiz(question_count: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = String::with_capacity(question_count * 96);
    out.push_str("<quiz>\n");
    for i in 0..question_count {
        out.push_str(&format!("<q id=\"{i}\">"));
        for _ in 0..rng.gen_range(4..12) {
            out.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
            out.push(' ');
        }
        if rng.gen_bool(0.3) {
            out.push_str(&format!("~f[{}+{}] ", rng.gen_range(0..100), rng.gen_range(0..100)));
        }
        out.push_str("<a>");
        out.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
        out.push_str("</a></q>\n");
    }
    out.push_str("</quiz>");
    out
}

fn bench_partition(c: &mut Criterion) {
    let text = large_quiz(10_000);
    c.bench_function("partition/10k_questions", |b| {
        b.iter(|| black_box(partition(black_box(&text)).len()))
    });
}

fn bench_model_rebuild(c: &mut Criterion) {
    let text = large_quiz(10_000);
    let schema = Arc::new(Schema::empty());
    c.bench_function("model_rebuild/10k_questions", |b| {
        b.iter(|| {
            let model = PositionModel::build(black_box(&text), 0, schema.clone());
            black_box(model.tree().len());
        })
    });
}

fn bench_offset_lookup(c: &mut Criterion) {
    let text = large_quiz(10_000);
    let model = PositionModel::build(&text, 0, Arc::new(Schema::empty()));
    let len = model.len_chars();
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("find_tag_by_offset/1k_queries", |b| {
        b.iter(|| {
            for _ in 0..1_000 {
                let start = rng.gen_range(0..len);
                black_box(model.find_tag_by_offset(start, start + 1));
            }
        })
    });
}

fn bench_action_round_trip(c: &mut Criterion) {
    let text = large_quiz(2_000);
    c.bench_function("session/10_imports_undo_redo", |b| {
        b.iter_batched(
            || DocumentSession::new(&text, Schema::empty()),
            |mut session| {
                for i in 0..10 {
                    session.import_file(7, "bench", &format!("<q>{i}</q>")).unwrap();
                }
                while session.undo().unwrap().is_some() {}
                while session.redo().unwrap().is_some() {}
                black_box(session.stamp());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_spellcheck(c: &mut Criterion) {
    let text = large_quiz(2_000);
    let model = PositionModel::build(&text, 0, Arc::new(Schema::empty()));
    let dict = Dictionary::from_words(&WORDS[..6]);
    c.bench_function("spellcheck/2k_questions", |b| {
        b.iter(|| black_box(dict.check_document_tree(&model).len()))
    });
}

fn bench_placeholders(c: &mut Criterion) {
    let text = large_quiz(2_000);
    c.bench_function("placeholders/2k_questions", |b| {
        b.iter(|| black_box(to_placeholder_form(black_box(&text)).1.len()))
    });
}

criterion_group!(
    benches,
    bench_partition,
    bench_model_rebuild,
    bench_offset_lookup,
    bench_action_round_trip,
    bench_spellcheck,
    bench_placeholders
);
criterion_main!(benches);
