use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strata::{
    create_ngram_fingerprint_index, iterate_intersecting_spans, resolve_conflicts,
    AnnotationBuilder, Layer, Strategy,
};

const WORDS: &[&str] = &[
    "the", "program", "is", "free", "software", "you", "can", "redistribute", "it", "and", "or",
    "modify", "under", "terms", "of", "license",
];

/// Generates a layer over a text of `n` words with every word plus every pair of adjacent words, so that spans overlap
fn setup(n: usize) -> Layer {
    let mut raw = String::new();
    let mut words: Vec<(usize, usize, &str)> = Vec::with_capacity(n);
    for i in 0..n {
        let word = WORDS[i % WORDS.len()];
        if i > 0 {
            raw.push(' ');
        }
        let start = raw.len();
        raw.push_str(word);
        words.push((start, raw.len(), word));
    }
    let mut layer = Layer::new("candidates", ["lemma", "priority"]).build().unwrap();
    for (i, (start, end, word)) in words.iter().enumerate() {
        layer
            .add_annotation(
                (*start, *end),
                AnnotationBuilder::new()
                    .with_attribute("lemma", *word)
                    .with_attribute("priority", (i % 3) as i64),
            )
            .unwrap();
        if let Some((_, next_end, _)) = words.get(i + 1) {
            layer
                .add_annotation(
                    (*start, *next_end),
                    AnnotationBuilder::new()
                        .with_attribute("lemma", *word)
                        .with_attribute("priority", 1),
                )
                .unwrap();
        }
    }
    layer
}

pub fn bench_operations(c: &mut Criterion) {
    let layer = setup(2000);

    c.bench_function("iterate_intersecting_spans", |b| {
        b.iter(|| {
            let count = iterate_intersecting_spans(black_box(&layer), true, true, true).count();
            assert!(count > 0);
        })
    });

    c.bench_function("resolve_conflicts", |b| {
        b.iter(|| {
            let mut layer = black_box(&layer).clone();
            resolve_conflicts(&mut layer, Strategy::Max, Some("priority"), false, None).unwrap();
            assert!(!layer.is_empty());
        })
    });

    c.bench_function("create_ngram_fingerprint_index", |b| {
        b.iter(|| {
            let index = create_ngram_fingerprint_index(black_box(&layer), "lemma", 3).unwrap();
            assert!(!index.is_empty());
        })
    });
}

criterion_group!(benches, bench_operations);
criterion_main!(benches);
