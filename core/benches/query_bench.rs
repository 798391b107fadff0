use birs_core::query::{boolean_query, proximity_query};
use birs_core::stopwords::Stopwords;
use birs_core::tokenizer::normalize;
use birs_core::{build, IndexSnapshot};
use criterion::{criterion_group, criterion_main, Criterion};

const TEXT: &str = "Boolean retrieval answers set queries over an inverted index, while proximity \
    search relies on per-document token positions to bound the distance between two terms.";

fn sample_index(stopwords: &Stopwords) -> IndexSnapshot {
    let docs = (0..500).map(|i| {
        let text = if i % 3 == 0 { TEXT.to_string() } else { format!("document {i} mentions retrieval only") };
        (i.to_string(), normalize(&text, stopwords))
    });
    build(docs).expect("numeric doc ids")
}

fn bench_normalize(c: &mut Criterion) {
    let stopwords = Stopwords::english();
    c.bench_function("normalize_paragraph", |b| b.iter(|| normalize(TEXT, &stopwords)));
}

fn bench_queries(c: &mut Criterion) {
    let stopwords = Stopwords::english();
    let index = sample_index(&stopwords);
    c.bench_function("boolean_and_not", |b| {
        b.iter(|| boolean_query("retrieval and not proximity", &index, &stopwords))
    });
    c.bench_function("proximity_window", |b| {
        b.iter(|| proximity_query("token positions /2", &index.positional, &stopwords))
    });
}

criterion_group!(benches, bench_normalize, bench_queries);
criterion_main!(benches);
