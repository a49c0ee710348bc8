use criterion::{criterion_group, criterion_main, Criterion};
use search_core::{EngineConfig, Metadata, SearchEngine};

const WORDS: &[&str] = &[
    "rust", "search", "index", "query", "cache", "trie", "prefix", "token", "score", "document",
    "engine", "posting", "frequency", "ranking", "boolean", "lookup",
];

fn corpus(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| (0..40).map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()]).collect::<Vec<_>>().join(" "))
        .collect()
}

fn populated(n: usize) -> SearchEngine {
    let engine = SearchEngine::new(EngineConfig::default()).expect("valid config");
    for (i, text) in corpus(n).iter().enumerate() {
        engine.index_document(&i.to_string(), text, Metadata::new());
    }
    engine
}

fn bench_index(c: &mut Criterion) {
    let docs = corpus(500);
    c.bench_function("index_500_docs", |b| {
        b.iter(|| {
            let engine = SearchEngine::new(EngineConfig::default()).expect("valid config");
            for (i, text) in docs.iter().enumerate() {
                engine.index_document(&i.to_string(), text, Metadata::new());
            }
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let engine = populated(2_000);
    c.bench_function("search_uncached", |b| {
        b.iter(|| {
            engine.clear_cache();
            engine.search("rust ranking cache", 10)
        })
    });
    c.bench_function("search_cached", |b| b.iter(|| engine.search("rust ranking cache", 10)));
    c.bench_function("autocomplete", |b| {
        b.iter(|| {
            engine.clear_cache();
            engine.autocomplete("p", 5)
        })
    });
}

criterion_group!(benches, bench_index, bench_search);
criterion_main!(benches);
