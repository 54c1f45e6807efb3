//! Search Benchmarks
//!
//! Run with: cargo bench --bench search

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio::runtime::Runtime;

use cineseek::corpus::{MemoryCorpus, SubtitleLine};
use cineseek::search::{normalize, score, RetrievalOptions, Retriever};

const FILLER: &[&str] = &[
    "I don't know what you're talking about.",
    "Get out of the car, now!",
    "We were never here, understand?",
    "Why would anyone do something like that?",
    "It's not about the money, it's about sending a message.",
];

fn corpus(size: usize) -> MemoryCorpus {
    let mut lines: Vec<SubtitleLine> = (0..size)
        .map(|i| SubtitleLine::new(&format!("Movie {}", i), "2000", FILLER[i % FILLER.len()]))
        .collect();
    lines.push(SubtitleLine::new("Inception", "2010", "We need to go deeper."));
    MemoryCorpus::from_lines("bench", lines)
}

fn benchmark_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    group.throughput(Throughput::Elements(1));

    group.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("It's not about the money -- it's about sending a MESSAGE!")));
    });

    let text = normalize("It's not about the money, it's about sending a message.");
    group.bench_function("score_contained", |b| {
        b.iter(|| score(black_box("sending a message"), black_box(&text)));
    });
    group.bench_function("score_partial", |b| {
        b.iter(|| score(black_box("sending the money back"), black_box(&text)));
    });

    group.finish();
}

fn benchmark_retrieval(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("retrieval");
    for size in [1_000usize, 10_000].iter() {
        let store = corpus(*size);
        let retriever = Retriever::new(RetrievalOptions {
            scan_sample_size: size + 1,
            ..RetrievalOptions::default()
        });

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("scan_{}_lines", size), |b| {
            b.to_async(&rt).iter(|| async {
                retriever
                    .retrieve(&store, black_box("we need to go deeper"), 5)
                    .await
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_scoring, benchmark_retrieval);
criterion_main!(benches);
