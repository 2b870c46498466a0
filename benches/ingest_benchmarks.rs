use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use docgraph::graph::MemoryGraph;
use docgraph::ingest::{self, DocumentRecord};

/// Documents DoDI 1..n, each citing its predecessor and one unknown title
fn corpus(size: usize) -> Vec<DocumentRecord> {
    (0..size)
        .map(|i| DocumentRecord {
            id: format!("DoDI {}.pdf_0", i),
            doc_type: "DoDI".to_string(),
            doc_num: i.to_string(),
            topics: vec![(format!("topic {}", i % 20), 0.5)],
            entities: vec![(format!("Agency {}", i % 10), 2)],
            ref_list: vec![format!("DoDI {}", i.saturating_sub(1)), format!("Title {}", i % 50)],
            ..Default::default()
        })
        .collect()
}

/// Benchmark first-time document ingestion
fn bench_document_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_ingest");

    for size in [100, 1000].iter() {
        let docs = corpus(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let graph = MemoryGraph::indexed();
                for doc in &docs {
                    ingest::ingest_document(&graph, doc).unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Benchmark re-ingesting documents that are already in the graph
fn bench_document_reingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_reingest");

    for size in [100, 1000].iter() {
        let docs = corpus(*size);
        let graph = MemoryGraph::indexed();
        for doc in &docs {
            ingest::ingest_document(&graph, doc).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for doc in &docs {
                    criterion::black_box(ingest::ingest_document(&graph, doc).unwrap());
                }
            });
        });
    }
    group.finish();
}

/// Benchmark the citation pass over an already resolved corpus
fn bench_resolve_references(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_references");

    for size in [100, 1000].iter() {
        let graph = MemoryGraph::indexed();
        for doc in &corpus(*size) {
            ingest::ingest_document(&graph, doc).unwrap();
        }
        ingest::resolve_references(&graph).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                criterion::black_box(ingest::resolve_references(&graph).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_document_ingest,
    bench_document_reingest,
    bench_resolve_references
);
criterion_main!(benches);
