//! Benchmarks for keyword retrieval.
//!
//! Scores the built-in resume and a synthetic 1,000-chunk knowledge base.
//! Every query scans every chunk, so cost grows linearly with size.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use folio_chat::RetrievalEngine;
use folio_core::knowledge::{KnowledgeBase, KnowledgeChunk};

const SYNTHETIC_CHUNK_COUNT: usize = 1_000;

const QUERIES: [&str; 4] = [
    "What is the Bridge SaaS?",
    "Tell me about FlashCull performance.",
    "What is his tech stack?",
    "xyz quantum teleportation",
];

fn synthetic_knowledge() -> KnowledgeBase {
    let chunks = (0..SYNTHETIC_CHUNK_COUNT)
        .map(|i| {
            KnowledgeChunk::new(
                &format!("chunk-{}", i % 50),
                &format!("Chunk {}", i),
                &format!(
                    "Built a multi-tenant platform with React, TypeScript and PostgreSQL. \
                     Improved query performance and shipped CI/CD pipelines. Entry {}",
                    i
                ),
                &["react", "typescript", "postgresql", "performance"],
            )
        })
        .collect();
    KnowledgeBase::new(chunks).expect("synthetic knowledge base is non-empty")
}

fn bench_resume_search(c: &mut Criterion) {
    let engine = RetrievalEngine::new(Arc::new(KnowledgeBase::resume()));

    c.bench_function("resume_search", |b| {
        b.iter(|| {
            for query in QUERIES {
                black_box(engine.search(black_box(query)));
            }
        })
    });
}

fn bench_synthetic_search(c: &mut Criterion) {
    let engine = RetrievalEngine::new(Arc::new(synthetic_knowledge()));

    c.bench_function("synthetic_1k_search", |b| {
        b.iter(|| black_box(engine.search(black_box("react performance stack"))))
    });
}

criterion_group!(benches, bench_resume_search, bench_synthetic_search);
criterion_main!(benches);
