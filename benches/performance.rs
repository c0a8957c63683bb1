//! Performance benchmarks for tickerlens.
//!
//! Run with: cargo bench
//!
//! Target performance:
//! - Search over 2,000 records: < 50ms
//! - Similarity lookup: < 20ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;
use tickerlens::core::catalog::{CatalogIndex, InstrumentKind, InstrumentRecord, TagWeightTable};
use tickerlens::core::{find_similar, search};

const SECTORS: [&str; 8] = [
    "Energy",
    "Oil",
    "Technology",
    "Semiconductors",
    "Banking",
    "Electric Vehicles",
    "Healthcare",
    "Retail",
];

/// Synthetic catalog with `stocks` stocks and a quarter as many ETFs.
fn synthetic_catalog(stocks: usize) -> CatalogIndex {
    let record = |kind: InstrumentKind, i: usize| {
        let prefix = if kind == InstrumentKind::Etf { "E" } else { "S" };
        let symbol = format!("{}{:04}", prefix, i);
        InstrumentRecord::new(kind, symbol, format!("Company {} Holdings, Inc.", i))
            .with_tags([SECTORS[i % SECTORS.len()], SECTORS[(i * 3 + 1) % SECTORS.len()]])
            .with_descriptions(
                format!("Company {} operates in {}.", i, SECTORS[i % SECTORS.len()]),
                "Listed on a major exchange.",
            )
    };

    let stock_list = (0..stocks).map(|i| record(InstrumentKind::Stock, i)).collect();
    let etf_list = (0..stocks / 4).map(|i| record(InstrumentKind::Etf, i)).collect();

    let weights =
        TagWeightTable::from_groups([(2.0, vec!["Energy", "Oil"]), (1.5, vec!["Banking"])]);
    let caps: HashMap<String, f64> = (0..stocks)
        .map(|i| (format!("S{:04}", i), (i as f64 + 1.0) * 1e9))
        .collect();
    let comparisons: HashMap<String, String> = (0..stocks)
        .map(|i| (format!("S{:04}", i), format!("{:+.1}%", (i % 7) as f64 - 3.0)))
        .collect();

    CatalogIndex::build(stock_list, etf_list, weights, caps, comparisons)
}

/// Benchmark free-text search across query shapes.
fn bench_search(c: &mut Criterion) {
    let catalog = synthetic_catalog(2000);
    let mut group = c.benchmark_group("search");

    let queries = [
        ("symbol", "S0042"),
        ("fuzzy_symbol", "S0O42"),
        ("tag", "energy"),
        ("two_keywords", "electric vehicles"),
        ("no_match", "zzzz"),
    ];

    for (name, query) in queries {
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, query| {
            b.iter(|| black_box(search(black_box(query), &catalog)))
        });
    }

    group.finish();
}

/// Benchmark tag-weighted similarity.
fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    for size in [500, 2000] {
        let catalog = synthetic_catalog(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| black_box(find_similar(black_box("S0001"), catalog)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search, bench_similarity);
criterion_main!(benches);
