//! Brute-force nearest-neighbour throughput
//!
//! Measures a full vocabulary scan at GloVe-like sizes and dimensions.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glovebox::{Expression, VectorStore, nearest, nearest_to_expression};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::hint::black_box;
use std::io::Cursor;

fn synthetic_vocabulary(words: usize, dimension: usize) -> VectorStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut text = String::new();
    for i in 0..words {
        text.push_str(&format!("word{i}"));
        for _ in 0..dimension {
            text.push_str(&format!(" {:.5}", rng.random_range(-1.0f32..1.0)));
        }
        text.push('\n');
    }
    VectorStore::load(Cursor::new(text), words).expect("synthetic vocabulary loads")
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    for &(words, dimension) in &[(10_000, 50), (10_000, 300), (50_000, 100)] {
        let store = synthetic_vocabulary(words, dimension);
        let query = store.vector_of("word7").map(<[f32]>::to_vec).unwrap_or_default();
        let exclude: HashSet<&str> = ["word7"].into_iter().collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{words}x{dimension}")),
            &query,
            |b, query| {
                b.iter(|| black_box(nearest(&store, black_box(query), &exclude, 10)));
            },
        );
    }
    group.finish();
}

fn bench_expression(c: &mut Criterion) {
    let store = synthetic_vocabulary(10_000, 100);
    let expression = Expression::parse("word1 - word2 + word3").expect("valid expression");

    c.bench_function("expression_10000x100", |b| {
        b.iter(|| black_box(nearest_to_expression(&store, black_box(&expression), 10)));
    });
}

criterion_group!(benches, bench_nearest, bench_expression);
criterion_main!(benches);
