//! Benchmarks for route compilation and evaluation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use graphroute::graph::{MemoryGraph, Properties};
use graphroute::prelude::*;
use serde_json::json;
use std::sync::Arc;

/// A ring of `size` vertices, each linked to the next two
fn ring(size: u64) -> Arc<MemoryGraph> {
    let graph = MemoryGraph::new("ring");
    let ids: Vec<_> = (0..size)
        .map(|n| {
            let properties: Properties = json!({ "n": n }).as_object().cloned().unwrap_or_default();
            graph.add_vertex(properties)
        })
        .collect();
    for (i, &id) in ids.iter().enumerate() {
        for step in 1..=2 {
            let next = ids[(i + step) % ids.len()];
            graph
                .add_edge(id, next, "next", Properties::new())
                .expect("ring vertices exist");
        }
    }
    graph
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for depth in [1usize, 8, 32].iter() {
        let mut route = Route::from_items(0..10);
        for _ in 0..*depth {
            route = route.uniq();
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &route, |b, route| {
            b.iter(|| black_box(route.compile().expect("route compiles")));
        });
    }

    group.finish();
}

fn bench_block_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_filter");

    for size in [1_000i64, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        let route = Route::from_items(0..*size).filter(|n| n.as_i64().is_some_and(|n| n % 2 == 0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &route, |b, route| {
            b.iter(|| black_box(route.count().expect("route evaluates")));
        });
    }

    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for size in [100u64, 1_000, 10_000].iter() {
        let graph = ring(*size);
        group.throughput(Throughput::Elements(*size * 2));

        let route = graph.v().out_e(&["next"]).in_v().uniq();
        group.bench_with_input(BenchmarkId::new("out_e_in_v_uniq", size), &route, |b, route| {
            b.iter(|| black_box(route.count().expect("route evaluates")));
        });

        let scripted = graph.v().filter_script("it.n % 3 == 0").out_e(&[]);
        group.bench_with_input(BenchmarkId::new("script_filter", size), &scripted, |b, route| {
            b.iter(|| black_box(route.count().expect("route evaluates")));
        });
    }

    group.finish();
}

fn bench_first_match(c: &mut Criterion) {
    let graph = ring(10_000);
    let route = graph.v().out_e(&[]).in_v();

    c.bench_function("first_match_10k", |b| {
        b.iter(|| black_box(route.first().expect("route evaluates")));
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_block_filter,
    bench_traversal,
    bench_first_match
);
criterion_main!(benches);
