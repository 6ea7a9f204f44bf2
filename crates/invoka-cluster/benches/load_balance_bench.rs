// Criterion benchmarks for invoka-cluster
//
// Run benchmarks with:
//   cargo bench -p invoka-cluster
//
// For detailed output with plots:
//   cargo bench -p invoka-cluster -- --save-baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_cluster::{
    pick_weighted, warmup_weight, ActivityTracker, LoadBalanceKind, SeededRandom,
};
use invoka_common::{CallContext, Endpoint, EndpointUrl, Response, Result, SharedEndpoint};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug)]
struct BenchEndpoint(EndpointUrl);

impl Endpoint for BenchEndpoint {
    fn url(&self) -> &EndpointUrl {
        &self.0
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        futures::future::ready(Ok(Response::success(ctx.id, json!(null)))).boxed()
    }
}

fn pool(count: usize, weighted: bool) -> Vec<SharedEndpoint> {
    (0..count)
        .map(|i| {
            let weight = if weighted { 1 + i % 7 } else { 100 };
            Arc::new(BenchEndpoint(
                EndpointUrl::new("tri", format!("node{}", i), Some(20880), "UserService")
                    .with_parameter("weight", weight.to_string()),
            )) as SharedEndpoint
        })
        .collect()
}

fn bench_pick_weighted(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_weighted");

    for count in [2usize, 10, 50].iter() {
        let weights: Vec<u64> = (0..*count as u64).map(|i| 1 + i % 7).collect();
        let last = weights.iter().sum::<u64>() - 1;
        group.bench_with_input(BenchmarkId::from_parameter(count), &weights, |b, weights| {
            b.iter(|| pick_weighted(black_box(weights), black_box(last)));
        });
    }

    group.finish();
}

fn bench_warmup_weight(c: &mut Criterion) {
    c.bench_function("warmup_weight", |b| {
        b.iter(|| warmup_weight(black_box(123_456), black_box(600_000), black_box(100)));
    });
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let ctx = CallContext::new("getUser", json!([1]));

    for kind in [LoadBalanceKind::Random, LoadBalanceKind::LeastActive] {
        for (label, weighted) in [("same_weight", false), ("weighted", true)] {
            for count in [2usize, 10, 50] {
                let endpoints = pool(count, weighted);
                let lb = kind.build(
                    Arc::new(SeededRandom::new(7)),
                    Arc::new(ActivityTracker::new()),
                );
                group.bench_with_input(
                    BenchmarkId::new(format!("{}/{}", kind, label), count),
                    &endpoints,
                    |b, endpoints| {
                        b.iter(|| lb.select(black_box(endpoints), black_box(&ctx)));
                    },
                );
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pick_weighted, bench_warmup_weight, bench_select);
criterion_main!(benches);
