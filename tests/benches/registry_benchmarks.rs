//! # Correlation Hot Path Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | id generation | `RequestIdGenerator::next_id` |
//! | register + deliver | one full waiter lifecycle |
//! | register + cancel | abandoned wait |
//! | unmatched delivery | lookup miss |
//! | deliver under load | lifecycle with N other waiters pending |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use iq_correlator::{classify_response, RequestIdGenerator, WaiterRegistry};
use shared_types::Node;

fn bench_id_generation(c: &mut Criterion) {
    let ids = RequestIdGenerator::random();
    c.bench_function("id_generation", |b| b.iter(|| black_box(ids.next_id())));
}

fn bench_waiter_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("waiter_lifecycle");
    let ids = RequestIdGenerator::new("bench-");
    let registry = WaiterRegistry::new();
    let response = Node::new("iq").with_attr("type", "result");

    group.bench_function("register_deliver", |b| {
        b.iter(|| {
            let id = ids.next_id();
            let waiter = registry.register(&id).unwrap();
            registry.deliver(&id, response.clone());
            black_box(block_on(waiter))
        })
    });

    group.bench_function("register_cancel", |b| {
        b.iter(|| {
            let id = ids.next_id();
            let waiter = registry.register(&id).unwrap();
            registry.cancel(&id);
            black_box(block_on(waiter))
        })
    });

    group.bench_function("unmatched_delivery", |b| {
        b.iter(|| black_box(registry.deliver("nobody", response.clone())))
    });

    group.finish();
}

fn bench_deliver_under_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("deliver_under_load");

    for pending in [10usize, 1_000, 10_000] {
        let ids = RequestIdGenerator::new("load-");
        let registry = WaiterRegistry::new();
        let _parked: Vec<_> = (0..pending)
            .map(|_| registry.register(&ids.next_id()).unwrap())
            .collect();
        let response = Node::new("iq").with_attr("type", "result");

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(pending), &pending, |b, _| {
            b.iter(|| {
                let id = ids.next_id();
                let waiter = registry.register(&id).unwrap();
                registry.deliver(&id, response.clone());
                black_box(block_on(waiter))
            })
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let result = Node::new("iq").with_attr("id", "x").with_attr("type", "result");
    let error = Node::new("iq")
        .with_attr("id", "x")
        .with_attr("type", "error")
        .with_content(vec![Node::new("error").with_attr("code", 404i64)]);

    c.bench_function("classify_result", |b| {
        b.iter(|| black_box(classify_response(result.clone()).is_ok()))
    });
    c.bench_function("classify_error", |b| {
        b.iter(|| black_box(classify_response(error.clone()).is_err()))
    });
}

criterion_group!(
    benches,
    bench_id_generation,
    bench_waiter_lifecycle,
    bench_deliver_under_load,
    bench_classify
);
criterion_main!(benches);
