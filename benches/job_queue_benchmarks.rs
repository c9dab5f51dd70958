//! Performance benchmarks for the promise core
//!
//! Run with: cargo bench
//!
//! These benchmarks measure key performance characteristics:
//! - Cold start time (runtime initialization)
//! - Settlement fan-out (one promise, many reactions)
//! - Chain depth (derived promises settled during a single drain)
//! - Thenable adoption overhead

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use microtask::{Runtime, Value};

fn noop_handler() -> Value {
    Value::native_function("noop", |_rt: &mut Runtime, args: &[Value]| {
        Ok(args.first().cloned().unwrap_or(Value::Undefined))
    })
}

/// Benchmark: Cold start time (runtime initialization)
fn bench_cold_start(c: &mut Criterion) {
    c.bench_function("cold_start", |b| {
        b.iter(|| {
            let runtime = Runtime::new();
            black_box(runtime)
        })
    });
}

/// Benchmark: settling a promise with many registered reactions
fn bench_settlement_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement_fanout");

    for reactions in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(reactions as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(reactions),
            &reactions,
            |b, &reactions| {
                b.iter(|| {
                    let mut runtime = Runtime::new();
                    let promise = runtime.create_promise();
                    let handler = noop_handler();
                    for _ in 0..reactions {
                        runtime
                            .then(&promise, Some(handler.clone()), None)
                            .unwrap();
                    }
                    runtime
                        .resolve_or_reject(&promise, black_box(Value::Number(1.0)), true)
                        .unwrap();
                    runtime.drain_all().unwrap();
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: draining a chain of derived promises
fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for depth in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut runtime = Runtime::new();
                let handler = noop_handler();
                let mut link = runtime.create_promise();
                let head = link.clone();
                for _ in 0..depth {
                    link = runtime.then(&link, Some(handler.clone()), None).unwrap();
                }
                runtime
                    .resolve_or_reject(&head, black_box(Value::Number(1.0)), true)
                    .unwrap();
                runtime.drain_all().unwrap();
            })
        });
    }

    group.finish();
}

/// Benchmark: resolving through a foreign thenable
fn bench_thenable_adoption(c: &mut Criterion) {
    c.bench_function("thenable_adoption", |b| {
        b.iter(|| {
            let mut runtime = Runtime::new();
            let promise = runtime.create_promise();
            let thenable = Value::new_object();
            thenable.set_property(
                "then",
                Value::native_function("then", |rt: &mut Runtime, args: &[Value]| {
                    let resolve = args[0].clone();
                    rt.invoke(&resolve, &[Value::Number(42.0)]).unwrap()
                }),
            );
            runtime
                .resolve_or_reject(&promise, black_box(thenable), true)
                .unwrap();
            runtime.drain_all().unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_cold_start,
    bench_settlement_fanout,
    bench_chain_depth,
    bench_thenable_adoption
);
criterion_main!(benches);
