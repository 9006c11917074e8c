//! Microbenchmarks for the future/promise rendezvous.
//!
//! Covers the two scheduling regimes:
//! - ready-chain fast path: continuations run synchronously, no allocation
//! - deferred path: promise first, continuation attached, one task per hop

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shardsync::{executor, make_ready_future, Promise};

fn ready_chain(c: &mut Criterion) {
    c.bench_function("ready_chain/map_x3", |b| {
        b.iter(|| {
            make_ready_future(black_box(1u64))
                .map(|x| x + 1)
                .map(|x| x * 2)
                .map(|x| x - 3)
                .into_result()
                .unwrap()
        });
    });

    c.bench_function("ready_chain/then_future", |b| {
        b.iter(|| {
            make_ready_future(black_box(1u64))
                .then(|x| make_ready_future(x + 1))
                .into_result()
                .unwrap()
        });
    });
}

fn deferred_chain(c: &mut Criterion) {
    c.bench_function("deferred/promise_then_resolve", |b| {
        b.iter(|| {
            let mut promise = Promise::new();
            let future = promise.get_future().map(|x: u64| x + 1);
            promise.set_value(black_box(41));
            executor::run_until_idle();
            future.into_result().unwrap()
        });
    });

    c.bench_function("deferred/forward_to", |b| {
        b.iter(|| {
            let mut upstream = Promise::new();
            let mut downstream = Promise::new();
            let observed = downstream.get_future();
            upstream.get_future().forward_to(downstream);
            upstream.set_value(black_box(9u64));
            executor::run_until_idle();
            observed.into_result().unwrap()
        });
    });
}

criterion_group!(benches, ready_chain, deferred_chain);
criterion_main!(benches);
