// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![expect(missing_docs, reason = "benchmark code")]
use std::hint::black_box;

use alloc_tracker::{Allocator, Session};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use tick::Clock;
use tripwire::{Breaker, BreakerOptions};

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

fn entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("breaker");
    let session = Session::new();

    // No circuit breaker
    let operation = session.operation("no-breaker");
    group.bench_function("no-breaker", |b| {
        b.iter(|| {
            let _span = operation.measure_thread();
            _ = black_box(execute(Input));
        });
    });

    // With circuit breaker (closed state)
    let breaker = Breaker::new("bench", BreakerOptions::default(), Clock::new_frozen());

    let operation = session.operation("with-breaker");
    group.bench_function("with-breaker", |b| {
        b.iter(|| {
            let _span = operation.measure_thread();
            _ = black_box(breaker.call(|| execute(Input), || Output));
        });
    });

    // With circuit breaker (open state)
    let breaker = Breaker::new("bench", BreakerOptions::default().max_attempts(1), Clock::new_frozen());
    _ = breaker.call(|| Err::<Output, _>(()), || Output);

    let operation = session.operation("with-breaker-open");
    group.bench_function("with-breaker-open", |b| {
        b.iter(|| {
            let _span = operation.measure_thread();
            _ = black_box(breaker.call(|| execute(Input), || Output));
        });
    });

    // Async call through a closed circuit breaker
    let breaker = Breaker::new("bench", BreakerOptions::default(), Clock::new_frozen());

    let operation = session.operation("with-breaker-async");
    group.bench_function("with-breaker-async", |b| {
        b.iter(|| {
            let _span = operation.measure_thread();
            _ = black_box(block_on(
                breaker.call_async(|| async { execute(Input) }, || async { Output }),
            ));
        });
    });

    group.finish();
    session.print_to_stdout();
}

criterion_group!(benches, entry);
criterion_main!(benches);

fn execute(_input: Input) -> Result<Output, ()> {
    Ok(Output)
}

#[derive(Debug, Clone)]
struct Input;

#[derive(Debug, Clone)]
struct Output;
