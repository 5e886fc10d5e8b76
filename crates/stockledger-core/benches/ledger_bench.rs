//! Ledger performance benchmarks.
//!
//! Run with: cargo bench -p stockledger-core

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use stockledger_core::seller::plan_sale;
use stockledger_core::{Expiry, Ledger};

fn expiry(i: usize) -> Expiry {
    Expiry::from_ymd(2022 + (i % 5) as i32, 1 + (i % 12) as u32, 1 + (i % 28) as u32).unwrap()
}

/// Generate a ledger holding `num_batches` batches of one item whose prices
/// alternate between cheap and expensive, so sales have to back off.
fn generate_ledger(num_batches: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for i in 0..num_batches {
        let price = if i % 2 == 0 { 5 } else { 50 + (i % 7) as i64 };
        ledger
            .store("rice", 10 + (i % 13) as i64, price, expiry(i), "ACME Rice Ltd.")
            .unwrap();
    }
    ledger
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_store");

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(generate_ledger(size)));
        });
    }

    group.finish();
}

fn bench_plan_sale(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_sale");

    for size in [10, 100, 1000] {
        let ledger = generate_ledger(size);
        let Some(batches) = ledger.batches("rice") else {
            continue;
        };
        let requested = batches.total_amount();

        group.bench_with_input(BenchmarkId::from_parameter(size), batches, |b, batches| {
            b.iter(|| black_box(plan_sale(batches, requested, 20)));
        });
    }

    group.finish();
}

fn bench_try_sell(c: &mut Criterion) {
    let mut group = c.benchmark_group("try_sell");

    for size in [10, 100, 1000] {
        let ledger = generate_ledger(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| black_box(ledger.try_sell("rice", 500, 20, "Pear Shop")),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_find_inconsistencies(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_inconsistencies");

    for size in [10, 100, 1000] {
        let mut ledger = generate_ledger(size);
        let _ = ledger.try_sell("rice", 200, 30, "Pear Shop");

        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.find_inconsistencies()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_store,
    bench_plan_sale,
    bench_try_sell,
    bench_find_inconsistencies
);
criterion_main!(benches);
