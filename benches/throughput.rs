//! Throughput benchmarks for bulk operations.
//!
//! Run with: `cargo bench --bench throughput`

use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use rust_decimal::Decimal;

use polymarket_core::config::ChainConfig;
use polymarket_core::rounding::{fit_amount, round_down, round_normal, TickSize};
use polymarket_core::safe::{aggregate_transactions, approval_transactions, derive_safe_address};
use polymarket_core::types::SafeTransaction;

/// Generate random owner addresses.
fn generate_owners(rng: &mut impl Rng, count: usize) -> Vec<Address> {
    (0..count)
        .map(|_| Address::from(rng.gen::<[u8; 20]>()))
        .collect()
}

/// Generate random ERC-20 transfer-shaped calls.
fn generate_calls(rng: &mut impl Rng, count: usize) -> Vec<SafeTransaction> {
    (0..count)
        .map(|_| {
            let mut data = vec![0xa9, 0x05, 0x9c, 0xbb];
            data.extend_from_slice(&[0u8; 12]);
            data.extend_from_slice(&rng.gen::<[u8; 20]>());
            data.extend_from_slice(&rng.gen::<[u8; 32]>());
            SafeTransaction::call(Address::from(rng.gen::<[u8; 20]>()), &data)
        })
        .collect()
}

/// Generate random prices in (0, 1) with up to six decimals.
fn generate_prices(rng: &mut impl Rng, count: usize) -> Vec<Decimal> {
    (0..count)
        .map(|_| Decimal::new(rng.gen_range(1..1_000_000), 6))
        .collect()
}

/// Benchmark bulk Safe address derivation.
fn bench_safe_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("safe_derivation");
    let mut rng = rand::thread_rng();
    let factory = ChainConfig::polygon().contracts.safe_factory;

    for count in [10, 100, 1000] {
        let owners = generate_owners(&mut rng, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("derive", count), &owners, |b, owners| {
            b.iter(|| {
                for owner in owners {
                    black_box(derive_safe_address(black_box(*owner), factory));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark multisend packing by batch size.
fn bench_multisend(c: &mut Criterion) {
    let mut group = c.benchmark_group("multisend");
    let mut rng = rand::thread_rng();
    let multisend = ChainConfig::polygon().contracts.safe_multisend;

    for count in [2, 6, 20, 100] {
        let calls = generate_calls(&mut rng, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", count), &calls, |b, calls| {
            b.iter(|| black_box(aggregate_transactions(black_box(calls), multisend)))
        });
    }

    let approvals = approval_transactions(&ChainConfig::polygon().contracts);
    group.bench_function("approvals", |b| {
        b.iter(|| black_box(aggregate_transactions(black_box(&approvals), multisend)))
    });

    group.finish();
}

/// Benchmark the rounding primitives over a batch of prices.
fn bench_rounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("rounding");
    let mut rng = rand::thread_rng();
    let prices = generate_prices(&mut rng, 1000);
    group.throughput(Throughput::Elements(prices.len() as u64));

    for tick in TickSize::ALL {
        let profile = tick.rounding_profile();
        group.bench_with_input(BenchmarkId::new("normal", tick.as_str()), &prices, |b, prices| {
            b.iter(|| {
                for price in prices {
                    black_box(round_normal(black_box(*price), profile.price));
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("down", tick.as_str()), &prices, |b, prices| {
            b.iter(|| {
                for price in prices {
                    black_box(round_down(black_box(*price), profile.price));
                }
            })
        });
    }

    let amounts: Vec<Decimal> = prices
        .iter()
        .map(|p| *p * Decimal::new(12345, 2))
        .collect();
    group.bench_with_input(BenchmarkId::new("fit_amount", 4), &amounts, |b, amounts| {
        b.iter(|| {
            for amount in amounts {
                black_box(fit_amount(black_box(*amount), 4));
            }
        })
    });

    group.finish();
}

/// Benchmark tick-size price validation.
fn bench_price_validation(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let prices = generate_prices(&mut rng, 1000);

    c.bench_function("price_validation", |b| {
        b.iter(|| {
            prices
                .iter()
                .filter(|price| TickSize::Thousandth.is_valid_price(**price))
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_safe_derivation,
    bench_multisend,
    bench_rounding,
    bench_price_validation,
);

criterion_main!(benches);
