//! Latency benchmarks for the hot path of order submission.
//!
//! Run with: `cargo bench --bench latency`

use std::sync::Arc;

use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use polymarket_core::auth::{build_hmac_signature, create_l2_headers, ApiKeyCreds, L2HeaderArgs};
use polymarket_core::config::ChainConfig;
use polymarket_core::rounding::TickSize;
use polymarket_core::signing::{LocalSigner, OrderSigner};
use polymarket_core::types::{OrderType, UserOrder};

const BENCH_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const BENCH_SECRET: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

fn order_signer() -> OrderSigner {
    let local = LocalSigner::from_private_key(BENCH_PRIVATE_KEY).expect("valid bench key");
    let address = local.address();
    OrderSigner::new(Arc::new(local), address, ChainConfig::polygon())
}

/// Synthetic BUY order at `price`.
fn generate_order(price: Decimal) -> UserOrder {
    UserOrder::buy(
        "71321045679252212594626385532706912750332728571942532289631379312455583992563",
        price,
        Decimal::new(12345, 2),
    )
    .with_fee_rate_bps(0)
    .with_nonce(0)
}

/// Benchmark order construction (rounding and amount scaling) per tick size.
fn bench_order_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_build");
    let signer = order_signer();

    for (tick, price) in [
        (TickSize::Tenth, Decimal::new(5, 1)),
        (TickSize::Hundredth, Decimal::new(56, 2)),
        (TickSize::Thousandth, Decimal::new(563, 3)),
        (TickSize::TenThousandth, Decimal::new(5637, 4)),
    ] {
        let order = generate_order(price);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("limit", tick.as_str()), &order, |b, order| {
            b.iter(|| {
                black_box(
                    signer
                        .order_builder()
                        .build(black_box(order), OrderType::Gtc, tick),
                )
            })
        });
        group.bench_with_input(BenchmarkId::new("market", tick.as_str()), &order, |b, order| {
            b.iter(|| {
                black_box(
                    signer
                        .order_builder()
                        .build(black_box(order), OrderType::Fok, tick),
                )
            })
        });
    }

    group.finish();
}

/// Benchmark EIP-712 digest computation for a built order.
fn bench_order_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_digest");
    let signer = order_signer();
    let data = signer
        .order_builder()
        .build(&generate_order(Decimal::new(56, 2)), OrderType::Gtc, TickSize::Hundredth)
        .expect("valid bench order");

    for neg_risk in [false, true] {
        group.bench_with_input(BenchmarkId::new("digest", neg_risk), &data, |b, data| {
            b.iter(|| black_box(signer.order_digest(black_box(data), neg_risk)))
        });
    }

    group.finish();
}

/// Benchmark the full build-and-sign path with a local key.
fn bench_order_sign(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let signer = order_signer();
    let order = generate_order(Decimal::new(56, 2));

    c.bench_function("order_sign", |b| {
        b.to_async(&runtime).iter(|| {
            let (signer, order) = (&signer, &order);
            async move {
                black_box(
                    signer
                        .create_order(black_box(order), OrderType::Gtc, TickSize::Hundredth, false)
                        .await,
                )
            }
        })
    });
}

/// Benchmark HMAC signing of L2 requests by body size.
fn bench_hmac(c: &mut Criterion) {
    let mut group = c.benchmark_group("l2_hmac");

    for size in [0usize, 256, 1024, 4096] {
        let body = "x".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("signature", size), &body, |b, body| {
            b.iter(|| {
                black_box(build_hmac_signature(
                    BENCH_SECRET,
                    "1700000000",
                    "POST",
                    "/order",
                    Some(black_box(body.as_str())),
                ))
            })
        });
    }

    let creds = ApiKeyCreds::new("key", BENCH_SECRET, "pass");
    let args = L2HeaderArgs::new("POST", "/order").with_body(r#"{"orderType":"GTC"}"#);
    group.bench_function("headers", |b| {
        b.iter(|| {
            black_box(create_l2_headers(
                Address::ZERO,
                black_box(&creds),
                black_box(&args),
                Some(1_700_000_000),
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_order_build,
    bench_order_digest,
    bench_order_sign,
    bench_hmac,
);

criterion_main!(benches);
