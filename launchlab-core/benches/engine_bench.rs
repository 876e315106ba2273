//! Criterion benchmarks for LaunchLab hot paths.
//!
//! Benchmarks:
//! 1. Full simulation over a synthetic market
//! 2. Conviction scoring in isolation
//! 3. Quote book construction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use launchlab_core::domain::{Params, QuoteBook};
use launchlab_core::engine::{conviction, run_simulation, TradeSettings};
use launchlab_core::synthetic::{synthetic_market, SyntheticConfig};

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_simulation");
    for mints in [10usize, 50, 200] {
        let config = SyntheticConfig {
            mints,
            ..SyntheticConfig::default()
        };
        let (events, quotes) = synthetic_market(&config);
        let book = QuoteBook::from_quotes(quotes);
        let params = Params::with_defaults();
        let settings = TradeSettings::default();

        group.bench_with_input(BenchmarkId::from_parameter(mints), &mints, |b, _| {
            b.iter(|| {
                black_box(run_simulation(
                    black_box(&events),
                    black_box(&book),
                    &params,
                    &settings,
                ))
            })
        });
    }
    group.finish();
}

fn bench_conviction(c: &mut Criterion) {
    let (events, _) = synthetic_market(&SyntheticConfig::default());
    let snapshots: Vec<_> = events.values().flatten().cloned().collect();
    let params = Params::with_defaults();

    c.bench_function("conviction_batch", |b| {
        b.iter(|| {
            let mut total = 0i64;
            for snapshot in &snapshots {
                total += conviction(black_box(snapshot), &params) as i64;
            }
            black_box(total)
        })
    });
}

fn bench_quote_book(c: &mut Criterion) {
    let (_, quotes) = synthetic_market(&SyntheticConfig {
        mints: 100,
        ..SyntheticConfig::default()
    });

    c.bench_function("quote_book_build", |b| {
        b.iter(|| black_box(QuoteBook::from_quotes(black_box(quotes.clone()))))
    });
}

criterion_group!(benches, bench_simulation, bench_conviction, bench_quote_book);
criterion_main!(benches);
