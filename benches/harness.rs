//! Harness overhead benchmarks: how much the timing wrapper and the summary
//! reduction add on top of the operation being measured.
//!
//! Run: `cargo bench --bench harness`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recipe_crud_bench::harness::{measure, run_with_reset, summarize, ResetPhase};

fn measure_noop(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness/measure");
    group.throughput(Throughput::Elements(1));

    group.bench_function("ok", |b| {
        b.iter(|| measure("noop", || Ok::<_, String>(black_box(1u64))));
    });
    group.bench_function("err", |b| {
        b.iter(|| measure("noop", || Err::<u64, _>(black_box("fail"))));
    });
    group.finish();
}

fn summarize_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness/summarize");

    for n in [10usize, 100, 10_000] {
        let samples: Vec<f64> = (0..n).map(|i| 0.01 + (i % 7) as f64 * 0.001).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &samples, |b, s| {
            b.iter(|| summarize(black_box(s)).unwrap());
        });
    }
    group.finish();
}

fn reset_loop(c: &mut Criterion) {
    c.bench_function("harness/run_with_reset/100", |b| {
        b.iter(|| {
            let mut state = 0u64;
            run_with_reset(
                "noop",
                100,
                &mut state,
                ResetPhase::After,
                |s: &mut u64| {
                    *s = 0;
                    Ok::<_, String>(())
                },
                |s: &mut u64| {
                    *s += 1;
                    Ok::<_, String>(*s)
                },
            )
        });
    });
}

criterion_group!(benches, measure_noop, summarize_samples, reset_loop);
criterion_main!(benches);
