//! Benchmark for click handling.
//!
//! TARGET: classification well under a frame (16 ms) for rounds with
//! hundreds of differences
//!
//! Run with: cargo bench --package spotdiff --bench click_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use spotdiff::ranking::MemoryStore;
use spotdiff::shared::{DifferenceTarget, ImageGeometry, Point, PointerDown, RoundSet, RoundSpec};
use spotdiff::{classify, GameConfig, RoundEngine, RoundState, SessionContext};

fn grid_targets(side: u32) -> Vec<DifferenceTarget> {
    (0..side * side)
        .map(|i| DifferenceTarget {
            x: f64::from(i % side) * 100.0 + 50.0,
            y: f64::from(i / side) * 100.0 + 50.0,
        })
        .collect()
}

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for side in [3u32, 10, 30] {
        let targets = grid_targets(side);
        let state = RoundState::new(0, 90);
        group.throughput(Throughput::Elements(u64::from(side * side)));

        group.bench_function(format!("{}_targets", side * side), |b| {
            let mut i = 0u32;
            b.iter(|| {
                i = i.wrapping_add(7);
                let at = Point::new(f64::from(i % 1000), f64::from(i.wrapping_mul(13) % 1000));
                black_box(classify(black_box(&targets), &state, at, 30.0))
            });
        });
    }

    group.finish();
}

fn benchmark_pointer_down(c: &mut Criterion) {
    let geometry = ImageGeometry::identity(1000.0, 1000.0);

    c.bench_function("pointer_down_miss", |b| {
        b.iter_batched(
            || {
                let rounds = RoundSet::new(vec![RoundSpec { targets: grid_targets(5) }])
                    .unwrap_or_else(|e| panic!("bench dataset: {e}"));
                let session = SessionContext::new("bench", MemoryStore::new());
                RoundEngine::new(GameConfig::default(), rounds, session)
                    .unwrap_or_else(|e| panic!("bench config: {e}"))
            },
            |mut engine| {
                // Nine misses drain the clock from 90 to 0
                for _ in 0..9 {
                    let _ = black_box(
                        engine.handle_pointer_down(PointerDown::new(999.0, 999.0), &geometry),
                    );
                }
                engine
            },
            criterion::BatchSize::SmallInput,
        );
    });

    c.bench_function("advance_full_round", |b| {
        b.iter_batched(
            || {
                let rounds = RoundSet::new(vec![RoundSpec { targets: grid_targets(3) }])
                    .unwrap_or_else(|e| panic!("bench dataset: {e}"));
                let session = SessionContext::new("bench", MemoryStore::new());
                RoundEngine::new(GameConfig::default(), rounds, session)
                    .unwrap_or_else(|e| panic!("bench config: {e}"))
            },
            |mut engine| {
                black_box(engine.advance_by(91_000));
                engine
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, benchmark_classify, benchmark_pointer_down);
criterion_main!(benches);
