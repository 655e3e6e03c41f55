//! Benchmarks for modal evaluation and timer-driven transitions.
//!
//! Run with: `cargo bench --package fmodal --bench lifecycle_bench`
//!
//! # Performance Baselines
//!
//! - Steady-state re-evaluation (no transition)
//! - Full animated open/close cycle on a manual clock
//! - Escape dispatch through the global event target with N mounted modals

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fmodal::{Event, Host, KeyCode, ModalConfig, ModalController};

// ============================================================================
// Evaluation
// ============================================================================

fn bench_steady_evaluate(c: &mut Criterion) {
    let host = Host::manual();
    let modal: ModalController = ModalController::new(&host);
    modal.evaluate(ModalConfig::new().open(true));

    c.bench_function("lifecycle/evaluate_steady", |b| {
        b.iter(|| black_box(modal.evaluate(ModalConfig::new().open(black_box(true))).state));
    });
}

fn bench_animated_cycle(c: &mut Criterion) {
    let host = Host::manual();
    let modal: ModalController = ModalController::new(&host);
    let config = |open| {
        ModalConfig::new()
            .open(open)
            .animated(true)
            .animation_duration_ms(100)
    };
    modal.evaluate(config(false));

    c.bench_function("lifecycle/animated_cycle", |b| {
        b.iter(|| {
            modal.evaluate(config(true));
            host.advance(Duration::from_millis(100));
            modal.refresh();
            modal.evaluate(config(false));
            host.advance(Duration::from_millis(100));
            black_box(modal.refresh().state)
        });
    });
}

// ============================================================================
// Dispatch
// ============================================================================

fn bench_escape_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle/escape_dispatch");
    for count in [1usize, 16, 256] {
        let host = Host::manual();
        let modals: Vec<ModalController> = (0..count)
            .map(|_| {
                let modal = ModalController::new(&host);
                modal.evaluate(ModalConfig::new().open(true).on_close(|e| {
                    black_box(e);
                }));
                modal
            })
            .collect();
        let escape = Event::key(KeyCode::Escape);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &escape, |b, event| {
            b.iter(|| black_box(host.dispatch(event)));
        });
        drop(modals);
    }
    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_steady_evaluate,
    bench_animated_cycle,
    bench_escape_dispatch,
);

criterion_main!(benches);
