//! Benchmarks for duplicate detection.
//!
//! Measures the hot path (recording keys) against the operations that walk
//! the whole log (reconfiguration, truncation and snapshots).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use keyrepeat::{DuplicateDetector, Key};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// A typing-like stream: mostly distinct keys with occasional fast repeats
fn keystrokes(len: usize) -> Vec<(Key, u64)> {
    let text = "the quick brown fox jumps over the lazy dog ";
    let mut now = 0u64;
    text.chars()
        .cycle()
        .take(len)
        .enumerate()
        .map(|(i, c)| {
            now += if i % 7 == 0 { 15 } else { 120 };
            (Key::from_char(c), now)
        })
        .collect()
}

fn filled(len: usize) -> DuplicateDetector {
    let mut detector = DuplicateDetector::new();
    for (key, timestamp) in keystrokes(len) {
        detector.record_event(key, timestamp).unwrap();
    }
    detector
}

fn bench_record_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_event");
    for size in SIZES {
        let stream = keystrokes(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &stream, |b, stream| {
            b.iter(|| {
                let mut detector = DuplicateDetector::new();
                for &(key, timestamp) in stream {
                    black_box(detector.record_event(key, timestamp).unwrap());
                }
                detector
            })
        });
    }
    group.finish();
}

fn bench_reconfigure_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfigure_window");
    for size in SIZES {
        let detector = filled(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &detector, |b, detector| {
            b.iter_batched(
                || detector.clone(),
                |mut detector| {
                    detector.reconfigure_window(black_box(250)).unwrap();
                    detector
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_truncate(c: &mut Criterion) {
    let mut group = c.benchmark_group("truncate_to");
    for size in SIZES {
        let detector = filled(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &detector, |b, detector| {
            b.iter_batched(
                || detector.clone(),
                |mut detector| {
                    detector.truncate_to(black_box(size / 2)).unwrap();
                    detector
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");
    for size in SIZES {
        let detector = filled(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &detector, |b, detector| {
            b.iter(|| black_box(detector.stats()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_record_event,
    bench_reconfigure_window,
    bench_truncate,
    bench_stats
);
criterion_main!(benches);
