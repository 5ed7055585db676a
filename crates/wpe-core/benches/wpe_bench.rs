//! Criterion benchmarks for wpe-core
//!
//! Run with: cargo bench -p wpe-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wpe_core::{BinPredictor, Dereverberator, MultichannelSignal, Stft, StftConfig, WpeConfig};

const SAMPLE_RATE: usize = 16000;

/// Generate white noise
fn generate_noise(size: usize, seed: u32) -> Vec<f64> {
    let mut state = seed;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as i32 as f64) / (i32::MAX as f64)
        })
        .collect()
}

fn generate_mics(channels: usize, seconds: usize) -> MultichannelSignal {
    let channels = (0..channels)
        .map(|c| generate_noise(seconds * SAMPLE_RATE, 0x1234_5678 + c as u32))
        .collect();
    MultichannelSignal::new(channels).expect("equal-length channels")
}

// ============================================================================
// Framer
// ============================================================================

fn bench_stft(c: &mut Criterion) {
    let mut group = c.benchmark_group("STFT");
    let signal = generate_mics(3, 2);

    for &frame_size in &[256usize, 512, 1024] {
        let stft = Stft::new(StftConfig::new(frame_size, 0.5)).expect("valid config");
        let tensor = stft.analyze(&signal).expect("long enough");

        group.bench_with_input(
            BenchmarkId::new("analyze", frame_size),
            &frame_size,
            |b, _| b.iter(|| black_box(stft.analyze(black_box(&signal)))),
        );
        group.bench_with_input(
            BenchmarkId::new("synthesize", frame_size),
            &frame_size,
            |b, _| b.iter(|| black_box(stft.synthesize(black_box(&tensor)))),
        );
    }

    group.finish();
}

// ============================================================================
// Bin predictor
// ============================================================================

fn bench_bin_predictor(c: &mut Criterion) {
    let mut group = c.benchmark_group("NDLP_Bin");
    let signal = generate_mics(3, 4);
    let stft = Stft::new(StftConfig::new(512, 0.5)).expect("valid config");
    let tensor = stft.analyze(&signal).expect("long enough");
    let bin = tensor.bin_matrix(64);

    for &order in &[5usize, 10, 30] {
        let predictor = BinPredictor::new(order, 2, 2, 2).expect("valid predictor");
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, _| {
            b.iter(|| black_box(predictor.predict(black_box(&bin))))
        });
    }

    group.finish();
}

// ============================================================================
// Full run
// ============================================================================

fn bench_dereverberate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dereverberate");
    group.sample_size(10);
    let signal = generate_mics(3, 4);

    for &order in &[10usize, 30] {
        let wpe = Dereverberator::new(WpeConfig::new(3, 2).with_order(order))
            .expect("valid config");
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, _| {
            b.iter(|| black_box(wpe.run(black_box(&signal))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stft, bench_bin_predictor, bench_dereverberate);
criterion_main!(benches);
