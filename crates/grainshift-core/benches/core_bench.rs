//! Criterion benchmarks for grainshift-core primitives
//!
//! Run with: cargo bench -p grainshift-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use grainshift_core::{
    ChannelBuffer, DryWetMix, MeterKind, MeterMode, Meters, MixControls, MixLaw, Oversampler,
    SmoothedBlock, cubic_hermite_wrapped,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 512, 1024];

fn stereo_block(size: usize) -> ChannelBuffer {
    let mut buf = ChannelBuffer::new(2, size);
    buf.set_len(size);
    for ch in 0..2 {
        for (i, x) in buf.channel_mut(ch).iter_mut().enumerate() {
            let t = i as f32 / SAMPLE_RATE;
            *x = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        }
    }
    buf
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("SmoothedBlock");
    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("process_block", block_size),
            &block_size,
            |b, &n| {
                let mut smooth = SmoothedBlock::new(0.0);
                smooth.prepare(SAMPLE_RATE, n, 20.0);
                let mut target = 0.0;
                b.iter(|| {
                    target = 1.0 - target;
                    black_box(smooth.process_block(black_box(target), n));
                });
            },
        );
    }
    group.finish();
}

fn bench_dry_wet(c: &mut Criterion) {
    let mut group = c.benchmark_group("DryWetMix");
    let controls = MixControls {
        gain_in_db: Some(3.0),
        mix: 0.5,
        gain_out_db: -3.0,
        polarity_inverted: false,
        unity_gain: Some(1.0),
    };
    for &block_size in BLOCK_SIZES {
        let input = stereo_block(block_size);
        group.bench_with_input(
            BenchmarkId::new("full_cycle", block_size),
            &block_size,
            |b, &n| {
                let mut mixer = DryWetMix::new(MixLaw::EqualPower, 20.0);
                mixer.prepare(SAMPLE_RATE, n, 7);
                let mut buf = input.clone();
                b.iter(|| {
                    buf.copy_from(&input);
                    mixer.save_dry(&mut buf, &controls);
                    mixer.process_out_gain(&mut buf);
                    mixer.process_mix(&mut buf);
                    black_box(buf.channel(0)[0]);
                });
            },
        );
    }
    group.finish();
}

fn bench_oversampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oversampler");
    for &block_size in BLOCK_SIZES {
        let input = stereo_block(block_size);
        group.bench_with_input(
            BenchmarkId::new("round_trip", block_size),
            &block_size,
            |b, &n| {
                let mut ovs = Oversampler::new(true);
                ovs.prepare(SAMPLE_RATE, n);
                let mut buf = input.clone();
                b.iter(|| {
                    buf.copy_from(&input);
                    ovs.upsample(&buf);
                    ovs.downsample(&mut buf);
                    black_box(buf.channel(1)[n - 1]);
                });
            },
        );
    }
    group.finish();
}

fn bench_meters(c: &mut Criterion) {
    let input = stereo_block(512);
    c.bench_function("Meters/rms_512", |b| {
        let mut meters = Meters::new(MeterMode::Rms, 30.0);
        meters.prepare(SAMPLE_RATE, 512);
        b.iter(|| {
            meters.begin_block(512);
            meters.process(MeterKind::Output, black_box(&input));
        });
    });
}

fn bench_interpolation(c: &mut Criterion) {
    let ring: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.013).sin()).collect();
    c.bench_function("cubic_hermite_wrapped/1024_reads", |b| {
        b.iter(|| {
            let mut pos = 0.37_f32;
            let mut acc = 0.0;
            for _ in 0..1024 {
                acc += cubic_hermite_wrapped(&ring, pos);
                pos += 3.71;
            }
            black_box(acc)
        });
    });
}

criterion_group!(
    benches,
    bench_smoothing,
    bench_dry_wet,
    bench_oversampler,
    bench_meters,
    bench_interpolation
);
criterion_main!(benches);
