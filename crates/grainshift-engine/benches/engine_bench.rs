//! Criterion benchmarks for the grainshift processor
//!
//! Run with: cargo bench -p grainshift-engine
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use grainshift_core::ChannelBuffer;
use grainshift_engine::{EngineConfig, GranularPitchShifter, Processor, ShiftControls, WetEffect};
use grainshift_params::ParamId;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 512, 1024];

fn sine(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE).sin() * 0.5)
        .collect()
}

fn bench_pitch_shifter(c: &mut Criterion) {
    let mut group = c.benchmark_group("GranularPitchShifter");
    for voices in [1, 3, 7] {
        group.bench_with_input(BenchmarkId::new("voices", voices), &voices, |b, &n| {
            let mut shifter = GranularPitchShifter::new(1000.0, 7);
            shifter.prepare(SAMPLE_RATE * 2.0, 1024);
            let controls = ShiftControls {
                tune: 7.0,
                voices: n,
                spread: 0.2,
                feedback: 0.3,
                ..ShiftControls::default()
            };
            let input = sine(1024);
            let mut buffer = ChannelBuffer::new(2, 1024);
            b.iter(|| {
                buffer.set_len(1024);
                buffer.channel_mut(0).copy_from_slice(&input);
                buffer.channel_mut(1).copy_from_slice(&input);
                shifter.process(black_box(&mut buffer), &controls);
            });
        });
    }
    group.finish();
}

fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("Processor");
    for &block_size in BLOCK_SIZES {
        for hq in [false, true] {
            let name = if hq { "hq" } else { "plain" };
            group.bench_with_input(BenchmarkId::new(name, block_size), &block_size, |b, &n| {
                let mut processor = Processor::new(EngineConfig::full());
                if let Some(param) = processor.params().get(ParamId::Hq) {
                    param.set_value(if hq { 1.0 } else { 0.0 });
                }
                processor.prepare(SAMPLE_RATE, n);
                let input = sine(n);
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    processor.process(
                        black_box(&mut [left.as_mut_slice(), right.as_mut_slice()]),
                        &[],
                    );
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_pitch_shifter, bench_processor);
criterion_main!(benches);
