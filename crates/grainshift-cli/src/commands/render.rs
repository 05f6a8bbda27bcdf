//! Offline rendering through the full processor.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use grainshift_core::linear_to_db;
use grainshift_engine::{EngineState, Processor};
use grainshift_params::ParamError;

use crate::wav::{self, Audio};

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Engine config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Saved engine state (JSON) applied before any --param
    #[arg(long)]
    state: Option<PathBuf>,

    /// Parameter as name=value, value in display units (e.g. "tunesemi=12", "mix=50%")
    #[arg(short, long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Host block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Trim the reported latency so output lines up with input
    #[arg(long)]
    compensate_latency: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("invalid parameter '{s}' (expected name=value)")),
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth {} (use 16, 24 or 32)", args.bit_depth);
    }
    if args.block_size == 0 {
        anyhow::bail!("block size must be at least 1");
    }

    let config = super::load_config(args.config.as_deref())?;
    let input = wav::read(&args.input)?;
    println!(
        "Read {}: {} frames, {} ch, {} Hz",
        args.input.display(),
        input.frames(),
        input.channels.len(),
        input.sample_rate
    );

    let mut processor = Processor::new(config);
    if let Some(path) = &args.state {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading state {}", path.display()))?;
        let state: EngineState = serde_json::from_str(&text)
            .with_context(|| format!("parsing state {}", path.display()))?;
        let applied = processor.handle().restore_state(&state);
        println!("Restored {applied} parameters from {}", path.display());
    }
    for (key, value) in &args.param {
        let param = processor
            .params()
            .lookup(key)
            .with_context(|| format!("--param {key}"))?;
        let normalized = param
            .try_value_for_text(value)
            .map_err(|e| ParamError::invalid_text(key.as_str(), e))?;
        param.set_value(normalized);
        println!("  {} = {}", param.name(), param.text(normalized));
    }

    let output = render(&mut processor, &input, args.block_size, args.compensate_latency);
    print_stats("Input", &input);
    print_stats("Output", &output);

    wav::write(&args.output, &output, args.bit_depth)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

/// Process `input` in blocks of `block_size`, optionally trimming latency.
pub fn render<E: grainshift_engine::WetEffect>(
    processor: &mut Processor<E>,
    input: &Audio,
    block_size: usize,
    compensate_latency: bool,
) -> Audio {
    let latency = processor.prepare(input.sample_rate as f32, block_size);
    tracing::info!(latency, block_size, "rendering");

    let tail = if compensate_latency { latency } else { 0 };
    let frames = input.frames();
    let mut channels: Vec<Vec<f32>> = input
        .channels
        .iter()
        .map(|c| {
            let mut padded = c.clone();
            padded.resize(frames + tail, 0.0);
            padded
        })
        .collect();

    let total = frames + tail;
    let mut offset = 0;
    while offset < total {
        let end = (offset + block_size).min(total);
        let mut block: Vec<&mut [f32]> =
            channels.iter_mut().map(|c| &mut c[offset..end]).collect();
        processor.process(&mut block, &[]);
        offset = end;
    }

    for channel in &mut channels {
        channel.drain(..tail);
    }
    Audio {
        channels,
        sample_rate: input.sample_rate,
    }
}

fn print_stats(label: &str, audio: &Audio) {
    let samples = audio.channels.iter().flatten();
    let count = audio.frames() * audio.channels.len();
    let peak = samples.clone().fold(0.0_f32, |m, s| m.max(s.abs()));
    let rms = if count == 0 {
        0.0
    } else {
        (samples.map(|s| s * s).sum::<f32>() / count as f32).sqrt()
    };
    println!(
        "{label}: peak {:.1} dB, rms {:.1} dB",
        linear_to_db(peak),
        linear_to_db(rms)
    );
}
