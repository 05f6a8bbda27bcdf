//! Planar WAV reading and writing.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Decoded audio, one `Vec` per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    /// Channel data, all the same length.
    pub channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Audio {
    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Read a WAV file, keeping at most the first two channels.
pub fn read(path: &Path) -> anyhow::Result<Audio> {
    let reader =
        WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let num_channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let kept = num_channels.min(2);
    if num_channels > kept {
        tracing::warn!(channels = num_channels, "keeping only the first two channels");
    }
    let mut channels = vec![Vec::with_capacity(interleaved.len() / num_channels); kept];
    for frame in interleaved.chunks_exact(num_channels) {
        for (ch, out) in channels.iter_mut().enumerate() {
            out.push(frame[ch]);
        }
    }
    Ok(Audio {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write planar audio at `bits` per sample (16, 24 or 32-bit float).
pub fn write(path: &Path, audio: &Audio, bits: u16) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: u16::try_from(audio.channels.len()).context("too many channels")?,
        sample_rate: audio.sample_rate,
        bits_per_sample: bits,
        sample_format: if bits == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    let max_val = (1i64 << (bits - 1)) as f32;
    for i in 0..audio.frames() {
        for channel in &audio.channels {
            let sample = channel[i];
            if bits == 32 {
                writer.write_sample(sample)?;
            } else {
                writer.write_sample((sample * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
