//! The per-block signal path.
//!
//! ```text
//! host ─► MIDI learn ─► macro ─┬─ Power off ─► bypass (aligned dry) ─────────────────────────────► host
//!                              └─ save dry ─► [M/S] ─► upsample ─► effect ─► downsample ─► [M/S]
//!                                   ─► out gain ─► output meter ─► dry/wet mix ─► host
//! ```
//!
//! Buffers are sized in [`Processor::prepare`]. Host blocks longer than the
//! prepared maximum are split into chunks, which keeps dry/wet alignment
//! exact for any block length.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use grainshift_core::{
    ChannelBuffer, DryWetMix, MAX_CHANNELS, MeterKind, MeterLevels, Meters, MixControls,
    Oversampler, decode_mid_side, encode_mid_side,
};
use grainshift_params::{HostNotify, MacroProcessor, MidiEvent, MidiLearn, ParamId, Params};
use libm::rintf;

use crate::handle::{PREPARED_HQ, PREPARED_PLAIN, UNPREPARED};
use crate::{
    EngineConfig, EngineHandle, GranularPitchShifter, ProcessSuspender, RestartRequest,
    ShiftControls, WetEffect,
};

/// Called from `prepare` with the new total latency.
pub type LatencyListener = Box<dyn FnMut(usize) + Send>;

#[derive(Debug, Clone, Copy)]
struct BlockControls {
    power: bool,
    mid_side: bool,
    mix: MixControls,
    shift: ShiftControls,
}

/// Audio-thread pipeline around a [`WetEffect`].
///
/// # Example
///
/// ```rust
/// use grainshift_engine::{EngineConfig, Processor};
/// use grainshift_params::ParamId;
///
/// let mut processor = Processor::new(EngineConfig::default());
/// let latency = processor.prepare(48000.0, 512);
/// assert_eq!(latency, 7); // HQ on: the oversampler's round trip
///
/// let mut left = vec![0.0_f32; 512];
/// let mut right = vec![0.0_f32; 512];
/// processor.process(&mut [left.as_mut_slice(), right.as_mut_slice()], &[]);
///
/// let handle = processor.handle();
/// handle.params().get(ParamId::Hq).unwrap().set_value(0.0);
/// assert!(handle.tick()); // asks for a new prepare
/// assert_eq!(processor.prepare(48000.0, 512), 0);
/// ```
pub struct Processor<E: WetEffect = GranularPitchShifter> {
    config: EngineConfig,
    params: Arc<Params>,
    macro_processor: MacroProcessor,
    midi_learn: Arc<MidiLearn>,
    suspender: ProcessSuspender,
    oversampling: Arc<AtomicU8>,
    mixer: DryWetMix,
    meters: Meters,
    oversampler: Oversampler,
    effect: E,
    buffer: ChannelBuffer,
    sample_rate: f32,
    max_block: usize,
    latency: usize,
    oversize_warned: bool,
    restart_request: Option<RestartRequest>,
    latency_listener: Option<LatencyListener>,
}

impl<E: WetEffect> core::fmt::Debug for Processor<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Processor")
            .field("sample_rate", &self.sample_rate)
            .field("max_block", &self.max_block)
            .field("latency", &self.latency)
            .field("oversampling", &self.oversampler.is_enabled())
            .field("suspended", &self.suspender.is_suspended())
            .finish_non_exhaustive()
    }
}

impl Processor<GranularPitchShifter> {
    /// Build with the granular pitch shifter sized from the layout.
    pub fn new(config: EngineConfig) -> Self {
        let effect = GranularPitchShifter::new(
            config.layout.max_grain_ms,
            config.layout.max_voices as usize,
        );
        Self::with_effect(config, effect)
    }
}

impl<E: WetEffect> Processor<E> {
    /// Build around a custom wet effect.
    pub fn with_effect(config: EngineConfig, effect: E) -> Self {
        Self::from_parts(config, effect, None)
    }

    /// Build with a host-notify callback for UI-originated parameter changes.
    pub fn from_parts(config: EngineConfig, effect: E, host_notify: Option<HostNotify>) -> Self {
        let params = Arc::new(Params::with_host_notify(&config.layout, host_notify));
        let hq = params.get(ParamId::Hq).is_some_and(|p| p.value() > 0.5);
        Self {
            macro_processor: MacroProcessor::new(Arc::clone(&params)),
            midi_learn: Arc::new(MidiLearn::new(Arc::clone(&params))),
            suspender: ProcessSuspender::new(),
            oversampling: Arc::new(AtomicU8::new(UNPREPARED)),
            mixer: DryWetMix::new(config.mix_law.into(), config.smoothing_ms),
            meters: Meters::new(config.meters.mode.into(), config.meters.refresh_rate_hz),
            oversampler: Oversampler::new(hq),
            effect,
            buffer: ChannelBuffer::new(MAX_CHANNELS, 0),
            sample_rate: 0.0,
            max_block: 0,
            latency: 0,
            oversize_warned: false,
            restart_request: None,
            latency_listener: None,
            params,
            config,
        }
    }

    /// Callback the UI handle uses to ask the host for a new `prepare`.
    ///
    /// Set before taking handles; existing handles keep their callback.
    pub fn with_restart_request(mut self, restart: RestartRequest) -> Self {
        self.restart_request = Some(restart);
        self
    }

    /// Callback told the total latency after every `prepare`.
    pub fn with_latency_listener(mut self, listener: LatencyListener) -> Self {
        self.latency_listener = Some(listener);
        self
    }

    /// Whether a bus layout with these channel counts can be processed.
    pub fn supports_channels(inputs: usize, outputs: usize) -> bool {
        inputs == outputs && (1..=MAX_CHANNELS).contains(&inputs)
    }

    /// Configuration this processor was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registered parameters.
    pub fn params(&self) -> &Arc<Params> {
        &self.params
    }

    /// MIDI learn bindings.
    pub fn midi_learn(&self) -> &Arc<MidiLearn> {
        &self.midi_learn
    }

    /// Published meter levels.
    pub fn meter_levels(&self) -> Arc<MeterLevels> {
        self.meters.levels()
    }

    /// Shared suspend flag.
    pub fn suspender(&self) -> &ProcessSuspender {
        &self.suspender
    }

    /// Handle for the UI thread.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            params: Arc::clone(&self.params),
            midi_learn: Arc::clone(&self.midi_learn),
            levels: self.meters.levels(),
            suspender: self.suspender.clone(),
            oversampling: Arc::clone(&self.oversampling),
            restart_request: self.restart_request.clone(),
        }
    }

    /// UI timer hook; see [`EngineHandle::tick`].
    pub fn ui_tick(&self) -> bool {
        self.handle().tick()
    }

    /// The wet effect.
    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// The wet effect, mutably.
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Total latency reported by the last `prepare`.
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Host sample rate of the last `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Largest block the pipeline processes in one pass.
    pub fn max_block(&self) -> usize {
        self.max_block
    }

    /// Whether the current preparation oversamples.
    pub fn is_oversampling(&self) -> bool {
        self.oversampler.is_enabled()
    }

    /// Size every stage for `sample_rate` and `max_block`, clear the suspend
    /// flag and return the total latency in host samples.
    ///
    /// Not real-time safe. The host must not call `process` concurrently.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) -> usize {
        let max_block = max_block.max(1);
        let hq = self
            .params
            .get(ParamId::Hq)
            .is_some_and(|p| p.value() > 0.5);

        self.oversampler.set_enabled(hq);
        self.oversampler.prepare(sample_rate, max_block);
        self.effect
            .prepare(self.oversampler.fs_up(), self.oversampler.block_size_up());
        let latency = self.oversampler.latency()
            + self.effect.latency_samples().div_ceil(self.oversampler.factor());

        self.mixer.prepare(sample_rate, max_block, latency);
        self.meters.prepare(sample_rate, max_block);
        self.buffer.resize(max_block);
        self.sample_rate = sample_rate;
        self.max_block = max_block;
        self.latency = latency;
        self.oversize_warned = false;
        self.oversampling.store(
            if self.oversampler.is_enabled() { PREPARED_HQ } else { PREPARED_PLAIN },
            Ordering::Release,
        );
        self.suspender.resume();

        tracing::info!(
            sample_rate,
            max_block,
            oversampling = self.oversampler.is_enabled(),
            latency,
            "processor prepared"
        );
        if let Some(listener) = &mut self.latency_listener {
            listener(latency);
        }
        latency
    }

    /// Drop all signal history without reallocating.
    pub fn reset(&mut self) {
        self.effect.reset();
        if self.max_block > 0 {
            self.mixer
                .prepare(self.sample_rate, self.max_block, self.latency);
            self.oversampler.prepare(self.sample_rate, self.max_block);
        }
    }

    /// Process one host block in place.
    ///
    /// Up to two channels are processed; further channels are left alone.
    /// While suspended, or before the first `prepare`, audio passes through
    /// untouched.
    pub fn process(&mut self, channels: &mut [&mut [f32]], midi: &[MidiEvent]) {
        let num_channels = channels.len().min(MAX_CHANNELS);
        let total = channels[..num_channels]
            .iter()
            .map(|ch| ch.len())
            .min()
            .unwrap_or(0);
        if total == 0 || self.max_block == 0 || self.suspender.is_suspended() {
            return;
        }

        self.midi_learn.process(midi);
        self.macro_processor.apply();
        let controls = self.read_controls();

        if total > self.max_block && !self.oversize_warned {
            tracing::warn!(
                block = total,
                max_block = self.max_block,
                "host block exceeds prepared maximum, splitting"
            );
            self.oversize_warned = true;
        }

        let host = &mut channels[..num_channels];
        let mut offset = 0;
        while offset < total {
            let len = (total - offset).min(self.max_block);
            self.process_chunk(host, offset, len, &controls);
            offset += len;
        }
    }

    fn process_chunk(
        &mut self,
        host: &mut [&mut [f32]],
        offset: usize,
        len: usize,
        controls: &BlockControls,
    ) {
        let n = self.buffer.load_from(host, offset, len);
        self.meters.begin_block(n);
        let meter_input = self.config.layout.gain_in;

        if !controls.power {
            self.mixer.process_bypass(&mut self.buffer);
            if meter_input {
                self.meters.process(MeterKind::Input, &self.buffer);
            }
            self.meters.process(MeterKind::Output, &self.buffer);
            self.buffer.store_into(host, offset);
            return;
        }

        self.mixer.save_dry(&mut self.buffer, &controls.mix);
        if meter_input {
            self.meters.process(MeterKind::Input, &self.buffer);
        }
        let mid_side = controls.mid_side && self.buffer.num_channels() == MAX_CHANNELS;
        if mid_side && let Some((l, r)) = self.buffer.stereo_mut() {
            encode_mid_side(l, r);
        }

        let up = self.oversampler.upsample(&self.buffer);
        self.effect.process(up, &controls.shift);
        self.oversampler.downsample(&mut self.buffer);

        if mid_side && let Some((m, s)) = self.buffer.stereo_mut() {
            decode_mid_side(m, s);
        }
        self.mixer.process_out_gain(&mut self.buffer);
        self.meters.process(MeterKind::Output, &self.buffer);
        self.mixer.process_mix(&mut self.buffer);
        self.buffer.store_into(host, offset);
    }

    fn denorm(&self, id: ParamId, absent: f32) -> f32 {
        self.params.value_mod_denorm(id).unwrap_or(absent)
    }

    fn switch(&self, id: ParamId, absent: bool) -> bool {
        self.params.value_mod(id).map_or(absent, |v| v > 0.5)
    }

    fn read_controls(&self) -> BlockControls {
        let gain_in_db = self.params.value_mod_denorm(ParamId::GainIn);
        let unity_gain = self.params.value_mod(ParamId::UnityGain);
        let mix = MixControls {
            gain_in_db,
            mix: self.denorm(ParamId::Mix, 1.0),
            gain_out_db: self.denorm(ParamId::GainOut, 0.0),
            polarity_inverted: self.switch(ParamId::Polarity, false),
            unity_gain,
        };
        let shift = ShiftControls {
            tune: rintf(self.denorm(ParamId::TuneSemi, 0.0)) + self.denorm(ParamId::TuneFine, 0.0),
            grain_size_ms: self.denorm(ParamId::GrainSize, ShiftControls::default().grain_size_ms),
            feedback: self.denorm(ParamId::Feedback, 0.0),
            voices: rintf(self.denorm(ParamId::NumVoices, 1.0)).max(1.0) as usize,
            spread: self.denorm(ParamId::SpreadTune, 0.0),
        };
        BlockControls {
            // bypass only strictly below half
            power: self
                .params
                .value_mod(ParamId::Power)
                .is_none_or(|v| v >= 0.5),
            mid_side: self.switch(ParamId::StereoConfig, false),
            mix,
            shift,
        }
    }
}
