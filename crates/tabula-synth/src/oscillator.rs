//! Wavetable oscillator with unison and an amplitude envelope.
//!
//! Each [`Oscillator`] plays one note: it reads a shared [`Wavetable`] at a
//! (possibly fractional) frame position, stacks up to
//! [`MAX_DETUNE_VOICES`] detuned copies of itself, and shapes the result with
//! its own [`AdsrEnvelope`]. Output is accumulated into a [`StereoBlock`]
//! with an equal-power pan law, so many oscillators can render into the same
//! block.
//!
//! Rendering never allocates or locks.

use std::sync::Arc;

use tabula_core::{StereoBlock, constant_power_pan, wrap_phase};

use crate::envelope::{AdsrEnvelope, AdsrParameters};
use crate::unison::{DetuneTable, MAX_DETUNE_VOICES};
use crate::wavetable::Wavetable;

/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;

/// Highest accepted oscillator frequency in Hz.
pub const MAX_FREQUENCY: f32 = 20_000.0;

/// Default output level.
pub const DEFAULT_VOLUME: f32 = 0.75;

#[derive(Clone, Copy, Default)]
struct VoiceGains {
    increment: f32,
    left: f32,
    right: f32,
}

/// A wavetable oscillator.
///
/// ## Parameters
/// - `sample_rate`: Sample rate in Hz (0.0 to 192000.0, default 48000.0)
/// - `frequency`: Base frequency in Hz (0.0 to 20000.0, default 440.0)
/// - `volume`: Output level (0.0 to 1.0, default 0.75)
/// - `pan`: Stereo position (-1.0 to 1.0, default 0.0)
/// - `velocity`: Note velocity (0.0 to 1.0, default 1.0)
/// - `detune_voices`: Unison voices (1 to 12, default 1)
/// - `detune_mix`: Level of the detuned pairs (0.0 to 1.0, default 0.0)
/// - `detune_spread`: Pitch and pan spread of the pairs (0.0 to 1.0, default 0.0)
///
/// Unison settings only take effect after
/// [`update_detune_voice_configuration`](Self::update_detune_voice_configuration).
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tabula_core::StereoBuffer;
/// use tabula_synth::{Oscillator, Wavetable};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_wavetable(Some(Arc::new(Wavetable::saw(2048))));
/// osc.set_frequency(220.0);
/// osc.start_adsr_envelope();
///
/// let mut buffer = StereoBuffer::new(256);
/// osc.render(&mut buffer.as_block(), 0, 256);
/// assert!(buffer.peak() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    wavetable: Option<Arc<Wavetable>>,
    frame_position: f32,

    sample_rate: f32,
    frequency: f32,
    volume: f32,
    pan: f32,
    velocity: f32,

    detune_voices: usize,
    detune_mix: f32,
    detune_spread: f32,
    detune: DetuneTable,
    /// Bumped each time the unison layout is recomputed.
    detune_revision: u64,

    phases: [f32; MAX_DETUNE_VOICES],
    envelope: AdsrEnvelope,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create an oscillator with no wavetable.
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = clamp_or(sample_rate, 0.0, MAX_SAMPLE_RATE, 0.0);
        Self {
            wavetable: None,
            frame_position: 0.0,
            sample_rate,
            frequency: 440.0,
            volume: DEFAULT_VOLUME,
            pan: 0.0,
            velocity: 1.0,
            detune_voices: 1,
            detune_mix: 0.0,
            detune_spread: 0.0,
            detune: DetuneTable::identity(),
            detune_revision: 0,
            phases: [0.0; MAX_DETUNE_VOICES],
            envelope: AdsrEnvelope::new(sample_rate),
        }
    }

    /// Replace the wavetable. `None` silences the oscillator.
    pub fn set_wavetable(&mut self, wavetable: Option<Arc<Wavetable>>) {
        self.wavetable = wavetable;
    }

    /// Current wavetable.
    pub fn wavetable(&self) -> Option<&Arc<Wavetable>> {
        self.wavetable.as_ref()
    }

    /// Select an integer frame.
    pub fn set_wavetable_frame_index(&mut self, index: usize) {
        self.frame_position = index as f32;
    }

    /// Select a fractional frame position.
    ///
    /// Negative and NaN positions become 0. Positions past the last frame
    /// are held as given and clamped to the last frame at render time.
    pub fn set_wavetable_position(&mut self, position: f32) {
        self.frame_position = if position.is_nan() { 0.0 } else { position.max(0.0) };
    }

    /// Requested frame position.
    pub fn wavetable_position(&self) -> f32 {
        self.frame_position
    }

    /// Set the sample rate (clamped to `[0, 192000]`).
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = clamp_or(sample_rate, 0.0, MAX_SAMPLE_RATE, self.sample_rate);
        self.envelope.set_sample_rate(self.sample_rate);
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set the base frequency in Hz (clamped to `[0, 20000]`).
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = clamp_or(frequency, 0.0, MAX_FREQUENCY, self.frequency);
    }

    /// Current base frequency.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the output level (clamped to `[0, 1]`).
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_or(volume, 0.0, 1.0, self.volume);
    }

    /// Current output level.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the stereo position (clamped to `[-1, 1]`).
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = clamp_or(pan, -1.0, 1.0, self.pan);
    }

    /// Current stereo position.
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Set the note velocity (clamped to `[0, 1]`).
    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = clamp_or(velocity, 0.0, 1.0, self.velocity);
    }

    /// Current note velocity.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Set the number of unison voices (clamped to `[1, 12]`).
    pub fn set_detune_voices(&mut self, voices: usize) {
        self.detune_voices = voices.clamp(1, MAX_DETUNE_VOICES);
    }

    /// Requested unison voice count.
    pub fn detune_voices(&self) -> usize {
        self.detune_voices
    }

    /// Set the level of the detuned pairs (clamped to `[0, 1]`).
    pub fn set_detune_mix(&mut self, mix: f32) {
        self.detune_mix = clamp_or(mix, 0.0, 1.0, self.detune_mix);
    }

    /// Requested detune mix.
    pub fn detune_mix(&self) -> f32 {
        self.detune_mix
    }

    /// Set the pitch and pan spread of the detuned pairs (clamped to `[0, 1]`).
    pub fn set_detune_spread(&mut self, spread: f32) {
        self.detune_spread = clamp_or(spread, 0.0, 1.0, self.detune_spread);
    }

    /// Requested detune spread.
    pub fn detune_spread(&self) -> f32 {
        self.detune_spread
    }

    /// True if the given unison settings differ from the stored ones.
    pub fn detune_changed(&self, voices: usize, mix: f32, spread: f32) -> bool {
        self.detune_voices != voices.clamp(1, MAX_DETUNE_VOICES)
            || self.detune_mix != mix
            || self.detune_spread != spread
    }

    /// Recompute the unison layout from the current voice count, mix and
    /// spread.
    pub fn update_detune_voice_configuration(&mut self) {
        self.detune = DetuneTable::new(self.detune_voices, self.detune_mix, self.detune_spread);
        self.detune_revision = self.detune_revision.wrapping_add(1);
    }

    /// Active unison layout.
    pub fn detune_table(&self) -> &DetuneTable {
        &self.detune
    }

    pub(crate) fn detune_revision(&self) -> u64 {
        self.detune_revision
    }

    /// Set the envelope segments.
    pub fn set_adsr_parameters(&mut self, params: AdsrParameters) {
        self.envelope.set_parameters(params);
    }

    /// Current envelope segments.
    pub fn adsr_parameters(&self) -> AdsrParameters {
        self.envelope.parameters()
    }

    /// The amplitude envelope.
    pub fn envelope(&self) -> &AdsrEnvelope {
        &self.envelope
    }

    /// Open the envelope gate.
    pub fn start_adsr_envelope(&mut self) {
        self.envelope.gate_on();
    }

    /// Close the envelope gate. The oscillator keeps sounding through the
    /// release segment.
    pub fn release_adsr_envelope(&mut self) {
        self.envelope.gate_off();
    }

    /// Silence immediately, skipping the release.
    pub fn kill(&mut self) {
        self.envelope.reset();
    }

    /// True while the envelope is in any segment other than idle.
    #[inline]
    pub fn adsr_envelope_is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Phase of every unison voice, including inactive slots.
    pub fn phases(&self) -> &[f32; MAX_DETUNE_VOICES] {
        &self.phases
    }

    /// Zero every unison phase.
    pub fn reset_phases(&mut self) {
        self.phases = [0.0; MAX_DETUNE_VOICES];
    }

    /// Scatter the unison phases pseudo-randomly from `seed`.
    ///
    /// Identical seeds produce identical phases.
    pub fn randomize_phases(&mut self, seed: u32) {
        let mut state = seed.max(1);
        for phase in &mut self.phases {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *phase = (state >> 8) as f32 / (1u32 << 24) as f32;
        }
    }

    /// Phase increment per sample at the base frequency.
    #[inline]
    pub fn phase_increment(&self) -> f32 {
        if self.sample_rate > 0.0 {
            self.frequency / self.sample_rate
        } else {
            0.0
        }
    }

    /// Add `len` samples of output into `output` starting at `start`.
    ///
    /// Does nothing without a wavetable, at a zero sample rate, or while the
    /// envelope is idle. The envelope advances once per output sample and is
    /// shared by every unison voice. The range is clipped to the block.
    pub fn render(&mut self, output: &mut StereoBlock<'_>, start: usize, len: usize) {
        let Some(table) = self.wavetable.as_deref() else {
            return;
        };
        if self.sample_rate <= 0.0 || !self.envelope.is_active() {
            return;
        }

        let start = start.min(output.len());
        let end = start.saturating_add(len).min(output.len());

        let base_increment = self.phase_increment();
        let (frame_a, frame_b, blend) = table.frame_pair(self.frame_position);

        let mut gains = [VoiceGains::default(); MAX_DETUNE_VOICES];
        for (gain, voice) in gains.iter_mut().zip(self.detune.voices()) {
            let (l, r) = constant_power_pan(self.pan + voice.pan_offset);
            gain.increment = base_increment * voice.frequency_ratio;
            gain.left = l * voice.volume;
            gain.right = r * voice.volume;
        }
        let gains = &gains[..self.detune.len()];
        let level = self.volume * self.velocity * self.detune.normalization();

        let (left, right) = output.channels_mut();
        for i in start..end {
            let amp = self.envelope.next_sample() * level;
            let mut sum_l = 0.0;
            let mut sum_r = 0.0;

            for (phase, gain) in self.phases.iter_mut().zip(gains) {
                *phase = wrap_phase(*phase + gain.increment);
                let mut s = table.sample(frame_a, *phase);
                if blend > 0.0 {
                    s += (table.sample(frame_b, *phase) - s) * blend;
                }
                sum_l += s * gain.left;
                sum_r += s * gain.right;
            }

            left[i] += sum_l * amp;
            right[i] += sum_r * amp;
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
