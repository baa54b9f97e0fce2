//! Parameters shared between the control thread and the audio thread.
//!
//! Every scalar parameter lives in an [`AtomicParam`]; the voice-stealing
//! flag in an `AtomicBool`; the wavetable in an `ArcSwapOption`. The control
//! side writes through a [`SynthHandle`], the audio side takes one
//! [`SynthParams`] snapshot and one wavetable load at the top of each block.
//! Neither side ever blocks the other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use tabula_core::AtomicParam;

use crate::envelope::{AdsrParameters, MAX_SEGMENT_MS};
use crate::midi::{DEFAULT_BEND_SEMITONES, MAX_BEND_SEMITONES};
use crate::oscillator::{DEFAULT_VOLUME, MAX_SAMPLE_RATE};
use crate::unison::MAX_DETUNE_VOICES;
use crate::wavetable::Wavetable;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// A plain snapshot of every synthesizer parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthParams {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Output level of every oscillator.
    pub volume: f32,
    /// Stereo position of every oscillator.
    pub pan: f32,
    /// Unison voices per oscillator.
    pub detune_voices: usize,
    /// Level of the detuned unison pairs.
    pub detune_mix: f32,
    /// Pitch and pan spread of the detuned unison pairs.
    pub detune_spread: f32,
    /// Fractional wavetable frame position.
    pub frame_position: f32,
    /// Amplitude envelope.
    pub adsr: AdsrParameters,
    /// Pitch-bend range above centre in semitones.
    pub pitch_bend_up: f32,
    /// Pitch-bend range below centre in semitones.
    pub pitch_bend_down: f32,
    /// Whether a note may take over the oldest voice when all are busy.
    pub voice_stealing: bool,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: DEFAULT_VOLUME,
            pan: 0.0,
            detune_voices: 1,
            detune_mix: 0.0,
            detune_spread: 0.0,
            frame_position: 0.0,
            adsr: AdsrParameters::default(),
            pitch_bend_up: DEFAULT_BEND_SEMITONES,
            pitch_bend_down: DEFAULT_BEND_SEMITONES,
            voice_stealing: true,
        }
    }
}

/// Lock-free storage behind [`SynthHandle`].
#[derive(Debug)]
struct SharedParams {
    sample_rate: AtomicParam,
    volume: AtomicParam,
    pan: AtomicParam,
    detune_voices: AtomicParam,
    detune_mix: AtomicParam,
    detune_spread: AtomicParam,
    frame_position: AtomicParam,
    attack_ms: AtomicParam,
    decay_ms: AtomicParam,
    sustain: AtomicParam,
    release_ms: AtomicParam,
    pitch_bend_up: AtomicParam,
    pitch_bend_down: AtomicParam,
    voice_stealing: AtomicBool,
}

impl SharedParams {
    fn new(p: &SynthParams) -> Self {
        let ms = |v: f32| AtomicParam::new(v, 0.0, MAX_SEGMENT_MS);
        let bend = |v: f32| AtomicParam::new(v, 0.0, MAX_BEND_SEMITONES);
        Self {
            sample_rate: AtomicParam::new(p.sample_rate, 0.0, MAX_SAMPLE_RATE),
            volume: AtomicParam::new(p.volume, 0.0, 1.0),
            pan: AtomicParam::new(p.pan, -1.0, 1.0),
            detune_voices: AtomicParam::new(p.detune_voices as f32, 1.0, MAX_DETUNE_VOICES as f32),
            detune_mix: AtomicParam::new(p.detune_mix, 0.0, 1.0),
            detune_spread: AtomicParam::new(p.detune_spread, 0.0, 1.0),
            frame_position: AtomicParam::new(p.frame_position, 0.0, f32::MAX),
            attack_ms: ms(p.adsr.attack_ms),
            decay_ms: ms(p.adsr.decay_ms),
            sustain: AtomicParam::new(p.adsr.sustain, 0.0, 1.0),
            release_ms: ms(p.adsr.release_ms),
            pitch_bend_up: bend(p.pitch_bend_up),
            pitch_bend_down: bend(p.pitch_bend_down),
            voice_stealing: AtomicBool::new(p.voice_stealing),
        }
    }

    fn snapshot(&self) -> SynthParams {
        SynthParams {
            sample_rate: self.sample_rate.get(),
            volume: self.volume.get(),
            pan: self.pan.get(),
            detune_voices: self.detune_voices.get() as usize,
            detune_mix: self.detune_mix.get(),
            detune_spread: self.detune_spread.get(),
            frame_position: self.frame_position.get(),
            adsr: AdsrParameters {
                attack_ms: self.attack_ms.get(),
                decay_ms: self.decay_ms.get(),
                sustain: self.sustain.get(),
                release_ms: self.release_ms.get(),
            },
            pitch_bend_up: self.pitch_bend_up.get(),
            pitch_bend_down: self.pitch_bend_down.get(),
            voice_stealing: self.voice_stealing.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug)]
struct Shared {
    params: SharedParams,
    wavetable: ArcSwapOption<Wavetable>,
}

/// Control-side handle to a running synthesizer.
///
/// Cheap to clone and `Send + Sync`. Setters clamp into range and never
/// block; the synthesizer picks up changes at the start of its next block.
///
/// # Example
///
/// ```rust
/// use tabula_synth::{Synthesizer, Wavetable};
///
/// let synth: Synthesizer = Synthesizer::new(48000.0);
/// let handle = synth.handle();
///
/// // From another thread:
/// handle.set_volume(0.5);
/// handle.set_wavetable(Wavetable::saw(2048));
/// assert_eq!(handle.num_wavetable_frames(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct SynthHandle {
    shared: Arc<Shared>,
}

impl Default for SynthHandle {
    fn default() -> Self {
        Self::new(&SynthParams::default())
    }
}

impl SynthHandle {
    /// Create a handle holding `params` and no wavetable.
    pub fn new(params: &SynthParams) -> Self {
        Self {
            shared: Arc::new(Shared {
                params: SharedParams::new(params),
                wavetable: ArcSwapOption::empty(),
            }),
        }
    }

    /// Snapshot every parameter.
    pub fn params(&self) -> SynthParams {
        self.shared.params.snapshot()
    }

    /// Store every parameter from `params`.
    pub fn apply(&self, params: &SynthParams) {
        self.set_sample_rate(params.sample_rate);
        self.set_volume(params.volume);
        self.set_pan(params.pan);
        self.set_detune_voices(params.detune_voices);
        self.set_detune_mix(params.detune_mix);
        self.set_detune_spread(params.detune_spread);
        self.set_wavetable_position(params.frame_position);
        self.set_adsr_parameters(params.adsr);
        self.set_pitch_bend_range(params.pitch_bend_up, params.pitch_bend_down);
        self.set_voice_stealing(params.voice_stealing);
    }

    /// Set the sample rate in Hz.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.shared.params.sample_rate.set(sample_rate);
    }

    /// Set the output level.
    pub fn set_volume(&self, volume: f32) {
        self.shared.params.volume.set(volume);
    }

    /// Set the stereo position.
    pub fn set_pan(&self, pan: f32) {
        self.shared.params.pan.set(pan);
    }

    /// Set the unison voice count.
    pub fn set_detune_voices(&self, voices: usize) {
        let voices = voices.clamp(1, MAX_DETUNE_VOICES);
        self.shared.params.detune_voices.set(voices as f32);
    }

    /// Set the level of the detuned unison pairs.
    pub fn set_detune_mix(&self, mix: f32) {
        self.shared.params.detune_mix.set(mix);
    }

    /// Set the pitch and pan spread of the detuned unison pairs.
    pub fn set_detune_spread(&self, spread: f32) {
        self.shared.params.detune_spread.set(spread);
    }

    /// Select an integer wavetable frame.
    pub fn set_wavetable_frame_index(&self, index: usize) {
        self.set_wavetable_position(index as f32);
    }

    /// Select a fractional wavetable frame position.
    pub fn set_wavetable_position(&self, position: f32) {
        self.shared.params.frame_position.set(position);
    }

    /// Set the amplitude envelope.
    pub fn set_adsr_parameters(&self, adsr: AdsrParameters) {
        let p = &self.shared.params;
        p.attack_ms.set(adsr.attack_ms);
        p.decay_ms.set(adsr.decay_ms);
        p.sustain.set(adsr.sustain);
        p.release_ms.set(adsr.release_ms);
    }

    /// Set the pitch-bend range in semitones above and below centre.
    pub fn set_pitch_bend_range(&self, up: f32, down: f32) {
        self.shared.params.pitch_bend_up.set(up);
        self.shared.params.pitch_bend_down.set(down);
    }

    /// Allow or forbid voice stealing.
    pub fn set_voice_stealing(&self, enabled: bool) {
        self.shared
            .params
            .voice_stealing
            .store(enabled, Ordering::Release);
    }

    /// Publish a new wavetable.
    pub fn set_wavetable(&self, wavetable: Wavetable) {
        self.set_shared_wavetable(Arc::new(wavetable));
    }

    /// Publish an already shared wavetable.
    pub fn set_shared_wavetable(&self, wavetable: Arc<Wavetable>) {
        self.shared.wavetable.store(Some(wavetable));
    }

    /// Remove the wavetable; the synthesizer goes silent.
    pub fn clear_wavetable(&self) {
        self.shared.wavetable.store(None);
    }

    /// The most recently published wavetable.
    pub fn wavetable(&self) -> Option<Arc<Wavetable>> {
        self.shared.wavetable.load_full()
    }

    /// Frame count of the most recently published wavetable, 0 if none.
    pub fn num_wavetable_frames(&self) -> usize {
        self.wavetable().map_or(0, |table| table.num_frames())
    }
}
