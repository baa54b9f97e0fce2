//! Tabula Synth - Polyphonic wavetable synthesizer core
//!
//! This crate turns a stream of timestamped MIDI events into stereo audio,
//! one block at a time, from a shared multi-frame wavetable.
//!
//! # Core Components
//!
//! ## Wavetables
//!
//! - [`Wavetable`] - Immutable set of equal-length single-cycle frames
//! - [`WavetableKind`] - Built-in generators (sine, saw, square, multi-sine, morph)
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - Hermite-interpolated wavetable playback with up to 12
//!   detuned unison voices and an equal-power stereo pan
//! - [`DetuneTable`] - Pitch, pan and level offsets of the unison voices
//!
//! ```rust
//! use std::sync::Arc;
//! use tabula_core::StereoBuffer;
//! use tabula_synth::{Oscillator, Wavetable};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_wavetable(Some(Arc::new(Wavetable::saw(2048))));
//! osc.set_detune_voices(5);
//! osc.set_detune_mix(0.6);
//! osc.set_detune_spread(0.3);
//! osc.update_detune_voice_configuration();
//! osc.start_adsr_envelope();
//!
//! let mut buffer = StereoBuffer::new(128);
//! osc.render(&mut buffer.as_block(), 0, 128);
//! ```
//!
//! ## Envelopes
//!
//! - [`AdsrEnvelope`] - Linear attack-decay-sustain-release envelope
//! - [`AdsrParameters`] - Segment times and sustain level
//!
//! ## Voices and MIDI
//!
//! - [`Voice`] / [`VoicePool`] - Note assignment, ageing and voice stealing
//! - [`MidiEvent`] / [`MidiMessage`] - Sample-stamped note and pitch-bend events
//!
//! ## The Synthesizer
//!
//! - [`Synthesizer`] - Voice pool plus sample-accurate block rendering
//! - [`SynthHandle`] - Lock-free control handle for another thread
//!
//! # Example
//!
//! ```rust
//! use tabula_core::StereoBuffer;
//! use tabula_synth::{AdsrParameters, MidiEvent, MidiMessage, Synthesizer, Wavetable};
//!
//! let mut synth: Synthesizer<8> = Synthesizer::new(48000.0);
//! let handle = synth.handle();
//! handle.set_wavetable(Wavetable::saw(2048));
//! handle.set_adsr_parameters(AdsrParameters::new(10.0, 200.0, 0.6, 300.0));
//! handle.set_detune_voices(3);
//! handle.set_detune_mix(0.5);
//! handle.set_detune_spread(0.2);
//!
//! // Play a chord, the third note arriving mid-block
//! let events = [
//!     MidiEvent::new(0, MidiMessage::note_on(60, 0.8)),
//!     MidiEvent::new(0, MidiMessage::note_on(64, 0.8)),
//!     MidiEvent::new(200, MidiMessage::note_on(67, 0.8)),
//! ];
//!
//! let mut buffer = StereoBuffer::new(512);
//! synth.process_block(&mut buffer.as_block(), &events);
//! ```
//!
//! # Features
//!
//! - `tracing`: trace-level events for dropped and stolen notes and
//!   wavetable swaps. Off by default.

pub mod envelope;
pub mod midi;
pub mod oscillator;
pub mod params;
pub mod synth;
pub mod unison;
pub mod voice;
pub mod wavetable;

// Re-export main types at crate root
pub use envelope::{AdsrEnvelope, AdsrParameters, EnvelopeState, MAX_SEGMENT_MS};
pub use midi::{
    DEFAULT_BEND_SEMITONES, MAX_BEND_SEMITONES, MidiEvent, MidiMessage, PITCH_WHEEL_CENTER,
    PITCH_WHEEL_MAX, PitchBend, pitch_wheel_position,
};
pub use oscillator::{DEFAULT_VOLUME, MAX_FREQUENCY, MAX_SAMPLE_RATE, Oscillator};
pub use params::{DEFAULT_SAMPLE_RATE, SynthHandle, SynthParams};
pub use synth::{Synthesizer, note_frequency};
pub use unison::{DetuneTable, MAX_DETUNE_SPREAD, MAX_DETUNE_VOICES, UnisonVoice};
pub use voice::{MAX_POLYPHONY, Voice, VoicePool};
pub use wavetable::{DEFAULT_RESOLUTION, Wavetable, WavetableError, WavetableKind, interpolate};

// Re-export commonly used types from tabula-core
pub use tabula_core::{StereoBlock, StereoBuffer};
