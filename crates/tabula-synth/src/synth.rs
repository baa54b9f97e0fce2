//! Polyphonic wavetable synthesizer.
//!
//! [`Synthesizer`] owns a fixed [`VoicePool`] and renders one stereo block at
//! a time. MIDI events carry sample offsets inside the block; rendering is
//! split at every event so a note-on at offset 37 starts sounding at sample
//! 37, not at the next block.
//!
//! Parameters and the wavetable arrive through a [`SynthHandle`] and are
//! picked up once at the top of each block.

use std::sync::Arc;

use tabula_core::{StereoBlock, cents_to_ratio, midi_to_freq};

use crate::envelope::AdsrParameters;
use crate::midi::{MidiEvent, MidiMessage, PitchBend};
use crate::params::{SynthHandle, SynthParams};
use crate::voice::{MAX_POLYPHONY, Voice, VoicePool};
use crate::wavetable::Wavetable;

/// A polyphonic wavetable synthesizer with `VOICES` voices.
///
/// # Example
///
/// ```rust
/// use tabula_core::StereoBuffer;
/// use tabula_synth::{MidiEvent, MidiMessage, Synthesizer, Wavetable};
///
/// let mut synth: Synthesizer = Synthesizer::new(48000.0);
/// synth.set_wavetable(Wavetable::saw(2048));
///
/// let events = [
///     MidiEvent::new(0, MidiMessage::note_on(60, 0.8)),
///     MidiEvent::new(64, MidiMessage::note_on(64, 0.8)),
///     MidiEvent::new(128, MidiMessage::note_on(67, 0.8)),
/// ];
///
/// let mut buffer = StereoBuffer::new(512);
/// synth.process_block(&mut buffer.as_block(), &events);
/// assert_eq!(synth.active_voice_count(), 3);
/// ```
#[derive(Debug)]
pub struct Synthesizer<const VOICES: usize = MAX_POLYPHONY> {
    voices: VoicePool<VOICES>,
    handle: SynthHandle,
    /// Wavetable generation the oscillators currently hold.
    wavetable: Option<Arc<Wavetable>>,
    /// Parameters in effect for the current block.
    params: SynthParams,
    pitch_bend: PitchBend,
}

impl<const VOICES: usize> Default for Synthesizer<VOICES> {
    fn default() -> Self {
        Self::with_params(&SynthParams::default())
    }
}

impl<const VOICES: usize> Synthesizer<VOICES> {
    /// Create a synthesizer with default parameters at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(&SynthParams {
            sample_rate,
            ..SynthParams::default()
        })
    }

    /// Create a synthesizer with the given parameters.
    pub fn with_params(params: &SynthParams) -> Self {
        Self::with_handle(SynthHandle::new(params))
    }

    /// Create a synthesizer driven by an existing handle.
    pub fn with_handle(handle: SynthHandle) -> Self {
        let params = handle.params();
        let mut synth = Self {
            voices: VoicePool::new(params.sample_rate),
            handle,
            wavetable: None,
            params,
            pitch_bend: PitchBend::new(),
        };
        synth.sync_parameters();
        synth
    }

    /// A control handle sharing this synthesizer's parameters.
    pub fn handle(&self) -> SynthHandle {
        self.handle.clone()
    }

    /// Parameters in effect for the current block.
    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// The voice pool.
    pub fn voices(&self) -> &[Voice; VOICES] {
        self.voices.voices()
    }

    /// Number of voices holding a note, including release tails.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    /// Current pitch-bend offset in cents.
    pub fn pitch_bend_cents(&self) -> f32 {
        self.pitch_bend.cents()
    }

    // --- Collaborator surface: everything below writes through the handle
    // and takes effect at the start of the next block.

    /// The most recently published wavetable.
    pub fn wavetable(&self) -> Option<Arc<Wavetable>> {
        self.handle.wavetable()
    }

    /// Frame count of the most recently published wavetable.
    pub fn num_wavetable_frames(&self) -> usize {
        self.handle.num_wavetable_frames()
    }

    /// Publish a new wavetable.
    pub fn set_wavetable(&self, wavetable: Wavetable) {
        self.handle.set_wavetable(wavetable);
    }

    /// Set the sample rate in Hz.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.handle.set_sample_rate(sample_rate);
    }

    /// Set the output level.
    pub fn set_volume(&self, volume: f32) {
        self.handle.set_volume(volume);
    }

    /// Set the stereo position.
    pub fn set_pan(&self, pan: f32) {
        self.handle.set_pan(pan);
    }

    /// Set the unison voice count.
    pub fn set_detune_voices(&self, voices: usize) {
        self.handle.set_detune_voices(voices);
    }

    /// Set the level of the detuned unison pairs.
    pub fn set_detune_mix(&self, mix: f32) {
        self.handle.set_detune_mix(mix);
    }

    /// Set the spread of the detuned unison pairs.
    pub fn set_detune_spread(&self, spread: f32) {
        self.handle.set_detune_spread(spread);
    }

    /// Select an integer wavetable frame.
    pub fn set_wavetable_frame_index(&self, index: usize) {
        self.handle.set_wavetable_frame_index(index);
    }

    /// Select a fractional wavetable frame position.
    pub fn set_wavetable_position(&self, position: f32) {
        self.handle.set_wavetable_position(position);
    }

    /// Set the amplitude envelope.
    pub fn set_adsr_parameters(&self, adsr: AdsrParameters) {
        self.handle.set_adsr_parameters(adsr);
    }

    /// Set the pitch-bend range in semitones.
    pub fn set_pitch_bend_range(&self, up: f32, down: f32) {
        self.handle.set_pitch_bend_range(up, down);
    }

    /// Allow or forbid voice stealing.
    pub fn set_voice_stealing(&self, enabled: bool) {
        self.handle.set_voice_stealing(enabled);
    }

    // --- Audio thread

    /// Render one block, applying `events` at their sample offsets.
    ///
    /// Offsets are expected in non-decreasing order. An offset earlier than
    /// the previous one, or past the end of the block, is applied at the
    /// current render position.
    pub fn process_block(&mut self, buffer: &mut StereoBlock<'_>, events: &[MidiEvent]) {
        self.sync_parameters();
        self.update_voice_ages();

        let block_len = buffer.len();
        let mut cursor = 0;
        for event in events {
            let offset = event.offset.clamp(cursor, block_len);
            self.render(buffer, cursor, offset - cursor);
            cursor = offset;
            self.handle_midi_event(event.message);
        }
        self.render(buffer, cursor, block_len - cursor);
    }

    /// Apply a single MIDI message immediately.
    pub fn handle_midi_event(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { note, velocity } => self.start_note(note, velocity),
            MidiMessage::NoteOff { note } => self.stop_note(note),
            MidiMessage::PitchBend { value } => self.pitch_wheel_moved(value),
            MidiMessage::AllNotesOff => self.stop_all_notes(),
        }
    }

    /// Start `note` on the voice chosen by the allocation policy.
    ///
    /// If every voice is busy and stealing is off, the note is dropped.
    pub fn start_note(&mut self, note: u8, velocity: f32) {
        let Some(index) = self.voices.find_voice(note, self.params.voice_stealing) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(note, "all voices busy, note dropped");
            return;
        };
        debug_assert!(index < VOICES, "voice index {index} out of range");

        let frequency = note_frequency(note, self.pitch_bend.cents());
        let Some(voice) = self.voices.get_mut(index) else {
            return;
        };

        #[cfg(feature = "tracing")]
        if let Some(previous) = voice.note()
            && previous != note
        {
            tracing::trace!(voice = index, previous, note, "voice stolen");
        }

        voice.assign(note);
        let osc = voice.oscillator_mut();
        osc.set_frequency(frequency);
        osc.set_velocity(velocity);
        osc.start_adsr_envelope();
    }

    /// Release the voice assigned to `note`.
    ///
    /// The voice keeps its note until the release tail finishes.
    pub fn stop_note(&mut self, note: u8) {
        if let Some(index) = self.voices.find_voice_playing_note(note)
            && let Some(voice) = self.voices.get_mut(index)
        {
            voice.oscillator_mut().release_adsr_envelope();
        }
    }

    /// Release every assigned voice.
    pub fn stop_all_notes(&mut self) {
        for voice in self.voices.voices_mut() {
            if voice.note().is_some() {
                voice.oscillator_mut().release_adsr_envelope();
            }
        }
    }

    /// Move the pitch wheel and retune every assigned voice.
    pub fn pitch_wheel_moved(&mut self, value: u16) {
        self.pitch_bend.set_wheel(value);
        let cents = self.pitch_bend.cents();
        for voice in self.voices.voices_mut() {
            if let Some(note) = voice.note() {
                voice.oscillator_mut().set_frequency(note_frequency(note, cents));
            }
        }
    }

    /// Free voices whose envelope finished and age the others.
    pub fn update_voice_ages(&mut self) {
        self.voices.update_voice_ages();
    }

    /// Clear `len` samples at `start`, then mix every sounding voice into them.
    fn render(&mut self, buffer: &mut StereoBlock<'_>, start: usize, len: usize) {
        if len == 0 {
            return;
        }
        buffer.clear_range(start, len);
        for voice in self.voices.voices_mut() {
            let osc = voice.oscillator_mut();
            if osc.adsr_envelope_is_active() {
                osc.render(buffer, start, len);
            }
        }
    }

    /// Load the current parameter snapshot and wavetable and push them into
    /// every oscillator.
    fn sync_parameters(&mut self) {
        let params = self.handle.params();
        let table = self.handle.wavetable();

        let table_changed = match (&self.wavetable, &table) {
            (Some(current), Some(next)) => !Arc::ptr_eq(current, next),
            (None, None) => false,
            _ => true,
        };
        if table_changed {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                frames = table.as_ref().map_or(0, |t| t.num_frames()),
                "wavetable generation changed"
            );
            for voice in self.voices.voices_mut() {
                voice.oscillator_mut().set_wavetable(table.clone());
            }
        }
        self.wavetable = table;

        self.pitch_bend
            .set_range(params.pitch_bend_up, params.pitch_bend_down);

        for voice in self.voices.voices_mut() {
            let osc = voice.oscillator_mut();
            if osc.sample_rate() != params.sample_rate {
                osc.set_sample_rate(params.sample_rate);
            }
            osc.set_volume(params.volume);
            osc.set_pan(params.pan);
            osc.set_wavetable_position(params.frame_position);
            if osc.adsr_parameters() != params.adsr {
                osc.set_adsr_parameters(params.adsr);
            }
            if osc.detune_changed(params.detune_voices, params.detune_mix, params.detune_spread) {
                osc.set_detune_voices(params.detune_voices);
                osc.set_detune_mix(params.detune_mix);
                osc.set_detune_spread(params.detune_spread);
                osc.update_detune_voice_configuration();
            }
        }

        self.params = params;
    }
}

/// Frequency of `note` offset by `cents`.
pub fn note_frequency(note: u8, cents: f32) -> f32 {
    midi_to_freq(note) * cents_to_ratio(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{PITCH_WHEEL_CENTER, PITCH_WHEEL_MAX};
    use tabula_core::StereoBuffer;

    fn synth<const N: usize>() -> Synthesizer<N> {
        let synth = Synthesizer::<N>::new(48000.0);
        synth.set_wavetable(Wavetable::saw(256));
        synth.set_adsr_parameters(AdsrParameters::new(1.0, 10.0, 0.8, 10.0));
        synth
    }

    fn run<const N: usize>(synth: &mut Synthesizer<N>, len: usize, events: &[MidiEvent]) -> StereoBuffer {
        let mut buffer = StereoBuffer::new(len);
        synth.process_block(&mut buffer.as_block(), events);
        buffer
    }

    #[test]
    fn test_note_frequency() {
        assert!((note_frequency(69, 0.0) - 440.0).abs() < 1e-3);
        assert!((note_frequency(69, 1200.0) - 880.0).abs() < 1e-2);
        assert!((note_frequency(69, 200.0) - 440.0 * 2.0f32.powf(2.0 / 12.0)).abs() < 1e-2);
    }

    #[test]
    fn test_steal_oldest_with_lowest_index_tie_break() {
        let mut synth = synth::<4>();
        run(&mut synth, 16, &[]);
        for note in 60..64 {
            synth.start_note(note, 1.0);
        }
        let ages = [5, 9, 3, 9];
        for (voice, age) in synth.voices.voices_mut().iter_mut().zip(ages) {
            voice.set_age(Some(age));
        }

        synth.start_note(80, 1.0);
        let voices = synth.voices();
        assert_eq!(voices[1].note(), Some(80));
        assert_eq!(voices[1].age(), Some(0));
        assert_eq!(voices[3].note(), Some(63));
    }

    #[test]
    fn test_retrigger_reuses_voice() {
        let mut synth = synth::<4>();
        run(&mut synth, 64, &[MidiEvent::new(0, MidiMessage::note_on(60, 1.0))]);
        run(&mut synth, 64, &[MidiEvent::new(0, MidiMessage::note_on(62, 1.0))]);
        run(&mut synth, 64, &[]);
        assert_eq!(synth.voices()[0].age(), Some(2));

        synth.start_note(60, 0.5);
        let voices = synth.voices();
        assert_eq!(voices[0].note(), Some(60));
        assert_eq!(voices[0].age(), Some(0));
        assert_eq!(voices[0].oscillator().velocity(), 0.5);
        assert_eq!(synth.active_voice_count(), 2);
    }

    #[test]
    fn test_voice_freed_after_release() {
        let mut synth = synth::<2>();
        run(&mut synth, 64, &[MidiEvent::new(0, MidiMessage::note_on(60, 1.0))]);
        run(&mut synth, 64, &[MidiEvent::new(0, MidiMessage::note_off(60))]);

        // Still assigned through the 480-sample release tail
        assert_eq!(synth.voices()[0].note(), Some(60));

        for _ in 0..10 {
            run(&mut synth, 64, &[]);
        }
        run(&mut synth, 64, &[]);
        assert!(synth.voices()[0].is_free());
        assert_eq!(synth.voices()[0].note(), None);
    }

    #[test]
    fn test_all_notes_off_releases_everything() {
        let mut synth = synth::<4>();
        let events = [
            MidiEvent::new(0, MidiMessage::note_on(60, 1.0)),
            MidiEvent::new(0, MidiMessage::note_on(64, 1.0)),
            MidiEvent::new(8, MidiMessage::AllNotesOff),
        ];
        run(&mut synth, 64, &events);
        for voice in &synth.voices()[..2] {
            assert_eq!(
                voice.oscillator().envelope().state(),
                crate::envelope::EnvelopeState::Release
            );
        }
    }

    #[test]
    fn test_pitch_wheel_retunes_assigned_voices() {
        let mut synth = synth::<4>();
        run(&mut synth, 16, &[MidiEvent::new(0, MidiMessage::note_on(69, 1.0))]);

        synth.pitch_wheel_moved(PITCH_WHEEL_MAX);
        let expected = 440.0 * 2.0f32.powf(2.0 / 12.0);
        assert!((synth.voices()[0].oscillator().frequency() - expected).abs() < 0.01);

        // Notes started while bent inherit the bend
        synth.start_note(57, 1.0);
        let expected = 220.0 * 2.0f32.powf(2.0 / 12.0);
        assert!((synth.voices()[1].oscillator().frequency() - expected).abs() < 0.01);

        synth.pitch_wheel_moved(PITCH_WHEEL_CENTER);
        assert!((synth.voices()[0].oscillator().frequency() - 440.0).abs() < 0.01);
    }

    #[test]
    fn test_detune_recomputed_once_per_change() {
        let mut synth = synth::<2>();
        let before = synth.voices()[0].oscillator().detune_revision();

        run(&mut synth, 16, &[]);
        assert_eq!(synth.voices()[0].oscillator().detune_revision(), before);

        synth.set_detune_voices(5);
        synth.set_detune_spread(0.5);
        run(&mut synth, 16, &[]);
        run(&mut synth, 16, &[]);
        assert_eq!(synth.voices()[0].oscillator().detune_revision(), before + 1);
        assert_eq!(synth.voices()[0].oscillator().detune_table().len(), 5);
    }

    #[test]
    fn test_wavetable_swap_observed_at_block_start() {
        let mut synth = synth::<2>();
        run(&mut synth, 16, &[]);
        let first = synth.voices()[0].oscillator().wavetable().cloned();

        synth.set_wavetable(Wavetable::square(128));
        // Not yet observed
        assert!(matches!(
            (&first, synth.voices()[0].oscillator().wavetable()),
            (Some(a), Some(b)) if Arc::ptr_eq(a, b)
        ));

        run(&mut synth, 16, &[]);
        let table = synth.voices()[1].oscillator().wavetable();
        assert_eq!(table.map(|t| t.frame_len()), Some(128));
        assert_eq!(synth.num_wavetable_frames(), 1);
    }

    #[test]
    fn test_clear_wavetable_silences() {
        let mut synth = synth::<2>();
        run(&mut synth, 64, &[MidiEvent::new(0, MidiMessage::note_on(60, 1.0))]);
        synth.handle().clear_wavetable();
        let out = run(&mut synth, 64, &[]);
        assert_eq!(out.peak(), 0.0);
        assert!(synth.wavetable().is_none());
    }

    #[test]
    fn test_render_clears_stale_buffer_contents() {
        let mut synth = synth::<2>();
        let mut buffer = StereoBuffer::new(32);
        buffer.left.fill(9.0);
        buffer.right.fill(9.0);
        synth.process_block(&mut buffer.as_block(), &[]);
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn test_late_event_applies_at_cursor() {
        let mut synth = synth::<2>();
        let events = [
            MidiEvent::new(20, MidiMessage::note_on(60, 1.0)),
            MidiEvent::new(5, MidiMessage::note_on(64, 1.0)),
            MidiEvent::new(1000, MidiMessage::note_off(60)),
        ];
        let out = run(&mut synth, 32, &events);
        assert!(out.left[..20].iter().all(|&s| s == 0.0));
        assert!(out.left[20..].iter().any(|&s| s != 0.0));
        assert_eq!(synth.active_voice_count(), 2);
    }
}
