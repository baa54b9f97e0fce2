//! Property-based tests for tabula-synth.
//!
//! Covers wavetable interpolation at stored sample positions, unison
//! loudness, envelope bounds and allocation invariants.

use std::sync::Arc;

use proptest::prelude::*;
use tabula_synth::{
    AdsrEnvelope, AdsrParameters, MAX_DETUNE_VOICES, MidiEvent, MidiMessage, Oscillator,
    StereoBuffer, Synthesizer, Wavetable,
};

fn frame_strategy() -> impl Strategy<Value = Vec<f32>> {
    (2u32..=10).prop_flat_map(|bits| prop::collection::vec(-1.0f32..=1.0f32, 1usize << bits))
}

fn render_peak(table: &Arc<Wavetable>, voices: usize, mix: f32, spread: f32, freq: f32) -> f32 {
    let mut osc = Oscillator::new(48000.0);
    osc.set_wavetable(Some(Arc::clone(table)));
    osc.set_frequency(freq);
    osc.set_adsr_parameters(AdsrParameters::new(0.0, 0.0, 1.0, 0.0));
    osc.set_detune_voices(voices);
    osc.set_detune_mix(mix);
    osc.set_detune_spread(spread);
    osc.update_detune_voice_configuration();
    osc.start_adsr_envelope();

    let mut buffer = StereoBuffer::new(1024);
    osc.render(&mut buffer.as_block(), 0, 1024);
    buffer.peak()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A phase landing exactly on a table index returns the stored sample.
    #[test]
    fn interpolation_exact_at_table_indices(
        (frame, k) in frame_strategy().prop_flat_map(|f| {
            let len = f.len();
            (Just(f), 0..len)
        })
    ) {
        let len = frame.len();
        let expected = frame[k];
        let table = Wavetable::from_frame(frame).unwrap();
        let phase = k as f32 / len as f32;
        prop_assert_eq!(table.sample(0, phase), expected);
    }

    /// With the detuned pairs muted, any voice count renders exactly as loud
    /// as a single voice.
    #[test]
    fn unison_loudness_matches_single_voice(
        voices in 1usize..=MAX_DETUNE_VOICES,
        spread in 0.0f32..=1.0f32,
        freq in 20.0f32..2000.0f32,
    ) {
        let table = Arc::new(Wavetable::saw(512));
        let single = render_peak(&table, 1, 0.0, 0.0, freq);
        let stacked = render_peak(&table, voices, 0.0, spread, freq);
        prop_assert!((single - stacked).abs() < 1e-5, "single {} vs {} voices {}", single, voices, stacked);
    }

    /// Normalized unison never exceeds the single-voice ceiling.
    #[test]
    fn unison_output_bounded(
        voices in 1usize..=MAX_DETUNE_VOICES,
        mix in 0.0f32..=1.0f32,
        spread in 0.0f32..=1.0f32,
    ) {
        let table = Arc::new(Wavetable::sine(256));
        let peak = render_peak(&table, voices, mix, spread, 220.0);
        prop_assert!(peak <= 0.75 + 1e-4, "peak = {}", peak);
    }

    /// Envelope output stays in [0, 1] for any parameters and gate timing.
    #[test]
    fn envelope_output_bounded(
        attack in 0.0f32..50.0,
        decay in 0.0f32..50.0,
        sustain in 0.0f32..=1.0,
        release in 0.0f32..50.0,
        gate_len in 0usize..4000,
    ) {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_parameters(AdsrParameters::new(attack, decay, sustain, release));
        env.gate_on();
        for _ in 0..gate_len {
            let level = env.next_sample();
            prop_assert!((0.0..=1.0).contains(&level));
        }
        env.gate_off();
        for _ in 0..3000 {
            let level = env.next_sample();
            prop_assert!((0.0..=1.0).contains(&level));
        }
        prop_assert!(!env.is_active());
    }

    /// No sequence of note-ons assigns one note to two voices or exceeds
    /// the pool.
    #[test]
    fn allocation_never_duplicates_notes(
        notes in prop::collection::vec(0u8..24, 1..40),
        stealing in any::<bool>(),
    ) {
        let mut synth: Synthesizer<4> = Synthesizer::new(48000.0);
        synth.set_wavetable(Wavetable::saw(64));
        synth.set_voice_stealing(stealing);

        let events: Vec<MidiEvent> = notes
            .iter()
            .enumerate()
            .map(|(i, &n)| MidiEvent::new(i, MidiMessage::note_on(n, 1.0)))
            .collect();
        let mut buffer = StereoBuffer::new(64);
        synth.process_block(&mut buffer.as_block(), &events);

        let assigned: Vec<u8> = synth.voices().iter().filter_map(|v| v.note()).collect();
        let mut unique = assigned.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), assigned.len());
        prop_assert!(assigned.len() <= 4);
    }
}
