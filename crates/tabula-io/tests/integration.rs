//! Integration tests for tabula-io banks, WAV output and offline rendering.

use tabula_io::{
    OfflineRenderer, TimedMessage, WavSpec, load_wavetable, read_wav, read_wav_info,
    save_wavetable, write_wav, write_wav_stereo,
};
use tabula_synth::{AdsrParameters, MidiMessage, Synthesizer, Wavetable, WavetableKind};
use tempfile::{NamedTempFile, tempdir};

fn instant_synth() -> Synthesizer {
    let synth = Synthesizer::new(48000.0);
    synth.set_adsr_parameters(AdsrParameters::new(0.0, 0.0, 1.0, 0.0));
    synth
}

// ---------------------------------------------------------------------------
// Wavetable banks
// ---------------------------------------------------------------------------

#[test]
fn bank_written_by_hand_loads_as_frames() {
    // Four 64-sample frames, each a constant level
    let samples: Vec<f32> = (0..4)
        .flat_map(|f| std::iter::repeat_n(f as f32 * 0.25, 64))
        .collect();
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 32,
    };
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, spec).unwrap();

    let table = load_wavetable(file.path(), 64).unwrap();
    assert_eq!(table.num_frames(), 4);
    for (i, frame) in table.frames().enumerate() {
        assert!(frame.iter().all(|&s| s == i as f32 * 0.25));
    }
}

#[test]
fn saved_bank_is_mono_float() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("morph.wav");
    let table = Wavetable::generate(WavetableKind::Morph, 512, 4);
    save_wavetable(&path, &table, 48000).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.channels, 1);
    assert_eq!(info.bits_per_sample, 32);
    assert_eq!(info.num_frames, 512 * 4);
}

#[test]
fn loaded_bank_plays_through_synth() {
    let file = NamedTempFile::new().unwrap();
    save_wavetable(file.path(), &Wavetable::saw(256), 48000).unwrap();

    let synth = instant_synth();
    synth.set_wavetable(load_wavetable(file.path(), 256).unwrap());

    let mut renderer = OfflineRenderer::new(synth, 128);
    let out = renderer.render(&[TimedMessage::new(0, MidiMessage::note_on(60, 1.0))], 1024);
    assert!(out.peak() > 0.1);
}

// ---------------------------------------------------------------------------
// Offline rendering
// ---------------------------------------------------------------------------

#[test]
fn render_without_wavetable_is_silent() {
    let mut renderer = OfflineRenderer::new(instant_synth(), 256);
    let out = renderer.render(&[TimedMessage::new(0, MidiMessage::note_on(60, 1.0))], 2048);
    assert_eq!(out.peak(), 0.0);
}

#[test]
fn release_tail_outlives_note_off() {
    let synth: Synthesizer = Synthesizer::new(48000.0);
    synth.set_wavetable(Wavetable::sine(512));
    synth.set_adsr_parameters(AdsrParameters::new(0.0, 0.0, 1.0, 10.0));

    let timeline = [
        TimedMessage::new(0, MidiMessage::note_on(69, 1.0)),
        TimedMessage::new(1000, MidiMessage::note_off(69)),
    ];
    let mut renderer = OfflineRenderer::new(synth, 64);
    let out = renderer.render(&timeline, 4000);

    // 10 ms at 48 kHz is 480 samples of release
    let tail = &out.left[1000..1400];
    assert!(tail.iter().any(|&s| s.abs() > 0.01));
    assert!(out.left[1500..].iter().all(|&s| s == 0.0));
    assert_eq!(renderer.synth().active_voice_count(), 0);
}

#[test]
fn rendered_audio_roundtrips_through_wav() {
    let synth = instant_synth();
    synth.set_wavetable(Wavetable::sine(1024));
    synth.set_detune_voices(3);
    synth.set_detune_mix(1.0);
    synth.set_detune_spread(0.5);

    let timeline = [TimedMessage::new(0, MidiMessage::note_on(57, 0.7))];
    let audio = OfflineRenderer::new(synth, 256).render(&timeline, 4800);

    let file = NamedTempFile::new().unwrap();
    write_wav_stereo(file.path(), &audio, WavSpec::default()).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, 4800);
    assert!((info.duration_secs - 0.1).abs() < 1e-9);

    let (mono, _) = read_wav(file.path()).unwrap();
    for (i, m) in mono.iter().enumerate() {
        let expected = (audio.left[i] + audio.right[i]) / 2.0;
        assert!((m - expected).abs() < 1e-6);
    }
}

#[test]
fn handle_changes_apply_between_renders() {
    let synth = instant_synth();
    synth.set_wavetable(Wavetable::sine(512));
    let mut renderer = OfflineRenderer::new(synth, 256);
    let handle = renderer.handle();

    let loud = renderer.render(&[TimedMessage::new(0, MidiMessage::note_on(60, 1.0))], 2048);
    handle.set_volume(0.25);
    let quiet = renderer.render(&[], 2048);

    assert!(quiet.peak() < loud.peak() * 0.5);
    assert!(quiet.peak() > 0.0);
}
