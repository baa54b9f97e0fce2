//! Integration tests for tabula-config.
//!
//! These tests go from files on disk to rendered audio.

use tabula_config::{
    ConfigError, Patch, Score, ScoreNote, WavetableSource, factory_patches, get_factory_patch,
};
use tabula_io::OfflineRenderer;
use tabula_synth::{Synthesizer, Wavetable, WavetableKind};
use tempfile::TempDir;

const SAMPLE_RATE: f32 = 48000.0;

fn render(patch: &Patch, base: &std::path::Path, score: &Score) -> tabula_synth::StereoBuffer {
    let synth: Synthesizer = Synthesizer::new(SAMPLE_RATE);
    patch.apply_to(&synth.handle());
    synth.set_wavetable(patch.build_wavetable(base).unwrap());

    let mut renderer = OfflineRenderer::new(synth, 256);
    renderer.render(
        &score.to_timeline(SAMPLE_RATE),
        score.num_samples(SAMPLE_RATE, 0.1),
    )
}

#[test]
fn patch_with_relative_bank_path() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("tables")).unwrap();
    let table = Wavetable::generate(WavetableKind::Morph, 256, 4);
    tabula_io::save_wavetable(dir.path().join("tables/morph.wav"), &table, 48000).unwrap();

    let patch = Patch::new("Bank").with_wavetable(WavetableSource::file("tables/morph.wav", 256));
    let patch_path = dir.path().join("patches/bank.toml");
    patch.save(&patch_path).unwrap();

    let loaded = Patch::load(&patch_path).unwrap();
    assert_eq!(loaded, patch);

    let base = patch_path.parent().unwrap().parent().unwrap();
    let built = loaded.build_wavetable(base).unwrap();
    assert_eq!(built, table);
}

#[test]
fn missing_bank_is_wavetable_error() {
    let dir = TempDir::new().unwrap();
    let patch = Patch::new("Missing").with_wavetable(WavetableSource::file("nope.wav", 256));
    assert!(matches!(
        patch.build_wavetable(dir.path()),
        Err(ConfigError::Wavetable(_))
    ));
}

#[test]
fn missing_patch_file_reports_path() {
    let err = Patch::load("/nonexistent/patch.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/patch.toml"));
}

#[test]
fn score_file_renders_through_patch() {
    let dir = TempDir::new().unwrap();
    let score_path = dir.path().join("score.toml");
    std::fs::write(
        &score_path,
        r#"
[[notes]]
at = 0.0
note = 57
velocity = 0.9
duration = 0.05

[[notes]]
at = 0.05
note = 64
duration = 0.05
"#,
    )
    .unwrap();

    let score = Score::load(&score_path).unwrap();
    let patch = get_factory_patch("supersaw").unwrap();
    let audio = render(&patch, dir.path(), &score);

    assert_eq!(audio.len(), (0.2 * SAMPLE_RATE) as usize);
    assert!(audio.peak() > 0.05);
    assert!(audio.left.iter().all(|s| s.is_finite()));
}

#[test]
fn every_factory_patch_makes_sound() {
    let dir = TempDir::new().unwrap();
    let score = Score::new().with_note(ScoreNote::new(0.0, 60, 1.0, 0.1));

    for patch in factory_patches() {
        let audio = render(&patch, dir.path(), &score);
        assert!(audio.peak() > 0.0, "factory patch '{}' is silent", patch.name);
    }
}

#[test]
fn zero_length_note_does_not_hang() {
    let dir = TempDir::new().unwrap();
    let patch = Patch::new("Blip");
    let score = Score::new().with_note(ScoreNote::new(0.0, 60, 1.0, 0.0));
    score.validate().unwrap();

    let synth: Synthesizer = Synthesizer::new(SAMPLE_RATE);
    patch.apply_to(&synth.handle());
    synth.set_wavetable(patch.build_wavetable(dir.path()).unwrap());
    let mut renderer = OfflineRenderer::new(synth, 256);
    let audio = renderer.render(
        &score.to_timeline(SAMPLE_RATE),
        score.num_samples(SAMPLE_RATE, 0.5),
    );

    // The release lasts 100 ms; the last 200 ms must be silent
    let tail = audio.len() - 9600;
    assert!(audio.left[tail..].iter().all(|&s| s == 0.0));
    assert!(audio.right[tail..].iter().all(|&s| s == 0.0));
    assert_eq!(renderer.synth().active_voice_count(), 0);
}

#[test]
fn voice_stealing_flag_reaches_synth() {
    let patch = get_factory_patch("hollow_lead").unwrap();
    let synth: Synthesizer = Synthesizer::new(SAMPLE_RATE);
    patch.apply_to(&synth.handle());
    assert!(!synth.handle().params().voice_stealing);
    assert_eq!(synth.handle().params().pitch_bend_up, 12.0);
}
