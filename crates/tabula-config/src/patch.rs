//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tabula_synth::{
    AdsrParameters, DEFAULT_BEND_SEMITONES, DEFAULT_RESOLUTION, DEFAULT_VOLUME, MAX_BEND_SEMITONES,
    MAX_DETUNE_VOICES, MAX_SEGMENT_MS, SynthHandle, SynthParams, Wavetable, WavetableKind,
};

use crate::error::ConfigError;
use crate::validation::{Checker, ValidationResult};

/// Smallest accepted frame length or generator resolution.
pub const MIN_FRAME_LEN: usize = 4;
/// Largest accepted frame length or generator resolution.
pub const MAX_FRAME_LEN: usize = 65_536;
/// Largest number of frames a generator may produce.
pub const MAX_GENERATED_FRAMES: usize = 256;

/// A complete synthesizer sound stored as TOML.
///
/// Every section is optional and falls back to the synthesizer defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Supersaw"
/// description = "Seven detuned saws"
/// voice_stealing = true
///
/// [wavetable]
/// source = "generator"
/// kind = "saw"
/// resolution = 2048
///
/// [oscillator]
/// volume = 0.6
///
/// [unison]
/// voices = 7
/// mix = 0.8
/// spread = 0.35
///
/// [envelope]
/// attack_ms = 5.0
/// release_ms = 400.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether a note may take over the oldest voice when all are busy.
    #[serde(default = "default_voice_stealing")]
    pub voice_stealing: bool,

    /// Where the wavetable comes from.
    #[serde(default)]
    pub wavetable: WavetableSource,

    /// Base oscillator settings.
    #[serde(default)]
    pub oscillator: OscillatorConfig,

    /// Unison stack.
    #[serde(default)]
    pub unison: UnisonConfig,

    /// Amplitude envelope.
    #[serde(default)]
    pub envelope: EnvelopeConfig,

    /// Pitch-wheel range.
    #[serde(default)]
    pub pitch_bend: PitchBendConfig,
}

fn default_voice_stealing() -> bool {
    true
}

/// Wavetable source of a patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WavetableSource {
    /// One of the built-in generators.
    Generator {
        /// Generator name: `sine`, `saw`, `square`, `multisine` or `morph`.
        #[serde(default = "default_kind")]
        kind: String,
        /// Samples per frame.
        #[serde(default = "default_resolution")]
        resolution: usize,
        /// Frame count, used by `morph`.
        #[serde(default = "default_frames")]
        frames: usize,
    },
    /// A WAV bank of back-to-back frames.
    File {
        /// Path to the bank; relative paths resolve against the patch's
        /// directory.
        path: PathBuf,
        /// Samples per frame.
        #[serde(default = "default_resolution")]
        frame_len: usize,
    },
}

fn default_kind() -> String {
    WavetableKind::default().name().to_string()
}

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

fn default_frames() -> usize {
    1
}

impl Default for WavetableSource {
    fn default() -> Self {
        Self::Generator {
            kind: default_kind(),
            resolution: default_resolution(),
            frames: default_frames(),
        }
    }
}

impl WavetableSource {
    /// Built-in generator source.
    pub fn generator(kind: WavetableKind, resolution: usize, frames: usize) -> Self {
        Self::Generator {
            kind: kind.name().to_string(),
            resolution,
            frames,
        }
    }

    /// WAV bank source.
    pub fn file(path: impl Into<PathBuf>, frame_len: usize) -> Self {
        Self::File {
            path: path.into(),
            frame_len,
        }
    }

    /// Build the table, resolving relative bank paths against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Wavetable, ConfigError> {
        match self {
            Self::Generator {
                kind,
                resolution,
                frames,
            } => {
                let parsed = kind.parse::<WavetableKind>().map_err(|reason| {
                    crate::ValidationError::InvalidValue {
                        field: "wavetable.kind".to_string(),
                        reason,
                    }
                })?;
                Ok(Wavetable::generate(parsed, *resolution, *frames))
            }
            Self::File { path, frame_len } => {
                let path = if path.is_relative() {
                    base_dir.join(path)
                } else {
                    path.clone()
                };
                Ok(tabula_io::load_wavetable(&path, *frame_len)?)
            }
        }
    }

    fn check(&self, checker: &mut Checker) {
        match self {
            Self::Generator {
                kind,
                resolution,
                frames,
            } => {
                if let Err(reason) = kind.parse::<WavetableKind>() {
                    checker.invalid("wavetable.kind", reason);
                }
                checker.count("wavetable.resolution", *resolution, MIN_FRAME_LEN, MAX_FRAME_LEN);
                checker.count("wavetable.frames", *frames, 1, MAX_GENERATED_FRAMES);
            }
            Self::File { path, frame_len } => {
                if path.as_os_str().is_empty() {
                    checker.invalid("wavetable.path", "path is empty");
                }
                checker.count("wavetable.frame_len", *frame_len, 1, MAX_FRAME_LEN);
            }
        }
    }
}

/// Base oscillator settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OscillatorConfig {
    /// Output level (0.0 to 1.0).
    pub volume: f32,
    /// Stereo position (-1.0 left to 1.0 right).
    pub pan: f32,
    /// Fractional frame position within the wavetable.
    pub frame_position: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            pan: 0.0,
            frame_position: 0.0,
        }
    }
}

/// Unison stack settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnisonConfig {
    /// Voices per note (1 to 12).
    pub voices: usize,
    /// Level of the detuned voices (0.0 to 1.0).
    pub mix: f32,
    /// Pitch and stereo spread of the detuned voices (0.0 to 1.0).
    pub spread: f32,
}

impl Default for UnisonConfig {
    fn default() -> Self {
        Self {
            voices: 1,
            mix: 0.0,
            spread: 0.0,
        }
    }
}

/// ADSR envelope settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Attack time in milliseconds.
    pub attack_ms: f32,
    /// Decay time in milliseconds.
    pub decay_ms: f32,
    /// Sustain level (0.0 to 1.0).
    pub sustain: f32,
    /// Release time in milliseconds.
    pub release_ms: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        AdsrParameters::default().into()
    }
}

impl From<AdsrParameters> for EnvelopeConfig {
    fn from(adsr: AdsrParameters) -> Self {
        Self {
            attack_ms: adsr.attack_ms,
            decay_ms: adsr.decay_ms,
            sustain: adsr.sustain,
            release_ms: adsr.release_ms,
        }
    }
}

impl From<EnvelopeConfig> for AdsrParameters {
    fn from(env: EnvelopeConfig) -> Self {
        AdsrParameters::new(env.attack_ms, env.decay_ms, env.sustain, env.release_ms)
    }
}

/// Pitch-wheel range in semitones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PitchBendConfig {
    /// Range above centre.
    pub up: f32,
    /// Range below centre.
    pub down: f32,
}

impl Default for PitchBendConfig {
    fn default() -> Self {
        Self {
            up: DEFAULT_BEND_SEMITONES,
            down: DEFAULT_BEND_SEMITONES,
        }
    }
}

impl Patch {
    /// Create a patch with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            voice_stealing: default_voice_stealing(),
            wavetable: WavetableSource::default(),
            oscillator: OscillatorConfig::default(),
            unison: UnisonConfig::default(),
            envelope: EnvelopeConfig::default(),
            pitch_bend: PitchBendConfig::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the wavetable source.
    pub fn with_wavetable(mut self, source: WavetableSource) -> Self {
        self.wavetable = source;
        self
    }

    /// Capture the current parameters of a synthesizer.
    ///
    /// The wavetable source is left at its default.
    pub fn from_params(name: impl Into<String>, params: &SynthParams) -> Self {
        Self {
            voice_stealing: params.voice_stealing,
            oscillator: OscillatorConfig {
                volume: params.volume,
                pan: params.pan,
                frame_position: params.frame_position,
            },
            unison: UnisonConfig {
                voices: params.detune_voices,
                mix: params.detune_mix,
                spread: params.detune_spread,
            },
            envelope: params.adsr.into(),
            pitch_bend: PitchBendConfig {
                up: params.pitch_bend_up,
                down: params.pitch_bend_down,
            },
            ..Self::new(name)
        }
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), name = %patch.name, "loaded patch");
        Ok(patch)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against the synthesizer's accepted ranges.
    ///
    /// All offending fields are reported, not just the first.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut checker = Checker::new();

        if self.name.trim().is_empty() {
            checker.invalid("name", "name is empty");
        }

        checker.range("oscillator.volume", self.oscillator.volume, 0.0, 1.0);
        checker.range("oscillator.pan", self.oscillator.pan, -1.0, 1.0);
        checker.range(
            "oscillator.frame_position",
            self.oscillator.frame_position,
            0.0,
            f32::MAX,
        );

        checker.count("unison.voices", self.unison.voices, 1, MAX_DETUNE_VOICES);
        checker.range("unison.mix", self.unison.mix, 0.0, 1.0);
        checker.range("unison.spread", self.unison.spread, 0.0, 1.0);

        checker.range("envelope.attack_ms", self.envelope.attack_ms, 0.0, MAX_SEGMENT_MS);
        checker.range("envelope.decay_ms", self.envelope.decay_ms, 0.0, MAX_SEGMENT_MS);
        checker.range("envelope.sustain", self.envelope.sustain, 0.0, 1.0);
        checker.range("envelope.release_ms", self.envelope.release_ms, 0.0, MAX_SEGMENT_MS);

        checker.range("pitch_bend.up", self.pitch_bend.up, 0.0, MAX_BEND_SEMITONES);
        checker.range("pitch_bend.down", self.pitch_bend.down, 0.0, MAX_BEND_SEMITONES);

        self.wavetable.check(&mut checker);
        checker.finish()
    }

    /// Synthesizer parameters for this patch at `sample_rate`.
    pub fn to_params(&self, sample_rate: f32) -> SynthParams {
        SynthParams {
            sample_rate,
            volume: self.oscillator.volume,
            pan: self.oscillator.pan,
            detune_voices: self.unison.voices,
            detune_mix: self.unison.mix,
            detune_spread: self.unison.spread,
            frame_position: self.oscillator.frame_position,
            adsr: self.envelope.into(),
            pitch_bend_up: self.pitch_bend.up,
            pitch_bend_down: self.pitch_bend.down,
            voice_stealing: self.voice_stealing,
        }
    }

    /// Push every parameter into a running synthesizer.
    ///
    /// The handle's sample rate and wavetable are left untouched.
    pub fn apply_to(&self, handle: &SynthHandle) {
        let sample_rate = handle.params().sample_rate;
        handle.apply(&self.to_params(sample_rate));
        tracing::debug!(name = %self.name, "applied patch");
    }

    /// Build the patch's wavetable, resolving bank paths against `base_dir`.
    pub fn build_wavetable(&self, base_dir: &Path) -> Result<Wavetable, ConfigError> {
        self.wavetable.build(base_dir)
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
