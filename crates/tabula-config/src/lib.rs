//! Patch and score files for the tabula synthesizer.
//!
//! # Features
//!
//! - **Patches**: every synthesizer parameter plus a wavetable source, stored
//!   as TOML and pushed into a running synth through its
//!   [`SynthHandle`](tabula_synth::SynthHandle)
//! - **Scores**: notes and pitch-wheel moves timed in seconds, converted to
//!   a sample timeline for [`OfflineRenderer`](tabula_io::OfflineRenderer)
//! - **Validation**: range checks that report every offending field
//! - **Factory patches**: built-in starting points
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tabula_config::{Patch, Score};
//! use tabula_io::OfflineRenderer;
//! use tabula_synth::Synthesizer;
//!
//! let patch = Patch::load("pad.toml").unwrap();
//! patch.validate().unwrap();
//!
//! let synth: Synthesizer = Synthesizer::with_params(&patch.to_params(48000.0));
//! synth.set_wavetable(patch.build_wavetable(Path::new(".")).unwrap());
//!
//! let score = Score::load("melody.toml").unwrap();
//! let mut renderer = OfflineRenderer::new(synth, 256);
//! let audio = renderer.render(&score.to_timeline(48000.0), score.num_samples(48000.0, 2.0));
//! println!("peak {}", audio.peak());
//! ```

mod error;
mod patch;
mod score;

/// Range checks for patch and score values.
pub mod validation;

/// Factory patches bundled with the library.
pub mod factory;

pub use error::ConfigError;
pub use factory::{FACTORY_PATCH_NAMES, factory_patches, get_factory_patch, is_factory_patch};
pub use patch::{
    EnvelopeConfig, MAX_FRAME_LEN, MAX_GENERATED_FRAMES, MIN_FRAME_LEN, OscillatorConfig, Patch,
    PitchBendConfig, UnisonConfig, WavetableSource,
};
pub use score::{Score, ScoreBend, ScoreNote};
pub use validation::{ValidationError, ValidationResult};
