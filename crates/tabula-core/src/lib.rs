//! Tabula Core - DSP primitives for the tabula wavetable synthesizer
//!
//! This crate holds the small, allocation-free building blocks the synthesis
//! engine is assembled from. Everything here is safe to call from a real-time
//! audio thread.
//!
//! # Core Abstractions
//!
//! ## Interpolation & Panning
//!
//! - [`hermite4`] - 4-point, 3rd-order Hermite interpolation
//! - [`constant_power_pan`] - Equal-power stereo pan law
//!
//! ## Pitch
//!
//! - [`midi_to_freq`] - Equal-tempered note to frequency (A4 = 440 Hz)
//! - [`cents_to_ratio`] - Cent offsets to frequency ratios
//!
//! ## Buffers
//!
//! - [`StereoBlock`] - Borrowed left/right view of a host audio block
//! - [`StereoBuffer`] - Owned stereo buffer (requires `alloc`)
//!
//! ## Cross-thread Parameters
//!
//! - [`AtomicParam`] - Lock-free f32 parameter with range clamping
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build without the standard library:
//!
//! ```toml
//! [dependencies]
//! tabula-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{constant_power_pan, hermite4, midi_to_freq};
//!
//! let freq = midi_to_freq(69);
//! assert!((freq - 440.0).abs() < 1e-3);
//!
//! let (left, right) = constant_power_pan(0.0);
//! assert!((left - right).abs() < 1e-6);
//!
//! // Offset 0 returns the second point exactly
//! assert_eq!(hermite4(0.1, 0.5, 0.9, 0.2, 0.0), 0.5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod math;
pub mod param;

pub use buffer::{StereoBlock, StereoBuffer};
pub use math::{
    cents_to_ratio, constant_power_pan, hermite4, linear_to_db, midi_to_freq, wrap_phase,
};
pub use param::AtomicParam;
