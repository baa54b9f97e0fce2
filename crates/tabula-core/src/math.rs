//! Mathematical utility functions for wavetable synthesis.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Interpolation
//!
//! - [`hermite4`] - 4-point Hermite interpolation between the middle two points
//!
//! # Panning
//!
//! - [`constant_power_pan`] - Equal-power left/right gains from a pan position
//!
//! # Pitch
//!
//! - [`midi_to_freq`] - Equal-tempered note to frequency (A4 = 440 Hz)
//! - [`cents_to_ratio`] - 1200 cents per octave
//!
//! # Utilities
//!
//! - [`wrap_phase`] - Wrap a normalized phase into `[0, 1)`
//! - [`linear_to_db`] - Linear gain to decibels

use core::f32::consts::FRAC_PI_4;
use libm::{cosf, floorf, logf, powf, sinf};

/// 4-point, 3rd-order Hermite interpolation.
///
/// Interpolates between `y1` and `y2` at fractional position `t` in `[0, 1)`,
/// using `y0` and `y3` to derive the tangents at the two inner points. The
/// curve passes exactly through `y1` at `t = 0` and through `y2` at `t = 1`,
/// and its slope is continuous across segment boundaries, which avoids the
/// corners plain linear interpolation leaves in the waveform.
///
/// # Example
/// ```rust
/// use tabula_core::hermite4;
///
/// assert_eq!(hermite4(-1.0, 0.0, 1.0, 2.0, 0.0), 0.0);
/// // A straight line is reproduced exactly
/// assert!((hermite4(-1.0, 0.0, 1.0, 2.0, 0.25) - 0.25).abs() < 1e-6);
/// ```
#[inline]
pub fn hermite4(y0: f32, y1: f32, y2: f32, y3: f32, t: f32) -> f32 {
    let slope0 = (y2 - y0) * 0.5;
    let slope1 = (y3 - y1) * 0.5;
    let delta = y1 - y2;
    let slope_sum = slope0 + delta;
    let a = slope_sum + delta + slope1;
    let b = slope_sum + a;

    ((a * t - b) * t + slope0) * t + y1
}

/// Equal-power pan law.
///
/// Maps `pan` in `[-1, 1]` (hard left to hard right) to `(left, right)` gains
/// `cos θ, sin θ` with `θ = (π/4)(1 + pan)`. At center both gains are
/// `√2 / 2`, so `left² + right² = 1` everywhere.
///
/// Out-of-range input is clamped.
#[inline]
pub fn constant_power_pan(pan: f32) -> (f32, f32) {
    let theta = FRAC_PI_4 * (1.0 + pan.clamp(-1.0, 1.0));
    (cosf(theta), sinf(theta))
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert cents to frequency ratio.
///
/// 100 cents = 1 semitone, 1200 cents = 1 octave.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}

/// Wrap a normalized phase into `[0, 1)`.
///
/// Rounding can push `x - floor(x)` up to exactly `1.0` for tiny negative
/// inputs; that case folds back to `0.0`.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Convert linear gain to decibels.
///
/// Silence is floored at -200 dB instead of returning `-inf`.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_passes_through_inner_points() {
        let (y0, y1, y2, y3) = (0.3, -0.7, 0.9, 0.1);
        assert_eq!(hermite4(y0, y1, y2, y3, 0.0), y1);
        assert!((hermite4(y0, y1, y2, y3, 1.0) - y2).abs() < 1e-6);
    }

    #[test]
    fn test_hermite_reproduces_constant() {
        for i in 0..10 {
            let t = i as f32 / 10.0;
            assert!((hermite4(0.5, 0.5, 0.5, 0.5, t) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hermite_midpoint_of_symmetric_bump() {
        // Symmetric around the midpoint: the curve peaks above the two inner points
        let mid = hermite4(0.0, 1.0, 1.0, 0.0, 0.5);
        assert!(mid > 1.0, "expected overshoot, got {mid}");
    }

    #[test]
    fn test_constant_power_pan_center() {
        let (l, r) = constant_power_pan(0.0);
        assert!((l - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((r - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_constant_power_pan_extremes() {
        let (l, r) = constant_power_pan(-1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);

        let (l, r) = constant_power_pan(1.0);
        assert!(l.abs() < 1e-6);
        assert!((r - 1.0).abs() < 1e-6);

        // Clamped
        assert_eq!(constant_power_pan(5.0), constant_power_pan(1.0));
    }

    #[test]
    fn test_constant_power_pan_preserves_power() {
        for i in -10..=10 {
            let (l, r) = constant_power_pan(i as f32 / 10.0);
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 0.01);
        assert!((midi_to_freq(60) - 261.63).abs() < 0.1);
        assert!((midi_to_freq(81) - 880.0).abs() < 0.01);
    }

    #[test]
    fn test_cents_to_ratio() {
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-5);
        assert!((cents_to_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((cents_to_ratio(-1200.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_phase() {
        assert_eq!(wrap_phase(0.25), 0.25);
        assert!((wrap_phase(1.25) - 0.25).abs() < 1e-6);
        assert!((wrap_phase(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(wrap_phase(-1e-9), 0.0);
        let w = wrap_phase(7.999_999);
        assert!((0.0..1.0).contains(&w));
    }

    #[test]
    fn test_linear_to_db() {
        assert!(linear_to_db(1.0).abs() < 1e-4);
        assert!((linear_to_db(0.5) + 6.02).abs() < 0.01);
        assert!(linear_to_db(0.0).is_finite());
    }
}
