//! Lock-free parameters shared between a control thread and the audio thread.
//!
//! [`AtomicParam`] stores an `f32` bit-cast into an `AtomicU32`. Writers clamp
//! into the parameter's range on store; the audio thread loads once per block.
//! No locks, no allocation.

use core::sync::atomic::{AtomicU32, Ordering};

/// A thread-safe f32 parameter with a fixed range.
///
/// # Example
///
/// ```rust
/// use tabula_core::AtomicParam;
///
/// let volume = AtomicParam::new(0.75, 0.0, 1.0);
/// volume.set(3.0);
/// assert_eq!(volume.get(), 1.0);
/// ```
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a new atomic parameter with range and default.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "min must not exceed max");
        let default = default.clamp(min, max);
        Self {
            value: AtomicU32::new(default.to_bits()),
            min,
            max,
            default,
        }
    }

    /// Set the parameter value, clamped into range (control thread).
    ///
    /// NaN is ignored and leaves the previous value in place.
    #[inline]
    pub fn set(&self, v: f32) {
        if v.is_nan() {
            return;
        }
        let clamped = v.clamp(self.min, self.max);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Get the parameter value (audio thread).
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Get the minimum value.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Get the maximum value.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Get the default value.
    pub fn default(&self) -> f32 {
        self.default
    }

    /// Reset to default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

impl Clone for AtomicParam {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU32::new(self.value.load(Ordering::Acquire)),
            min: self.min,
            max: self.max,
            default: self.default,
        }
    }
}
