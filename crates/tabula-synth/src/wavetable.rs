//! Multi-frame wavetables.
//!
//! A [`Wavetable`] is an ordered set of equal-length single-cycle frames,
//! stored contiguously. Lookups use 4-point Hermite interpolation with the
//! neighbour indices wrapping around the frame, so every frame is treated as
//! one period of a periodic signal.
//!
//! Tables are immutable once built. The synthesizer shares them between
//! threads behind an `Arc`; a new table is a new allocation, never an
//! in-place edit.

use core::f32::consts::TAU;
use core::fmt;
use std::str::FromStr;

use libm::sinf;
use tabula_core::hermite4;

/// Default samples per frame for generated tables.
pub const DEFAULT_RESOLUTION: usize = 2048;

/// Errors raised when building a [`Wavetable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WavetableError {
    /// No frames were supplied.
    #[error("wavetable has no frames")]
    NoFrames,

    /// A frame length of zero was requested.
    #[error("wavetable frames must contain at least one sample")]
    EmptyFrame,

    /// Frames have differing lengths.
    #[error("frame {frame} has {found} samples, expected {expected}")]
    FrameLengthMismatch {
        /// Index of the offending frame.
        frame: usize,
        /// Length of frame 0.
        expected: usize,
        /// Length of the offending frame.
        found: usize,
    },

    /// A flat sample buffer does not split into whole frames.
    #[error("{len} samples do not divide into frames of {frame_len}")]
    PartialFrame {
        /// Total sample count.
        len: usize,
        /// Requested frame length.
        frame_len: usize,
    },
}

/// An immutable set of single-cycle frames.
///
/// # Example
///
/// ```rust
/// use tabula_synth::Wavetable;
///
/// let table = Wavetable::new(vec![vec![0.0, 1.0, 0.0, -1.0]]).unwrap();
/// assert_eq!(table.num_frames(), 1);
/// assert_eq!(table.frame_len(), 4);
/// assert_eq!(table.sample(0, 0.25), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Vec<f32>,
    frame_len: usize,
}

impl Wavetable {
    /// Build a table from a list of frames.
    ///
    /// # Errors
    ///
    /// Fails if there are no frames, a frame is empty, or frame lengths differ.
    pub fn new(frames: Vec<Vec<f32>>) -> Result<Self, WavetableError> {
        let Some(first) = frames.first() else {
            return Err(WavetableError::NoFrames);
        };
        let frame_len = first.len();
        if frame_len == 0 {
            return Err(WavetableError::EmptyFrame);
        }

        let mut samples = Vec::with_capacity(frame_len * frames.len());
        for (i, frame) in frames.iter().enumerate() {
            if frame.len() != frame_len {
                return Err(WavetableError::FrameLengthMismatch {
                    frame: i,
                    expected: frame_len,
                    found: frame.len(),
                });
            }
            samples.extend_from_slice(frame);
        }

        Ok(Self { samples, frame_len })
    }

    /// Build a single-frame table.
    ///
    /// # Errors
    ///
    /// Fails if `frame` is empty.
    pub fn from_frame(frame: Vec<f32>) -> Result<Self, WavetableError> {
        if frame.is_empty() {
            return Err(WavetableError::EmptyFrame);
        }
        let frame_len = frame.len();
        Ok(Self {
            samples: frame,
            frame_len,
        })
    }

    /// Split a flat sample buffer into frames of `frame_len` samples.
    ///
    /// # Errors
    ///
    /// Fails if `frame_len` is zero, `samples` is empty, or the length is not
    /// a whole number of frames.
    pub fn from_samples(samples: Vec<f32>, frame_len: usize) -> Result<Self, WavetableError> {
        if frame_len == 0 {
            return Err(WavetableError::EmptyFrame);
        }
        if samples.is_empty() {
            return Err(WavetableError::NoFrames);
        }
        if samples.len() % frame_len != 0 {
            return Err(WavetableError::PartialFrame {
                len: samples.len(),
                frame_len,
            });
        }
        Ok(Self { samples, frame_len })
    }

    /// Number of frames.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.frame_len
    }

    /// Samples per frame.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Borrow frame `index`, or `None` if out of range.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.frame_len)?;
        self.samples.get(start..start + self.frame_len)
    }

    /// Iterate over all frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks_exact(self.frame_len)
    }

    /// All samples, frame after frame.
    pub fn as_samples(&self) -> &[f32] {
        &self.samples
    }

    /// Interpolated lookup in frame `index` at normalized `phase`.
    ///
    /// `index` is clamped to the last frame.
    #[inline]
    pub fn sample(&self, index: usize, phase: f32) -> f32 {
        let index = index.min(self.num_frames() - 1);
        let start = index * self.frame_len;
        interpolate(&self.samples[start..start + self.frame_len], phase)
    }

    /// Interpolated lookup at a fractional frame `position`.
    ///
    /// Positions between two frames crossfade linearly between them. The
    /// position is clamped to `[0, num_frames - 1]`.
    #[inline]
    pub fn morph_sample(&self, position: f32, phase: f32) -> f32 {
        let (a, b, blend) = self.frame_pair(position);
        let sa = self.sample(a, phase);
        if blend > 0.0 {
            let sb = self.sample(b, phase);
            sa + (sb - sa) * blend
        } else {
            sa
        }
    }

    /// Resolve a fractional frame position into the two neighbouring frames
    /// and the crossfade amount between them.
    #[inline]
    pub fn frame_pair(&self, position: f32) -> (usize, usize, f32) {
        let last = self.num_frames() - 1;
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, last as f32)
        };
        let a = position as usize;
        let b = (a + 1).min(last);
        (a, b, position - a as f32)
    }

    /// Generate a table of the given kind.
    ///
    /// `frames` only matters for [`WavetableKind::Morph`]; every other kind
    /// produces a single frame.
    pub fn generate(kind: WavetableKind, resolution: usize, frames: usize) -> Self {
        let resolution = resolution.max(4);
        let frame = |shape: fn(f32) -> f32| {
            (0..resolution)
                .map(|i| shape(i as f32 / resolution as f32))
                .collect::<Vec<f32>>()
        };

        let samples = match kind {
            WavetableKind::Sine => frame(sine),
            WavetableKind::Saw => frame(saw),
            WavetableKind::Square => frame(square),
            WavetableKind::MultiSine => frame(multi_sine),
            WavetableKind::Morph => {
                let frames = frames.max(2);
                let mut samples = Vec::with_capacity(resolution * frames);
                for f in 0..frames {
                    let blend = f as f32 / (frames - 1) as f32;
                    samples.extend((0..resolution).map(|i| {
                        let phase = i as f32 / resolution as f32;
                        sine(phase) * (1.0 - blend) + saw(phase) * blend
                    }));
                }
                samples
            }
        };

        Self {
            samples,
            frame_len: resolution,
        }
    }

    /// Single-frame sine table.
    pub fn sine(resolution: usize) -> Self {
        Self::generate(WavetableKind::Sine, resolution, 1)
    }

    /// Single-frame rising sawtooth from -1 to 1.
    pub fn saw(resolution: usize) -> Self {
        Self::generate(WavetableKind::Saw, resolution, 1)
    }

    /// Single-frame square: +1 for the first half cycle, -1 for the second.
    pub fn square(resolution: usize) -> Self {
        Self::generate(WavetableKind::Square, resolution, 1)
    }
}

/// 4-point Hermite lookup into one frame at normalized `phase`.
///
/// At a phase that lands exactly on a stored sample the stored value is
/// returned unchanged.
#[inline]
pub fn interpolate(frame: &[f32], phase: f32) -> f32 {
    let len = frame.len();
    let scaled = phase * len as f32;
    let index = scaled as usize;
    let frac = scaled - index as f32;

    let i1 = index % len;
    let i0 = (i1 + len - 1) % len;
    let i2 = (i1 + 1) % len;
    let i3 = (i1 + 2) % len;

    hermite4(frame[i0], frame[i1], frame[i2], frame[i3], frac)
}

fn sine(phase: f32) -> f32 {
    sinf(TAU * phase)
}

fn saw(phase: f32) -> f32 {
    -1.0 + 2.0 * phase
}

fn square(phase: f32) -> f32 {
    if phase < 0.5 { 1.0 } else { -1.0 }
}

fn multi_sine(phase: f32) -> f32 {
    let theta = TAU * phase;
    sinf(theta) * sinf(3.0 * theta) * sinf(5.0 * theta)
}

/// Built-in table generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WavetableKind {
    /// Pure sine.
    #[default]
    Sine,
    /// Rising sawtooth.
    Saw,
    /// 50% square.
    Square,
    /// Product of the 1st, 3rd and 5th sine harmonics.
    MultiSine,
    /// Frames crossfading from sine to saw.
    Morph,
}

impl WavetableKind {
    /// Every generator, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Sine,
        Self::Saw,
        Self::Square,
        Self::MultiSine,
        Self::Morph,
    ];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Saw => "saw",
            Self::Square => "square",
            Self::MultiSine => "multisine",
            Self::Morph => "morph",
        }
    }
}

impl fmt::Display for WavetableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WavetableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown wavetable kind '{s}' (expected sine, saw, square, multisine or morph)")
            })
    }
}
