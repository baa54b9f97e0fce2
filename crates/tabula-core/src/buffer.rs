//! Stereo audio buffers.
//!
//! [`StereoBlock`] is the borrowed view the synthesizer renders into: two
//! equal-length channel slices supplied by the host once per block.
//! [`StereoBuffer`] owns its channels and hands out blocks, for offline
//! rendering and tests.

use alloc::vec;
use alloc::vec::Vec;

/// Borrowed stereo view over a host-supplied audio block.
///
/// Both channels always have the same length, which is the block length.
#[derive(Debug)]
pub struct StereoBlock<'a> {
    left: &'a mut [f32],
    right: &'a mut [f32],
}

impl<'a> StereoBlock<'a> {
    /// Wrap a pair of channel slices.
    ///
    /// If the slices differ in length, both are truncated to the shorter one.
    pub fn new(left: &'a mut [f32], right: &'a mut [f32]) -> Self {
        debug_assert_eq!(left.len(), right.len(), "channels must have same length");
        let len = left.len().min(right.len());
        Self {
            left: &mut left[..len],
            right: &mut right[..len],
        }
    }

    /// Number of samples per channel.
    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the block holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Left channel samples.
    pub fn left(&self) -> &[f32] {
        &self.left[..]
    }

    /// Right channel samples.
    pub fn right(&self) -> &[f32] {
        &self.right[..]
    }

    /// Mutable access to both channels at once.
    #[inline]
    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut *self.left, &mut *self.right)
    }

    /// Zero `len` samples starting at `start` on both channels.
    ///
    /// The range is clipped to the block.
    #[inline]
    pub fn clear_range(&mut self, start: usize, len: usize) {
        let start = start.min(self.len());
        let end = start.saturating_add(len).min(self.len());
        self.left[start..end].fill(0.0);
        self.right[start..end].fill(0.0);
    }

    /// Zero the entire block.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }
}

/// An owned stereo buffer (separate left/right channels).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a new zeroed stereo buffer with the given length.
    pub fn new(len: usize) -> Self {
        Self {
            left: vec![0.0; len],
            right: vec![0.0; len],
        }
    }

    /// Returns the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Resizes both channels, zeroing new samples.
    pub fn resize(&mut self, len: usize) {
        self.left.resize(len, 0.0);
        self.right.resize(len, 0.0);
    }

    /// Borrow the whole buffer as a [`StereoBlock`].
    pub fn as_block(&mut self) -> StereoBlock<'_> {
        StereoBlock::new(&mut self.left, &mut self.right)
    }

    /// Borrow `len` samples starting at `start` as a [`StereoBlock`].
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the buffer.
    pub fn block(&mut self, start: usize, len: usize) -> StereoBlock<'_> {
        StereoBlock::new(
            &mut self.left[start..start + len],
            &mut self.right[start..start + len],
        )
    }

    /// Largest absolute sample value across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0_f32, |acc, &s| acc.max(libm::fabsf(s)))
    }

    /// Interleave channels as `[L0, R0, L1, R1, ...]`.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            out.push(*l);
            out.push(*r);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_clear_range() {
        let mut buf = StereoBuffer::new(8);
        buf.left.fill(1.0);
        buf.right.fill(1.0);

        let mut block = buf.as_block();
        block.clear_range(2, 3);

        assert_eq!(buf.left, [1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(buf.right, [1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_block_clear_range_clips_to_block() {
        let mut buf = StereoBuffer::new(4);
        buf.left.fill(1.0);
        buf.as_block().clear_range(2, 100);
        assert_eq!(buf.left, [1.0, 1.0, 0.0, 0.0]);

        // Start past the end is a no-op
        buf.left.fill(1.0);
        buf.as_block().clear_range(10, 2);
        assert_eq!(buf.left, [1.0; 4]);
    }

    #[test]
    fn test_sub_block_view() {
        let mut buf = StereoBuffer::new(16);
        {
            let mut block = buf.block(4, 4);
            assert_eq!(block.len(), 4);
            let (l, r) = block.channels_mut();
            l.fill(0.5);
            r.fill(-0.5);
        }
        assert_eq!(buf.left[3], 0.0);
        assert_eq!(buf.left[4], 0.5);
        assert_eq!(buf.right[7], -0.5);
        assert_eq!(buf.right[8], 0.0);
    }

    #[test]
    fn test_peak_and_interleave() {
        let mut buf = StereoBuffer::new(2);
        buf.left = vec![0.25, -0.75];
        buf.right = vec![0.5, 0.1];
        assert_eq!(buf.peak(), 0.75);
        assert_eq!(buf.to_interleaved(), [0.25, 0.5, -0.75, 0.1]);
    }
}
