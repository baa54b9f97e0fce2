//! Unison detune layout.
//!
//! A [`DetuneTable`] describes how one oscillator splits into `N` stacked
//! copies of itself. One centre voice (two when `N` is even) plays at the
//! base pitch and pan. The rest form symmetric pairs, one sharp and panned
//! right, one flat and panned left, with offsets growing linearly toward the
//! outermost pair.
//!
//! ```text
//! ratio   = 1 ± MAX_DETUNE_SPREAD * spread * p / pairs
//! pan     = base_pan ± spread * p / pairs
//! volume  = mix            (centre voices: 1.0)
//! ```
//!
//! The summed output is scaled by `1 / Σ volume` so that adding voices does
//! not make the oscillator louder.

/// Maximum number of unison voices per oscillator.
pub const MAX_DETUNE_VOICES: usize = 12;

/// Frequency offset of the outermost pair at full spread (±5%).
pub const MAX_DETUNE_SPREAD: f32 = 0.05;

/// Pitch, pan and level offsets for one unison voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnisonVoice {
    /// Multiplier applied to the oscillator frequency.
    pub frequency_ratio: f32,
    /// Offset added to the oscillator pan.
    pub pan_offset: f32,
    /// Level of this voice before normalization.
    pub volume: f32,
}

impl UnisonVoice {
    const CENTRE: Self = Self {
        frequency_ratio: 1.0,
        pan_offset: 0.0,
        volume: 1.0,
    };
}

/// Per-voice offsets for the active unison voices.
#[derive(Clone, Debug, PartialEq)]
pub struct DetuneTable {
    voices: [UnisonVoice; MAX_DETUNE_VOICES],
    count: usize,
    normalization: f32,
}

impl Default for DetuneTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl DetuneTable {
    /// A single centre voice: no detune, no pan offset, unity gain.
    pub fn identity() -> Self {
        Self::new(1, 0.0, 0.0)
    }

    /// Compute the layout for `voices` unison voices.
    ///
    /// `voices` is clamped to `[1, MAX_DETUNE_VOICES]`, `mix` and `spread`
    /// to `[0, 1]`.
    pub fn new(voices: usize, mix: f32, spread: f32) -> Self {
        let count = voices.clamp(1, MAX_DETUNE_VOICES);
        let mix = unit(mix);
        let spread = unit(spread);

        let mut table = [UnisonVoice::CENTRE; MAX_DETUNE_VOICES];

        let centre = if count % 2 == 1 { 1 } else { 2 };
        let pairs = (count - centre) / 2;

        for p in 1..=pairs {
            let offset = p as f32 / pairs as f32;
            let ratio = MAX_DETUNE_SPREAD * spread * offset;
            let pan = spread * offset;
            let slot = centre + 2 * (p - 1);

            table[slot] = UnisonVoice {
                frequency_ratio: 1.0 - ratio,
                pan_offset: -pan,
                volume: mix,
            };
            table[slot + 1] = UnisonVoice {
                frequency_ratio: 1.0 + ratio,
                pan_offset: pan,
                volume: mix,
            };
        }

        let total: f32 = table[..count].iter().map(|v| v.volume).sum();

        Self {
            voices: table,
            count,
            normalization: 1.0 / total,
        }
    }

    /// The active voices, centre voices first.
    #[inline]
    pub fn voices(&self) -> &[UnisonVoice] {
        &self.voices[..self.count]
    }

    /// Number of active voices.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false: a table holds at least one voice.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Gain applied to the summed voices.
    #[inline]
    pub fn normalization(&self) -> f32 {
        self.normalization
    }
}

fn unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let table = DetuneTable::identity();
        assert_eq!(table.voices(), &[UnisonVoice::CENTRE]);
        assert_eq!(table.normalization(), 1.0);
    }

    #[test]
    fn test_single_voice_ignores_mix_and_spread() {
        assert_eq!(DetuneTable::new(1, 0.3, 1.0), DetuneTable::identity());
    }

    #[test]
    fn test_odd_count_layout() {
        let table = DetuneTable::new(5, 0.5, 1.0);
        let v = table.voices();
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], UnisonVoice::CENTRE);

        // Inner pair at half offset
        assert!((v[1].frequency_ratio - 0.975).abs() < 1e-6);
        assert!((v[2].frequency_ratio - 1.025).abs() < 1e-6);
        assert!((v[1].pan_offset + 0.5).abs() < 1e-6);
        assert!((v[2].pan_offset - 0.5).abs() < 1e-6);

        // Outer pair at full offset
        assert!((v[3].frequency_ratio - 0.95).abs() < 1e-6);
        assert!((v[4].frequency_ratio - 1.05).abs() < 1e-6);
        assert!((v[3].pan_offset + 1.0).abs() < 1e-6);
        assert!((v[4].pan_offset - 1.0).abs() < 1e-6);

        assert!(v[1..].iter().all(|u| u.volume == 0.5));
        assert!((table.normalization() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_even_count_has_two_centre_voices() {
        let table = DetuneTable::new(4, 1.0, 0.5);
        let v = table.voices();
        assert_eq!(v[0], UnisonVoice::CENTRE);
        assert_eq!(v[1], UnisonVoice::CENTRE);
        assert!((v[2].frequency_ratio - 0.975).abs() < 1e-6);
        assert!((v[3].frequency_ratio - 1.025).abs() < 1e-6);
        assert!((table.normalization() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_two_voices_are_both_centred() {
        let table = DetuneTable::new(2, 0.2, 1.0);
        assert!(table.voices().iter().all(|v| *v == UnisonVoice::CENTRE));
        assert_eq!(table.normalization(), 0.5);
    }

    #[test]
    fn test_zero_spread_keeps_pairs_on_pitch() {
        let table = DetuneTable::new(7, 1.0, 0.0);
        for v in table.voices() {
            assert_eq!(v.frequency_ratio, 1.0);
            assert_eq!(v.pan_offset, 0.0);
        }
    }

    #[test]
    fn test_zero_mix_silences_pairs() {
        let table = DetuneTable::new(3, 0.0, 1.0);
        assert_eq!(table.voices()[1].volume, 0.0);
        assert_eq!(table.voices()[2].volume, 0.0);
        assert_eq!(table.normalization(), 1.0);
    }

    #[test]
    fn test_voice_count_clamped() {
        assert_eq!(DetuneTable::new(0, 1.0, 1.0).len(), 1);
        assert_eq!(DetuneTable::new(40, 1.0, 1.0).len(), MAX_DETUNE_VOICES);
    }
}
