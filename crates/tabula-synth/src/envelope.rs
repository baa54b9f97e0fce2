//! ADSR envelope generator for synthesis.
//!
//! Linear attack-decay-sustain-release segments. The envelope is the
//! authority on whether a voice is still sounding: it reports inactive only
//! once the release segment has reached zero.

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive: output is zero.
    #[default]
    Idle,
    /// Attack phase: output ramps up toward 1.0.
    Attack,
    /// Decay phase: output falls from 1.0 toward the sustain level.
    Decay,
    /// Sustain phase: output holds at sustain level while gate is held.
    Sustain,
    /// Release phase: output ramps down to zero after gate release.
    Release,
}

/// Attack, decay and release times plus sustain level.
///
/// ## Parameters
/// - `attack_ms`: Attack time (0.0 to 20000.0 ms, default 100.0)
/// - `decay_ms`: Decay time (0.0 to 20000.0 ms, default 100.0)
/// - `sustain`: Sustain level (0.0 to 1.0, default 1.0)
/// - `release_ms`: Release time (0.0 to 20000.0 ms, default 100.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrParameters {
    /// Attack time in milliseconds.
    pub attack_ms: f32,
    /// Decay time in milliseconds.
    pub decay_ms: f32,
    /// Sustain level (0.0 to 1.0).
    pub sustain: f32,
    /// Release time in milliseconds.
    pub release_ms: f32,
}

/// Longest accepted segment time in milliseconds.
pub const MAX_SEGMENT_MS: f32 = 20_000.0;

impl Default for AdsrParameters {
    fn default() -> Self {
        Self {
            attack_ms: 100.0,
            decay_ms: 100.0,
            sustain: 1.0,
            release_ms: 100.0,
        }
    }
}

impl AdsrParameters {
    /// Create a parameter set, clamping every field into range.
    pub fn new(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        }
        .clamped()
    }

    /// Return a copy with every field clamped into its valid range.
    pub fn clamped(self) -> Self {
        let time = |ms: f32| if ms.is_nan() { 0.0 } else { ms.clamp(0.0, MAX_SEGMENT_MS) };
        Self {
            attack_ms: time(self.attack_ms),
            decay_ms: time(self.decay_ms),
            sustain: if self.sustain.is_nan() {
                0.0
            } else {
                self.sustain.clamp(0.0, 1.0)
            },
            release_ms: time(self.release_ms),
        }
    }
}

/// ADSR envelope generator.
///
/// Segments are linear: attack rises to 1.0, decay falls to the sustain
/// level, release falls from wherever the envelope was when the gate closed.
/// A zero-length segment is skipped. Re-triggering while active continues
/// the attack from the current level instead of jumping to zero.
///
/// # Example
///
/// ```rust
/// use tabula_synth::{AdsrEnvelope, AdsrParameters, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_parameters(AdsrParameters::new(10.0, 100.0, 0.7, 200.0));
///
/// env.gate_on();
/// for _ in 0..1000 {
///     let level = env.next_sample();
///     assert!((0.0..=1.0).contains(&level));
/// }
///
/// env.gate_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    /// Current state
    state: EnvelopeState,
    /// Current output level
    level: f32,
    /// Sample rate
    sample_rate: f32,
    /// Segment times and sustain level
    params: AdsrParameters,

    // Per-sample increments (0.0 = segment is skipped)
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create a new ADSR envelope with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate: sample_rate.max(0.0),
            params: AdsrParameters::default(),
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_rates();
        env
    }

    /// Set all segment parameters at once.
    pub fn set_parameters(&mut self, params: AdsrParameters) {
        self.params = params.clamped();
        self.recalculate_rates();
    }

    /// Current segment parameters.
    pub fn parameters(&self) -> AdsrParameters {
        self.params
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(0.0);
        self.recalculate_rates();
    }

    /// Get sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Trigger the envelope (note on).
    pub fn gate_on(&mut self) {
        if self.attack_rate > 0.0 {
            self.state = EnvelopeState::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.state = EnvelopeState::Decay;
        } else {
            self.level = self.params.sustain;
            self.state = EnvelopeState::Sustain;
        }
    }

    /// Release the envelope (note off).
    ///
    /// The release slope is computed from the current level so the tail
    /// always lasts the configured release time.
    pub fn gate_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }

        let release_samples = self.segment_samples(self.params.release_ms);
        if release_samples > 0.0 && self.level > 0.0 {
            self.release_rate = self.level / release_samples;
            self.state = EnvelopeState::Release;
        } else {
            self.reset();
        }
    }

    /// Force envelope to idle state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Get current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Get current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if envelope is active (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => return 0.0,

            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = if self.decay_rate > 0.0 {
                        EnvelopeState::Decay
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }

            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.params.sustain {
                    self.level = self.params.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }

        self.level
    }

    fn segment_samples(&self, ms: f32) -> f32 {
        let samples = ms * self.sample_rate / 1000.0;
        if samples >= 1.0 { samples } else { 0.0 }
    }

    fn recalculate_rates(&mut self) {
        let attack = self.segment_samples(self.params.attack_ms);
        self.attack_rate = if attack > 0.0 { 1.0 / attack } else { 0.0 };

        let decay = self.segment_samples(self.params.decay_ms);
        self.decay_rate = if decay > 0.0 {
            (1.0 - self.params.sustain) / decay
        } else {
            0.0
        };

        let release = self.segment_samples(self.params.release_ms);
        if self.state == EnvelopeState::Release && release > 0.0 {
            self.release_rate = self.level / release;
        }
    }
}
