//! MIDI events and pitch-wheel handling.
//!
//! The synthesizer consumes already-decoded [`MidiMessage`]s, each tagged
//! with a sample offset inside the current block. [`MidiMessage::from_bytes`]
//! decodes raw channel-voice bytes for hosts that deliver them undecoded.

/// Pitch-wheel value at rest.
pub const PITCH_WHEEL_CENTER: u16 = 8192;

/// Largest 14-bit pitch-wheel value.
pub const PITCH_WHEEL_MAX: u16 = 16383;

/// Largest accepted pitch-bend range in semitones.
pub const MAX_BEND_SEMITONES: f32 = 48.0;

/// Default bend range in either direction, in semitones.
pub const DEFAULT_BEND_SEMITONES: f32 = 2.0;

const CC_ALL_SOUND_OFF: u8 = 120;
const CC_ALL_NOTES_OFF: u8 = 123;

/// A decoded MIDI message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiMessage {
    /// Start a note. Velocity is normalized to `[0, 1]`.
    NoteOn {
        /// MIDI note number.
        note: u8,
        /// Normalized velocity.
        velocity: f32,
    },
    /// Release a note.
    NoteOff {
        /// MIDI note number.
        note: u8,
    },
    /// Move the pitch wheel. `value` is 14-bit, 8192 is centre.
    PitchBend {
        /// Raw wheel position.
        value: u16,
    },
    /// Release every sounding note.
    AllNotesOff,
}

impl MidiMessage {
    /// Note-on with velocity clamped to `[0, 1]`.
    pub fn note_on(note: u8, velocity: f32) -> Self {
        let velocity = if velocity.is_nan() { 0.0 } else { velocity.clamp(0.0, 1.0) };
        Self::NoteOn { note, velocity }
    }

    /// Note-off.
    pub fn note_off(note: u8) -> Self {
        Self::NoteOff { note }
    }

    /// Pitch bend with `value` clamped to 14 bits.
    pub fn pitch_bend(value: u16) -> Self {
        Self::PitchBend {
            value: value.min(PITCH_WHEEL_MAX),
        }
    }

    /// Decode a raw channel-voice message, ignoring the channel.
    ///
    /// Note-on with velocity 0 decodes as note-off. Controller 123 (all notes
    /// off) and 120 (all sound off) decode as [`MidiMessage::AllNotesOff`].
    /// Anything else returns `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let d0 = data.first().map(|b| b & 0x7F);
        let d1 = data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(Self::note_off(d0?)),
            0x90 => {
                let (note, velocity) = (d0?, d1?);
                if velocity == 0 {
                    Some(Self::note_off(note))
                } else {
                    Some(Self::note_on(note, f32::from(velocity) / 127.0))
                }
            }
            0xB0 => match d0? {
                CC_ALL_NOTES_OFF | CC_ALL_SOUND_OFF => Some(Self::AllNotesOff),
                _ => None,
            },
            0xE0 => {
                let (lsb, msb) = (d0?, d1?);
                Some(Self::pitch_bend(u16::from(lsb) | (u16::from(msb) << 7)))
            }
            _ => None,
        }
    }
}

/// A MIDI message at a sample offset inside a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MidiEvent {
    /// Sample offset from the start of the block.
    pub offset: usize,
    /// The message.
    pub message: MidiMessage,
}

impl MidiEvent {
    /// Create an event.
    pub fn new(offset: usize, message: MidiMessage) -> Self {
        Self { offset, message }
    }
}

/// Normalized wheel position in `[-1, 1]`.
///
/// Values above centre scale by the upper half-range (8191 steps), values at
/// or below centre by the lower half-range (8192 steps), so both extremes map
/// exactly to ±1.
pub fn pitch_wheel_position(value: u16) -> f32 {
    let value = f32::from(value.min(PITCH_WHEEL_MAX));
    let center = f32::from(PITCH_WHEEL_CENTER);
    if value > center {
        (value - center) / (f32::from(PITCH_WHEEL_MAX) - center)
    } else {
        (value - center) / center
    }
}

/// Pitch-wheel state and bend range.
///
/// ## Parameters
/// - `up`: Bend range above centre in semitones (0.0 to 48.0, default 2.0)
/// - `down`: Bend range below centre in semitones (0.0 to 48.0, default 2.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchBend {
    position: f32,
    up: f32,
    down: f32,
}

impl Default for PitchBend {
    fn default() -> Self {
        Self {
            position: 0.0,
            up: DEFAULT_BEND_SEMITONES,
            down: DEFAULT_BEND_SEMITONES,
        }
    }
}

impl PitchBend {
    /// Wheel at rest with the default range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bend range in semitones.
    pub fn set_range(&mut self, up: f32, down: f32) {
        let clamp = |s: f32| if s.is_nan() { 0.0 } else { s.clamp(0.0, MAX_BEND_SEMITONES) };
        self.up = clamp(up);
        self.down = clamp(down);
    }

    /// Bend range `(up, down)` in semitones.
    pub fn range(&self) -> (f32, f32) {
        (self.up, self.down)
    }

    /// Record a raw wheel value.
    pub fn set_wheel(&mut self, value: u16) {
        self.position = pitch_wheel_position(value);
    }

    /// Normalized wheel position in `[-1, 1]`.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Current pitch offset in cents.
    pub fn cents(&self) -> f32 {
        let range = if self.position >= 0.0 { self.up } else { self.down };
        self.position * range * 100.0
    }
}
