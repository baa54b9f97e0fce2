//! Score files: timed notes and pitch-bend moves for offline rendering.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tabula_io::TimedMessage;
use tabula_synth::{MidiMessage, PITCH_WHEEL_MAX};

use crate::error::ConfigError;
use crate::validation::{Checker, ValidationResult};

/// A list of notes and pitch-wheel moves, timed in seconds.
///
/// # TOML Format
///
/// ```toml
/// name = "Arpeggio"
///
/// [[notes]]
/// at = 0.0
/// note = 60
/// velocity = 0.8
/// duration = 0.5
///
/// [[bends]]
/// at = 0.25
/// value = 12288
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Score {
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Minimum length in seconds; the score is never shorter than its last
    /// event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Notes to play.
    #[serde(default)]
    pub notes: Vec<ScoreNote>,

    /// Pitch-wheel moves.
    #[serde(default)]
    pub bends: Vec<ScoreBend>,
}

/// One note of a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreNote {
    /// Start time in seconds.
    pub at: f64,
    /// MIDI note number.
    pub note: u8,
    /// Velocity (0.0 to 1.0).
    #[serde(default = "default_velocity")]
    pub velocity: f32,
    /// Time until note-off in seconds.
    pub duration: f64,
}

fn default_velocity() -> f32 {
    1.0
}

/// One pitch-wheel move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreBend {
    /// Time in seconds.
    pub at: f64,
    /// 14-bit wheel value, 8192 is centre.
    pub value: u16,
}

impl ScoreNote {
    /// A note starting at `at` seconds and lasting `duration` seconds.
    pub fn new(at: f64, note: u8, velocity: f32, duration: f64) -> Self {
        Self {
            at,
            note,
            velocity,
            duration,
        }
    }
}

impl Score {
    /// Create an empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note.
    pub fn with_note(mut self, note: ScoreNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Add a pitch-wheel move.
    pub fn with_bend(mut self, at: f64, value: u16) -> Self {
        self.bends.push(ScoreBend { at, value });
        self
    }

    /// Load a score from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let score = Self::from_toml(&content)?;
        tracing::debug!(
            path = %path.display(),
            notes = score.notes.len(),
            bends = score.bends.len(),
            "loaded score"
        );
        Ok(score)
    }

    /// Load a score from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the score to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the score to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check note numbers, velocities, times and wheel values.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut checker = Checker::new();

        if let Some(length) = self.length {
            checker.range("length", length as f32, 0.0, f32::MAX);
        }
        for (i, note) in self.notes.iter().enumerate() {
            checker.range(&format!("notes[{i}].at"), note.at as f32, 0.0, f32::MAX);
            checker.count(&format!("notes[{i}].note"), usize::from(note.note), 0, 127);
            checker.range(&format!("notes[{i}].velocity"), note.velocity, 0.0, 1.0);
            checker.range(&format!("notes[{i}].duration"), note.duration as f32, 0.0, f32::MAX);
        }
        for (i, bend) in self.bends.iter().enumerate() {
            checker.range(&format!("bends[{i}].at"), bend.at as f32, 0.0, f32::MAX);
            checker.count(
                &format!("bends[{i}].value"),
                usize::from(bend.value),
                0,
                usize::from(PITCH_WHEEL_MAX),
            );
        }

        checker.finish()
    }

    /// Seconds until the last note-off or bend, or `length` if longer.
    pub fn duration_secs(&self) -> f64 {
        let notes = self.notes.iter().map(|n| n.at + n.duration.max(0.0));
        let bends = self.bends.iter().map(|b| b.at);
        notes
            .chain(bends)
            .chain(self.length)
            .fold(0.0, f64::max)
    }

    /// Samples needed to render the score plus `tail_secs` of release.
    pub fn num_samples(&self, sample_rate: f32, tail_secs: f64) -> usize {
        to_samples(self.duration_secs() + tail_secs.max(0.0), sample_rate)
    }

    /// Convert to a sample-positioned timeline at `sample_rate`.
    ///
    /// The result is sorted by position. At equal positions note-offs come
    /// first and note-ons last, so a note ending exactly where the same note
    /// starts again is re-struck instead of cut. A note-off always lands at
    /// least one sample after its note-on, so notes shorter than a sample
    /// still release.
    pub fn to_timeline(&self, sample_rate: f32) -> Vec<TimedMessage> {
        let mut timeline = Vec::with_capacity(self.notes.len() * 2 + self.bends.len());

        for note in &self.notes {
            let start = to_samples(note.at, sample_rate);
            let end = to_samples(note.at + note.duration.max(0.0), sample_rate).max(start + 1);
            timeline.push(TimedMessage::new(
                start,
                MidiMessage::note_on(note.note, note.velocity),
            ));
            timeline.push(TimedMessage::new(end, MidiMessage::note_off(note.note)));
        }
        for bend in &self.bends {
            timeline.push(TimedMessage::new(
                to_samples(bend.at, sample_rate),
                MidiMessage::pitch_bend(bend.value),
            ));
        }

        timeline.sort_by_key(|m| (m.at, order(&m.message)));
        timeline
    }
}

fn order(message: &MidiMessage) -> u8 {
    match message {
        MidiMessage::NoteOff { .. } | MidiMessage::AllNotesOff => 0,
        MidiMessage::PitchBend { .. } => 1,
        MidiMessage::NoteOn { .. } => 2,
    }
}

fn to_samples(secs: f64, sample_rate: f32) -> usize {
    let samples = (secs.max(0.0) * f64::from(sample_rate)).round();
    samples as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_from_toml() {
        let toml = r#"
name = "Two notes"

[[notes]]
at = 0.0
note = 60
velocity = 0.5
duration = 1.0

[[notes]]
at = 0.5
note = 64
duration = 0.25

[[bends]]
at = 0.75
value = 16383
"#;
        let score = Score::from_toml(toml).unwrap();
        assert_eq!(score.name.as_deref(), Some("Two notes"));
        assert_eq!(score.notes.len(), 2);
        assert_eq!(score.notes[1].velocity, 1.0);
        assert_eq!(score.bends[0].value, 16383);
        assert!(score.validate().is_ok());
    }

    #[test]
    fn test_timeline_positions() {
        let score = Score::new()
            .with_note(ScoreNote::new(0.5, 60, 0.8, 0.25))
            .with_bend(0.1, 10000);
        let timeline = score.to_timeline(1000.0);

        assert_eq!(
            timeline,
            vec![
                TimedMessage::new(100, MidiMessage::pitch_bend(10000)),
                TimedMessage::new(500, MidiMessage::note_on(60, 0.8)),
                TimedMessage::new(750, MidiMessage::note_off(60)),
            ]
        );
    }

    #[test]
    fn test_note_off_sorts_before_note_on() {
        let score = Score::new()
            .with_note(ScoreNote::new(1.0, 60, 1.0, 1.0))
            .with_note(ScoreNote::new(0.0, 60, 1.0, 1.0));
        let timeline = score.to_timeline(100.0);

        let at_100: Vec<_> = timeline.iter().filter(|m| m.at == 100).collect();
        assert_eq!(at_100.len(), 2);
        assert_eq!(at_100[0].message, MidiMessage::note_off(60));
        assert_eq!(at_100[1].message, MidiMessage::note_on(60, 1.0));
    }

    #[test]
    fn test_zero_length_notes_still_release() {
        // 0.0 s and a duration shorter than one sample at 48 kHz
        for duration in [0.0, 0.000_001] {
            let score = Score::new().with_note(ScoreNote::new(0.0, 60, 1.0, duration));
            assert!(score.validate().is_ok());

            let timeline = score.to_timeline(48000.0);
            assert_eq!(
                timeline,
                vec![
                    TimedMessage::new(0, MidiMessage::note_on(60, 1.0)),
                    TimedMessage::new(1, MidiMessage::note_off(60)),
                ]
            );
        }
    }

    #[test]
    fn test_duration_and_length() {
        let mut score = Score::new()
            .with_note(ScoreNote::new(1.0, 60, 1.0, 0.5))
            .with_bend(2.0, 8192);
        assert_eq!(score.duration_secs(), 2.0);
        assert_eq!(score.num_samples(100.0, 0.5), 250);

        score.length = Some(4.0);
        assert_eq!(score.duration_secs(), 4.0);
        assert_eq!(Score::new().duration_secs(), 0.0);
    }

    #[test]
    fn test_validate_lists_fields() {
        let score = Score::new()
            .with_note(ScoreNote::new(-1.0, 200, 2.0, 1.0))
            .with_bend(0.0, 20000);
        let err = score.validate().unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["notes[0].at", "notes[0].note", "notes[0].velocity", "bends[0].value"]
        );
    }

    #[test]
    fn test_roundtrip() {
        let score = Score::new()
            .with_note(ScoreNote::new(0.0, 48, 0.7, 2.0))
            .with_bend(1.0, 4096);
        let parsed = Score::from_toml(&score.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, score);
    }
}
