//! Voice pool and allocation policy.
//!
//! A [`Voice`] pairs one [`Oscillator`] with the note it is playing and its
//! age in blocks. A voice is *free* when it has no age; it is assigned on
//! note-on, keeps its note through the release tail, and is freed at the
//! next block boundary after its envelope goes idle.
//!
//! Allocation order for an incoming note:
//!
//! 1. a voice already assigned to the same note (re-trigger),
//! 2. the first free voice,
//! 3. if stealing is allowed, the oldest voice, lowest id on ties,
//! 4. otherwise none, and the note is dropped.

use crate::oscillator::Oscillator;

/// Default number of voices in a [`VoicePool`].
pub const MAX_POLYPHONY: usize = 16;

/// One polyphonic voice.
#[derive(Debug, Clone)]
pub struct Voice {
    id: usize,
    note: Option<u8>,
    age: Option<u64>,
    oscillator: Oscillator,
}

impl Voice {
    /// Create a free voice.
    pub fn new(id: usize, sample_rate: f32) -> Self {
        Self {
            id,
            note: None,
            age: None,
            oscillator: Oscillator::new(sample_rate),
        }
    }

    /// Position of this voice in its pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Assigned note, kept through the release tail.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Blocks since the note started, `None` while free.
    pub fn age(&self) -> Option<u64> {
        self.age
    }

    /// True if the voice can take a new note without stealing.
    pub fn is_free(&self) -> bool {
        self.age.is_none()
    }

    /// The voice's oscillator.
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// Mutable access to the voice's oscillator.
    pub fn oscillator_mut(&mut self) -> &mut Oscillator {
        &mut self.oscillator
    }

    /// Assign `note` and reset the age to zero.
    pub fn assign(&mut self, note: u8) {
        self.note = Some(note);
        self.age = Some(0);
    }

    /// Clear the note and mark the voice free.
    pub fn free(&mut self) {
        self.note = None;
        self.age = None;
    }

    pub(crate) fn set_age(&mut self, age: Option<u64>) {
        self.age = age;
    }

    /// Free the voice if its envelope has finished, otherwise age it by one.
    fn tick(&mut self) {
        if self.oscillator.adsr_envelope_is_active() {
            if let Some(age) = self.age.as_mut() {
                *age += 1;
            }
        } else {
            self.free();
        }
    }
}

/// A fixed pool of `N` voices.
#[derive(Debug, Clone)]
pub struct VoicePool<const N: usize = MAX_POLYPHONY> {
    voices: [Voice; N],
}

impl<const N: usize> VoicePool<N> {
    /// Create `N` free voices.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|id| Voice::new(id, sample_rate)),
        }
    }

    /// Number of voices.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of assigned voices, including those in release.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Mutable access to all voices.
    pub fn voices_mut(&mut self) -> &mut [Voice; N] {
        &mut self.voices
    }

    /// Voice by id.
    pub fn get(&self, id: usize) -> Option<&Voice> {
        self.voices.get(id)
    }

    /// Mutable voice by id.
    pub fn get_mut(&mut self, id: usize) -> Option<&mut Voice> {
        self.voices.get_mut(id)
    }

    /// Voice assigned to `note`, if any.
    pub fn find_voice_playing_note(&self, note: u8) -> Option<usize> {
        self.voices.iter().position(|v| v.note == Some(note))
    }

    /// Lowest-id free voice.
    pub fn find_free_voice(&self) -> Option<usize> {
        self.voices.iter().position(Voice::is_free)
    }

    /// Assigned voice with the greatest age, lowest id on ties.
    pub fn find_oldest_voice(&self) -> Option<usize> {
        let mut oldest: Option<(usize, u64)> = None;
        for voice in &self.voices {
            if let Some(age) = voice.age
                && oldest.is_none_or(|(_, best)| age > best)
            {
                oldest = Some((voice.id, age));
            }
        }
        oldest.map(|(id, _)| id)
    }

    /// Choose a voice for `note`.
    pub fn find_voice(&self, note: u8, stealing: bool) -> Option<usize> {
        self.find_voice_playing_note(note)
            .or_else(|| self.find_free_voice())
            .or_else(|| if stealing { self.find_oldest_voice() } else { None })
    }

    /// Free finished voices and age the rest. Call once per block.
    pub fn update_voice_ages(&mut self) {
        for voice in &mut self.voices {
            if !voice.is_free() {
                voice.tick();
            }
        }
    }
}
