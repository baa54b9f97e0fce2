//! Offline block renderer.
//!
//! Drives [`Synthesizer::process_block`] over a whole timeline the same way a
//! host would: fixed-size blocks, each with the events that fall inside it
//! rebased to block-relative offsets.

use tabula_core::StereoBuffer;
use tabula_synth::{MAX_POLYPHONY, MidiEvent, MidiMessage, SynthHandle, Synthesizer};

/// Block size used when none is given.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// A MIDI message at an absolute sample position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedMessage {
    /// Sample index from the start of the render.
    pub at: usize,
    /// Message applied at that sample.
    pub message: MidiMessage,
}

impl TimedMessage {
    /// Create a message scheduled at sample `at`.
    pub fn new(at: usize, message: MidiMessage) -> Self {
        Self { at, message }
    }
}

/// Renders a timeline through a synthesizer in fixed-size blocks.
pub struct OfflineRenderer<const VOICES: usize = MAX_POLYPHONY> {
    synth: Synthesizer<VOICES>,
    block_size: usize,
    events: Vec<MidiEvent>,
}

impl<const VOICES: usize> OfflineRenderer<VOICES> {
    /// Wrap `synth`, rendering `block_size` samples per call.
    ///
    /// A block size of 0 is raised to 1.
    pub fn new(synth: Synthesizer<VOICES>, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            synth,
            block_size,
            events: Vec::with_capacity(64),
        }
    }

    /// Samples per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The wrapped synthesizer.
    pub fn synth(&self) -> &Synthesizer<VOICES> {
        &self.synth
    }

    /// Mutable access to the wrapped synthesizer.
    pub fn synth_mut(&mut self) -> &mut Synthesizer<VOICES> {
        &mut self.synth
    }

    /// Control handle of the wrapped synthesizer.
    pub fn handle(&self) -> SynthHandle {
        self.synth.handle()
    }

    /// Consume the renderer and return the synthesizer.
    pub fn into_synth(self) -> Synthesizer<VOICES> {
        self.synth
    }

    /// Render `num_samples` of audio for `timeline`.
    pub fn render(&mut self, timeline: &[TimedMessage], num_samples: usize) -> StereoBuffer {
        self.render_with_progress(timeline, num_samples, |_, _| {})
    }

    /// Render like [`render`](Self::render), calling `progress(done, total)`
    /// after every block.
    ///
    /// The timeline need not be sorted; messages sharing a position keep
    /// their relative order. Messages at or past `num_samples` are ignored.
    pub fn render_with_progress<F>(
        &mut self,
        timeline: &[TimedMessage],
        num_samples: usize,
        mut progress: F,
    ) -> StereoBuffer
    where
        F: FnMut(usize, usize),
    {
        let mut sorted = timeline.to_vec();
        sorted.sort_by_key(|m| m.at);

        let dropped = sorted.iter().filter(|m| m.at >= num_samples).count();
        if dropped > 0 {
            tracing::warn!(dropped, num_samples, "messages past the end of the render ignored");
        }

        let mut output = StereoBuffer::new(num_samples);
        let mut pending = sorted.iter().peekable();
        let mut start = 0;

        while start < num_samples {
            let len = self.block_size.min(num_samples - start);
            let end = start + len;

            self.events.clear();
            while let Some(message) = pending.next_if(|m| m.at < end) {
                self.events
                    .push(MidiEvent::new(message.at - start, message.message));
            }

            self.synth
                .process_block(&mut output.block(start, len), &self.events);

            start = end;
            progress(start, num_samples);
        }

        tracing::debug!(
            num_samples,
            block_size = self.block_size,
            messages = sorted.len() - dropped,
            "offline render finished"
        );
        output
    }
}
