//! File I/O and offline rendering for the tabula synthesizer.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`], [`write_wav`] and [`write_wav_stereo`]
//! - **Wavetable banks**: [`load_wavetable`] and [`save_wavetable`] store a
//!   multi-frame table as consecutive single-cycle frames in a mono WAV
//! - **Offline rendering**: [`OfflineRenderer`] drives a
//!   [`Synthesizer`](tabula_synth::Synthesizer) over a timeline of MIDI
//!   messages in fixed-size blocks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabula_io::{OfflineRenderer, TimedMessage, WavSpec, load_wavetable, write_wav_stereo};
//! use tabula_synth::{MidiMessage, Synthesizer};
//!
//! let synth: Synthesizer = Synthesizer::new(48000.0);
//! synth.set_wavetable(load_wavetable("bank.wav", 2048)?);
//!
//! let timeline = [
//!     TimedMessage::new(0, MidiMessage::note_on(60, 0.8)),
//!     TimedMessage::new(24000, MidiMessage::note_off(60)),
//! ];
//! let mut renderer = OfflineRenderer::new(synth, 256);
//! let audio = renderer.render(&timeline, 48000);
//!
//! write_wav_stereo("out.wav", &audio, WavSpec::default())?;
//! ```

mod bank;
mod engine;
mod wav;

pub use bank::{DEFAULT_FRAME_LEN, load_wavetable, save_wavetable};
pub use engine::{DEFAULT_BLOCK_SIZE, OfflineRenderer, TimedMessage};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav, write_wav_stereo};

/// Error types for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The loaded samples do not form a valid wavetable.
    #[error("invalid wavetable: {0}")]
    Wavetable(#[from] tabula_synth::WavetableError),

    /// The file is readable but is not a usable wavetable bank.
    #[error("invalid wavetable bank: {reason}")]
    InvalidBank {
        /// What is wrong with the file.
        reason: String,
    },
}

/// Convenience result type for file I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
