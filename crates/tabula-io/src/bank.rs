//! Wavetable banks stored as WAV files.
//!
//! A bank is a mono WAV whose samples are the table's frames laid end to
//! end, each `frame_len` samples long. Multi-channel files are mixed down
//! before splitting. This is the layout most wavetable editors export.

use std::path::Path;

use tabula_synth::Wavetable;

use crate::wav::{WavSpec, read_wav, write_wav};
use crate::{Error, Result};

/// Frame length assumed when a bank does not say otherwise.
pub const DEFAULT_FRAME_LEN: usize = 2048;

/// Load a wavetable bank, splitting it into frames of `frame_len` samples.
///
/// # Errors
///
/// Fails if the file cannot be read, holds no samples, or its length is not
/// a whole number of frames.
pub fn load_wavetable<P: AsRef<Path>>(path: P, frame_len: usize) -> Result<Wavetable> {
    let path = path.as_ref();
    let (samples, spec) = read_wav(path)?;

    if frame_len == 0 {
        return Err(Error::InvalidBank {
            reason: "frame length must be at least 1".to_string(),
        });
    }
    if samples.is_empty() {
        return Err(Error::InvalidBank {
            reason: format!("{} contains no samples", path.display()),
        });
    }
    if samples.len() % frame_len != 0 {
        return Err(Error::InvalidBank {
            reason: format!(
                "{} has {} samples, not a multiple of the {}-sample frame length",
                path.display(),
                samples.len(),
                frame_len
            ),
        });
    }

    let table = Wavetable::from_samples(samples, frame_len)?;
    tracing::debug!(
        path = %path.display(),
        frames = table.num_frames(),
        frame_len,
        channels = spec.channels,
        "loaded wavetable bank"
    );
    Ok(table)
}

/// Write `table` as a 32-bit float mono bank.
pub fn save_wavetable<P: AsRef<Path>>(path: P, table: &Wavetable, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav(path.as_ref(), table.as_samples(), spec)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        frames = table.num_frames(),
        "saved wavetable bank"
    );
    Ok(())
}
