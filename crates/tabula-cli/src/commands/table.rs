//! Wavetable bank commands.

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tabula_core::linear_to_db;
use tabula_io::{DEFAULT_FRAME_LEN, load_wavetable, read_wav_info, save_wavetable};
use tabula_synth::{DEFAULT_RESOLUTION, Wavetable, WavetableKind};

#[derive(Args)]
pub struct TableArgs {
    #[command(subcommand)]
    command: TableCommand,
}

#[derive(Subcommand)]
enum TableCommand {
    /// Write a built-in generator to a WAV bank
    Export {
        /// Generator: sine, saw, square, multisine or morph
        kind: WavetableKind,

        /// Output WAV file
        output: PathBuf,

        /// Samples per frame
        #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: usize,

        /// Frame count (morph only)
        #[arg(long, default_value = "16")]
        frames: usize,

        /// Sample rate stored in the WAV header
        #[arg(long, default_value = "48000")]
        sample_rate: u32,
    },

    /// Describe a WAV bank
    Info {
        /// WAV bank file
        input: PathBuf,

        /// Samples per frame
        #[arg(long, default_value_t = DEFAULT_FRAME_LEN)]
        frame_len: usize,
    },
}

pub fn run(args: TableArgs) -> anyhow::Result<()> {
    match args.command {
        TableCommand::Export {
            kind,
            output,
            resolution,
            frames,
            sample_rate,
        } => export(kind, &output, resolution, frames, sample_rate),
        TableCommand::Info { input, frame_len } => info(&input, frame_len),
    }
}

fn export(
    kind: WavetableKind,
    output: &Path,
    resolution: usize,
    frames: usize,
    sample_rate: u32,
) -> anyhow::Result<()> {
    let table = Wavetable::generate(kind, resolution, frames);
    save_wavetable(output, &table, sample_rate)?;
    println!(
        "Wrote {} table ({} frame(s) x {} samples) to {}",
        kind,
        table.num_frames(),
        table.frame_len(),
        output.display()
    );
    Ok(())
}

fn info(input: &Path, frame_len: usize) -> anyhow::Result<()> {
    let wav = read_wav_info(input)?;
    println!("File:        {}", input.display());
    println!("Channels:    {}", wav.channels);
    println!("Sample rate: {} Hz", wav.sample_rate);
    println!("Format:      {}-bit {:?}", wav.bits_per_sample, wav.format);
    println!("Samples:     {}", wav.num_frames);

    let table = load_wavetable(input, frame_len)?;
    println!(
        "Frames:      {} x {} samples",
        table.num_frames(),
        table.frame_len()
    );

    for (i, frame) in table.frames().enumerate() {
        let peak = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        let mean = frame.iter().sum::<f32>() / frame.len() as f32;
        println!(
            "  {:3}: peak {:6.1} dB, dc {:+.3}",
            i,
            linear_to_db(peak),
            mean
        );
    }
    Ok(())
}
