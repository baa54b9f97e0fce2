//! Offline score rendering command.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tabula_config::Score;
use tabula_core::linear_to_db;
use tabula_io::{DEFAULT_BLOCK_SIZE, OfflineRenderer, WavSpec, write_wav_stereo};
use tabula_synth::{MAX_SAMPLE_RATE, Synthesizer};

use super::common::load_patch;

#[derive(Args)]
pub struct RenderArgs {
    /// Score file (TOML)
    #[arg(value_name = "SCORE")]
    score: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Patch file or factory patch name
    #[arg(short, long, default_value = "init")]
    patch: String,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Rendering block size
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Seconds rendered after the last event, for release tails
    #[arg(long, default_value = "1.0")]
    tail: f64,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth {} (expected 16, 24, or 32)", args.bit_depth);
    }
    if args.sample_rate == 0 || args.sample_rate as f32 > MAX_SAMPLE_RATE {
        anyhow::bail!(
            "Sample rate {} out of range (1 to {} Hz)",
            args.sample_rate,
            MAX_SAMPLE_RATE
        );
    }
    let sample_rate = args.sample_rate as f32;

    println!("Reading {}...", args.score.display());
    let score = Score::load(&args.score)?;
    score.validate()?;

    let (patch, base_dir) = load_patch(&args.patch)?;
    patch.validate()?;
    println!("Loading patch: {}", patch.name);

    let synth: Synthesizer = Synthesizer::with_params(&patch.to_params(sample_rate));
    let table = patch.build_wavetable(&base_dir)?;
    println!(
        "  wavetable: {} frame(s) x {} samples",
        table.num_frames(),
        table.frame_len()
    );
    synth.set_wavetable(table);

    let timeline = score.to_timeline(sample_rate);
    let num_samples = score.num_samples(sample_rate, args.tail);
    println!(
        "Rendering {} events, {:.2}s at {} Hz...",
        timeline.len(),
        num_samples as f64 / f64::from(args.sample_rate),
        args.sample_rate
    );

    let pb = ProgressBar::new(num_samples as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut renderer = OfflineRenderer::new(synth, args.block_size);
    let audio = renderer.render_with_progress(&timeline, num_samples, |done, _| {
        pb.set_position(done as u64);
    });
    pb.finish_with_message("done");

    let peak = audio.peak();
    println!("\nStats:");
    println!("  Peak {:.1} dB", linear_to_db(peak));
    if peak > 1.0 {
        tracing::warn!(peak, "output clips; lower the patch volume");
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &audio, spec)?;
    println!("Done!");

    Ok(())
}
