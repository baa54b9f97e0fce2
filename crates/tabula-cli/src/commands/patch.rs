//! Patch management commands.
//!
//! Provides commands to list factory patches, write new patch files, and
//! show or validate existing ones.

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tabula_config::{WavetableSource, factory_patches, get_factory_patch};

use super::common::load_patch;

#[derive(Args)]
pub struct PatchArgs {
    #[command(subcommand)]
    command: PatchCommand,
}

#[derive(Subcommand)]
enum PatchCommand {
    /// List factory patches
    List,

    /// Write a new patch file
    Init {
        /// Output TOML file
        output: PathBuf,

        /// Factory patch to start from
        #[arg(long, default_value = "init")]
        from: String,

        /// Name for the new patch (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },

    /// Show the settings of a patch
    Show {
        /// Patch file or factory patch name
        patch: String,
    },

    /// Check patches for out-of-range values
    Validate {
        /// Patch files or factory patch names
        #[arg(required = true)]
        patches: Vec<String>,
    },
}

pub fn run(args: PatchArgs) -> anyhow::Result<()> {
    match args.command {
        PatchCommand::List => list_patches(),
        PatchCommand::Init {
            output,
            from,
            name,
            force,
        } => init_patch(&output, &from, name, force),
        PatchCommand::Show { patch } => show_patch(&patch),
        PatchCommand::Validate { patches } => validate_patches(&patches),
    }
}

fn list_patches() -> anyhow::Result<()> {
    println!("Factory Patches:");
    println!("================");
    for patch in factory_patches() {
        let desc = patch.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", patch.name, desc);
    }
    Ok(())
}

fn init_patch(output: &Path, from: &str, name: Option<String>, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            output.display()
        );
    }

    let mut patch = get_factory_patch(from)
        .ok_or_else(|| anyhow::anyhow!("Factory patch '{}' not found.", from))?;

    patch.name = name.unwrap_or_else(|| {
        output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    });
    patch.save(output)?;

    println!("Wrote patch '{}' to {}", patch.name, output.display());
    Ok(())
}

fn show_patch(name: &str) -> anyhow::Result<()> {
    let (patch, _) = load_patch(name)?;

    println!("Patch: {}", patch.name);
    println!("{}", "=".repeat(7 + patch.name.len()));
    println!();

    if let Some(desc) = &patch.description {
        println!("Description: {desc}");
        println!();
    }

    match &patch.wavetable {
        WavetableSource::Generator {
            kind,
            resolution,
            frames,
        } => println!("Wavetable:   {kind} generator, {resolution} samples, {frames} frame(s)"),
        WavetableSource::File { path, frame_len } => {
            println!("Wavetable:   {} ({frame_len}-sample frames)", path.display());
        }
    }

    let osc = &patch.oscillator;
    println!(
        "Oscillator:  volume {:.2}, pan {:+.2}, frame {:.2}",
        osc.volume, osc.pan, osc.frame_position
    );
    let unison = &patch.unison;
    println!(
        "Unison:      {} voice(s), mix {:.2}, spread {:.2}",
        unison.voices, unison.mix, unison.spread
    );
    let env = &patch.envelope;
    println!(
        "Envelope:    A {} ms, D {} ms, S {:.2}, R {} ms",
        env.attack_ms, env.decay_ms, env.sustain, env.release_ms
    );
    println!(
        "Pitch bend:  +{} / -{} semitones",
        patch.pitch_bend.up, patch.pitch_bend.down
    );
    println!(
        "Stealing:    {}",
        if patch.voice_stealing { "on" } else { "off" }
    );

    Ok(())
}

fn validate_patches(names: &[String]) -> anyhow::Result<()> {
    let mut failed = 0;
    for name in names {
        let result = load_patch(name)
            .and_then(|(patch, _)| patch.validate().map_err(anyhow::Error::from));
        match result {
            Ok(()) => println!("{name}: ok"),
            Err(e) => {
                failed += 1;
                println!("{name}: {e}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} patch(es) failed validation", failed, names.len());
    }
    Ok(())
}
