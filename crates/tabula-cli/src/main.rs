//! Tabula CLI - command-line interface for the tabula wavetable synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Tabula wavetable synthesizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a score through a patch to a WAV file
    Render(commands::render::RenderArgs),

    /// Create, inspect and validate patches
    Patch(commands::patch::PatchArgs),

    /// Export and inspect wavetable banks
    Table(commands::table::TableArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Patch(args) => commands::patch::run(args),
        Commands::Table(args) => commands::table::run(args),
    }
}
