//! WPE CLI - Command-line interface for multichannel speech dereverberation.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wpe")]
#[command(author, version, about = "Multichannel WPE speech dereverberation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dereverberate a multichannel recording
    Process(commands::process::ProcessArgs),

    /// Show WAV file information
    Info(commands::info::InfoArgs),

    /// Export a log-magnitude spectrogram as CSV
    Spectrum(commands::spectrum::SpectrumArgs),

    /// Create, show and list dereverberation profiles
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Spectrum(args) => commands::spectrum::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
