//! Log-magnitude spectrogram export.

use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use wpe_core::stft::DEFAULT_FRAME_SIZE;
use wpe_core::{LogSpectrogram, log_spectrum};
use wpe_io::read_wav;

#[derive(Args)]
pub struct SpectrumArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Channel to analyse (0-based)
    #[arg(long, default_value_t = 0)]
    channel: usize,

    /// STFT frame size in samples
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE)]
    frame_size: usize,

    /// Export phase (radians) instead of log magnitude
    #[arg(long)]
    phase: bool,

    /// Output CSV file
    #[arg(short, long)]
    output: PathBuf,
}

pub fn run(args: SpectrumArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let (signal, spec) = read_wav(&args.input)?;
    if args.channel >= signal.num_channels() {
        anyhow::bail!(
            "channel {} out of range ({} has {} channel(s))",
            args.channel,
            args.input.display(),
            signal.num_channels()
        );
    }

    let spectrogram = log_spectrum(signal.channel(args.channel), args.frame_size)?;
    let peak = spectrogram
        .log_magnitude
        .iter()
        .flatten()
        .fold(0.0f64, |a, &b| a.max(b));
    println!(
        "  {} frames x {} bins, dynamic range {:.1} decades",
        spectrogram.num_frames(),
        spectrogram.num_bins(),
        peak
    );

    export_csv(&spectrogram, spec.sample_rate, args.phase, &args.output)?;
    println!("Wrote {}", args.output.display());

    Ok(())
}

/// Write time on rows and frequency bins on columns.
///
/// The first row holds bin frequencies in Hz, the first column frame start
/// times in seconds.
fn export_csv(
    spectrogram: &LogSpectrogram,
    sample_rate: u32,
    phase: bool,
    path: &Path,
) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let sr = f64::from(sample_rate);

    write!(file, "time_s")?;
    for bin in 0..spectrogram.num_bins() {
        let freq = bin as f64 * sr / spectrogram.frame_size as f64;
        write!(file, ",{freq:.2}")?;
    }
    writeln!(file)?;

    let rows = if phase {
        &spectrogram.phase
    } else {
        &spectrogram.log_magnitude
    };
    for (frame, values) in rows.iter().enumerate() {
        let time = (frame * spectrogram.frame_shift) as f64 / sr;
        write!(file, "{time:.6}")?;
        for value in values {
            write!(file, ",{value:.6}")?;
        }
        writeln!(file)?;
    }

    file.flush()
}
