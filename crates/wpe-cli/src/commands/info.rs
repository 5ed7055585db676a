//! Display WAV file metadata and per-microphone levels.

use clap::Args;
use wpe_core::StftConfig;
use wpe_core::config::{DEFAULT_FRAME_SIZE, DEFAULT_OVERLAP};
use wpe_io::{WavFormat, read_wav, read_wav_info};

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,

    /// Also load the samples and print peak/RMS level per channel
    #[arg(long)]
    pub levels: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;

    let format_str = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", format_str, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    let stft = StftConfig::new(DEFAULT_FRAME_SIZE, DEFAULT_OVERLAP);
    match stft.num_frames(info.num_frames as usize) {
        Some(frames) => println!(
            "STFT:        {} frames x {} bins ({}-sample frames, hop {})",
            frames,
            stft.num_bins(),
            stft.frame_size,
            stft.frame_shift()
        ),
        None => println!(
            "STFT:        shorter than one {}-sample frame",
            stft.frame_size
        ),
    }

    let file_size = std::fs::metadata(&args.file)?.len();
    println!("File Size:   {}", format_bytes(file_size));

    if args.levels {
        let (signal, _) = read_wav(&args.file)?;
        println!("\nLevels:");
        for (c, samples) in signal.channels().iter().enumerate() {
            let peak = samples.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
            let rms = if samples.is_empty() {
                0.0
            } else {
                (samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
            };
            println!(
                "  ch{c}: Peak {:6.1} dB, RMS {:6.1} dB",
                linear_to_db(peak),
                linear_to_db(rms)
            );
        }
    }

    Ok(())
}

fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_linear_to_db() {
        assert_eq!(linear_to_db(0.0), -120.0);
        assert!((linear_to_db(1.0)).abs() < 1e-12);
        assert!((linear_to_db(0.1) + 20.0).abs() < 1e-9);
    }
}
