//! File-based dereverberation command.

use super::common::{ProfileSource, load_profile};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use wpe_config::Profile;
use wpe_core::Dereverberator;
use wpe_io::{WavSpec, read_mics, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (one channel per microphone)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Number of microphone channels to read
    #[arg(short = 'm', long = "mic-num", alias = "mic_num")]
    mic_num: Option<usize>,

    /// Number of dereverberated output channels
    #[arg(short = 'n', long = "out-num", alias = "out_num")]
    out_num: Option<usize>,

    /// Prediction order (taps per channel)
    #[arg(short = 'p', long)]
    order: Option<usize>,

    /// Prediction delay in frames, at least 1 (advanced)
    #[arg(long)]
    delay: Option<usize>,

    /// Variance re-estimation passes per bin
    #[arg(long)]
    iterations: Option<usize>,

    /// STFT frame size in samples
    #[arg(long)]
    frame_size: Option<usize>,

    /// STFT overlap fraction in [0, 1)
    #[arg(long)]
    overlap: Option<f64>,

    /// Analysis window (hann, periodic-hann, hamming, blackman, rectangular)
    #[arg(long)]
    window: Option<String>,

    /// Floor on the residual power (off by default)
    #[arg(long)]
    variance_floor: Option<f64>,

    /// Profile name or path (TOML); defaults to the user profile if present
    #[arg(short, long)]
    config: Option<String>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Keep the full overlap-add length instead of trimming to the input length
    #[arg(long)]
    no_trim: bool,
}

impl ProcessArgs {
    /// Apply command-line overrides on top of a profile.
    fn apply(&self, profile: &mut Profile) {
        if let Some(v) = self.mic_num {
            profile.mic_num = v;
        }
        if let Some(v) = self.out_num {
            profile.out_num = v;
        }
        if let Some(v) = self.order {
            profile.order = v;
        }
        if let Some(v) = self.delay {
            profile.delay = v;
        }
        if let Some(v) = self.iterations {
            profile.iterations = v;
        }
        if let Some(v) = self.frame_size {
            profile.frame_size = v;
        }
        if let Some(v) = self.overlap {
            profile.overlap = v;
        }
        if let Some(v) = &self.window {
            profile.window.clone_from(v);
        }
        if self.variance_floor.is_some() {
            profile.variance_floor = self.variance_floor;
        }
        if let Some(v) = self.bit_depth {
            profile.bit_depth = v;
        }
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let (mut profile, source) = load_profile(args.config.as_deref())?;
    if let ProfileSource::File(path) = &source {
        println!("Using profile '{}' ({})", profile.name, path.display());
    }
    args.apply(&mut profile);
    let config = profile.to_wpe_config()?;

    // Read input file
    println!("Reading {}...", args.input.display());
    let (mics, spec) = read_mics(&args.input, config.mic_count)?;
    println!(
        "  {} samples, {} Hz, {:.2}s",
        mics.len(),
        spec.sample_rate,
        mics.len() as f64 / f64::from(spec.sample_rate)
    );

    println!("\nConfiguration:");
    println!("  Input channels:   {}", config.mic_count);
    println!("  Output channels:  {}", config.output_count);
    println!("  Prediction order: {}", config.order);
    println!("  Delay:            {} frames", config.delay);
    println!("  Iterations:       {}", config.iterations);
    println!(
        "  Frame size:       {} (overlap {})",
        config.frame_size, config.overlap
    );

    let wpe = Dereverberator::new(config)?;
    let bins = wpe.stft().config().num_bins();

    println!("\nDereverberating {bins} frequency bins...");
    let pb = ProgressBar::new(bins as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} bins ({eta})")?
            .progress_chars("##-"),
    );

    let start = Instant::now();
    let mut output = wpe.run_with_progress(&mics, &|_| pb.inc(1))?;
    let elapsed = start.elapsed();
    pb.finish_with_message("done");

    println!("Total processing time: {:.2}s", elapsed.as_secs_f64());
    tracing::debug!(
        samples = mics.len(),
        bins,
        elapsed_ms = elapsed.as_millis() as u64,
        "dereverberation finished"
    );

    if !args.no_trim {
        output.truncate(mics.len());
    }

    // Write output file
    let out_spec = WavSpec {
        channels: output.num_channels() as u16,
        sample_rate: spec.sample_rate,
        bits_per_sample: profile.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, out_spec)?;
    println!(
        "  {} channel(s), {} samples, {}-bit",
        output.num_channels(),
        output.len(),
        profile.bit_depth
    );
    println!("Done!");

    Ok(())
}
