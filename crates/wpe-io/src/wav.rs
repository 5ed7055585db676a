//! Multichannel WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Read;
use std::path::Path;
use wpe_core::MultichannelSignal;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels);
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 16000, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample: 16 or 24 for PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

fn decode_interleaved<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Read every channel of a WAV file.
///
/// Integer PCM is scaled to `[-1, 1)`.
///
/// # Example
/// ```ignore
/// let (signal, spec) = read_wav("input.wav")?;
/// println!("{} channels at {} Hz", signal.num_channels(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(MultichannelSignal, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let interleaved = decode_interleaved(reader)?;
    let signal = MultichannelSignal::from_interleaved(&interleaved, usize::from(spec.channels))?;
    Ok((signal, spec))
}

/// Read the first `mic_count` channels of a microphone-array recording.
///
/// Surplus channels are dropped with a warning. Fails with
/// [`Error::NotEnoughChannels`] when the file has fewer than `mic_count`.
/// The returned spec describes the selected channels.
pub fn read_mics<P: AsRef<Path>>(
    path: P,
    mic_count: usize,
) -> Result<(MultichannelSignal, WavSpec)> {
    let path = path.as_ref();
    let (signal, mut spec) = read_wav(path)?;
    let found = signal.num_channels();

    if found < mic_count {
        return Err(Error::NotEnoughChannels {
            path: path.display().to_string(),
            found,
            required: mic_count,
        });
    }
    if found > mic_count {
        tracing::warn!(
            path = %path.display(),
            found,
            used = mic_count,
            "file has more channels than microphones; using the first {mic_count}"
        );
    }

    let signal = signal.take_channels(mic_count)?;
    spec.channels = signal.num_channels() as u16;
    Ok((signal, spec))
}

/// Write a multichannel signal to a WAV file.
///
/// The channel count comes from `signal`; `spec` supplies the sample rate and
/// bit depth. Integer output is clipped to full scale.
///
/// # Example
/// ```ignore
/// let spec = WavSpec { sample_rate: 16000, bits_per_sample: 16, ..Default::default() };
/// write_wav("output.wav", &signal, spec)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    signal: &MultichannelSignal,
    spec: WavSpec,
) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedBitDepth(spec.bits_per_sample));
    }

    let spec = WavSpec {
        channels: signal.num_channels() as u16,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    let samples = signal.to_interleaved();

    if spec.bits_per_sample == 32 {
        for &sample in &samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for &sample in &samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}
