//! Multichannel STFT framer.
//!
//! Converts a [`MultichannelSignal`] into a [`TfTensor`] of shape
//! `(channels, frames, frame_size / 2 + 1)` and back again by overlap-add.
//!
//! # Framing
//!
//! ```text
//! frame_shift = frame_size - floor(overlap * frame_size)
//! frames      = ceil((samples - frame_size) / frame_shift) + 1
//! ```
//!
//! The signal is zero-padded on the right by `frame_shift` samples so the
//! last frame is always fully populated. Synthesis overlap-adds the inverse
//! transforms without dividing by the window energy, so the round trip is
//! unity-gain only when the window sums to one under the chosen shift (Hann
//! at 50% overlap). The reconstruction is up to one `frame_shift` longer than
//! the input.

use crate::error::{Error, Result};
use crate::fft::{RealFft, Window};
use crate::signal::{MultichannelSignal, TfTensor};
use rustfft::num_complex::Complex64;

/// Default frame size for standalone transforms.
pub const DEFAULT_FRAME_SIZE: usize = 512;

/// Default overlap for standalone transforms.
pub const DEFAULT_OVERLAP: f64 = 0.75;

/// Frame size, overlap and window of an STFT.
#[derive(Debug, Clone, PartialEq)]
pub struct StftConfig {
    /// Samples per frame.
    pub frame_size: usize,
    /// Fraction of a frame shared with the next one, in `[0, 1)`.
    pub overlap: f64,
    /// Analysis window.
    pub window: Window,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            overlap: DEFAULT_OVERLAP,
            window: Window::Hann,
        }
    }
}

impl StftConfig {
    /// Config with the given frame size and overlap and a Hann window.
    pub fn new(frame_size: usize, overlap: f64) -> Self {
        Self {
            frame_size,
            overlap,
            window: Window::Hann,
        }
    }

    /// Replace the analysis window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Check frame size, overlap and window length.
    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 {
            return Err(Error::config("frame_size must be positive"));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(Error::config(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if let Window::Custom(coeffs) = &self.window
            && coeffs.len() != self.frame_size
        {
            return Err(Error::shape(format!(
                "window has {} coefficients, frame_size is {}",
                coeffs.len(),
                self.frame_size
            )));
        }
        Ok(())
    }

    /// Sample offset between consecutive frames.
    pub fn frame_shift(&self) -> usize {
        frame_shift(self.frame_size, self.overlap)
    }

    /// Number of non-redundant frequency bins.
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Number of frames produced for a signal of `samples` samples.
    ///
    /// Returns `None` when the signal is shorter than one frame.
    pub fn num_frames(&self, samples: usize) -> Option<usize> {
        if samples < self.frame_size {
            return None;
        }
        Some((samples - self.frame_size).div_ceil(self.frame_shift()) + 1)
    }

    /// Length of the overlap-add output for `frames` frames.
    pub fn synthesis_len(&self, frames: usize) -> usize {
        match frames {
            0 => 0,
            n => (n - 1) * self.frame_shift() + self.frame_size,
        }
    }
}

/// `frame_size - floor(overlap * frame_size)`.
pub fn frame_shift(frame_size: usize, overlap: f64) -> usize {
    frame_size - (overlap * frame_size as f64).floor() as usize
}

/// Analysis/synthesis transform pair with a cached FFT plan and window.
pub struct Stft {
    config: StftConfig,
    fft: RealFft,
    window_coeffs: Vec<f64>,
}

impl Stft {
    /// Validate `config` and plan the transforms.
    pub fn new(config: StftConfig) -> Result<Self> {
        config.validate()?;
        let fft = RealFft::new(config.frame_size);
        let window_coeffs = config.window.coefficients(config.frame_size);

        Ok(Self {
            config,
            fft,
            window_coeffs,
        })
    }

    /// The framing configuration.
    pub fn config(&self) -> &StftConfig {
        &self.config
    }

    /// Analysis transform: time domain to `(channels, frames, bins)`.
    pub fn analyze(&self, signal: &MultichannelSignal) -> Result<TfTensor> {
        let frame_size = self.config.frame_size;
        let shift = self.config.frame_shift();
        let frames = self.config.num_frames(signal.len()).ok_or_else(|| {
            Error::shape(format!(
                "signal has {} samples, fewer than one frame of {frame_size}",
                signal.len()
            ))
        })?;
        let bins = self.config.num_bins();

        let mut tensor = TfTensor::zeros(signal.num_channels(), frames, bins);
        let mut frame = vec![0.0; frame_size];
        let mut scratch = vec![Complex64::new(0.0, 0.0); frame_size];

        for (c, samples) in signal.channels().iter().enumerate() {
            for f in 0..frames {
                let start = f * shift;
                // Samples past the end read as the right-hand zero padding.
                let end = (start + frame_size).min(samples.len());
                frame.fill(0.0);
                frame[..end - start].copy_from_slice(&samples[start..end]);

                for (sample, &coeff) in frame.iter_mut().zip(self.window_coeffs.iter()) {
                    *sample *= coeff;
                }

                self.fft
                    .forward_into(&frame, &mut scratch, tensor.frame_mut(c, f));
            }
        }

        Ok(tensor)
    }

    /// Synthesis transform: `(channels, frames, bins)` back to time domain.
    pub fn synthesize(&self, tensor: &TfTensor) -> Result<MultichannelSignal> {
        let frame_size = self.config.frame_size;
        if tensor.num_bins() != self.config.num_bins() {
            return Err(Error::shape(format!(
                "tensor has {} bins, frame_size {frame_size} needs {}",
                tensor.num_bins(),
                self.config.num_bins()
            )));
        }

        let shift = self.config.frame_shift();
        let len = self.config.synthesis_len(tensor.num_frames());
        let mut frame = vec![0.0; frame_size];
        let mut scratch = vec![Complex64::new(0.0, 0.0); frame_size];

        let mut channels = Vec::with_capacity(tensor.num_channels());
        for c in 0..tensor.num_channels() {
            let mut output = vec![0.0; len];
            for f in 0..tensor.num_frames() {
                self.fft
                    .inverse_into(tensor.frame(c, f), &mut scratch, &mut frame);
                let start = f * shift;
                for (dst, &x) in output[start..start + frame_size].iter_mut().zip(&frame) {
                    *dst += x;
                }
            }
            channels.push(output);
        }

        MultichannelSignal::new(channels)
    }
}

/// Multichannel short-time Fourier transform.
///
/// `window` defaults to a symmetric Hann window of `frame_size` samples.
pub fn analysis_transform(
    signal: &MultichannelSignal,
    frame_size: usize,
    overlap: f64,
    window: Option<Window>,
) -> Result<TfTensor> {
    let config = StftConfig::new(frame_size, overlap).with_window(window.unwrap_or_default());
    Stft::new(config)?.analyze(signal)
}

/// Multichannel inverse short-time Fourier transform.
///
/// `frame_size` defaults to `2 * (bins - 1)`.
pub fn synthesis_transform(
    tensor: &TfTensor,
    frame_size: Option<usize>,
    overlap: f64,
) -> Result<MultichannelSignal> {
    let frame_size = match frame_size {
        Some(size) => size,
        None if tensor.num_bins() == 0 => {
            return Err(Error::shape("tensor has no frequency bins"));
        }
        None => 2 * (tensor.num_bins() - 1),
    };
    // The window only matters for analysis.
    let config = StftConfig::new(frame_size, overlap).with_window(Window::Rectangular);
    Stft::new(config)?.synthesize(tensor)
}

/// Log-magnitude spectrogram of one channel.
#[derive(Debug, Clone)]
pub struct LogSpectrogram {
    /// `log10(max(|X|, 1e-8) / min)`, `[frame][bin]`
    pub log_magnitude: Vec<Vec<f64>>,
    /// Phase in radians, `[frame][bin]`
    pub phase: Vec<Vec<f64>>,
    /// Frame size used
    pub frame_size: usize,
    /// Hop between frames
    pub frame_shift: usize,
}

impl LogSpectrogram {
    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.log_magnitude.len()
    }

    /// Number of frequency bins.
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }
}

/// Log-magnitude spectrogram relative to the quietest bin.
///
/// Magnitudes are floored at `1e-8` before the log, so the minimum maps to 0.
pub fn log_spectrum(samples: &[f64], frame_size: usize) -> Result<LogSpectrogram> {
    let config = StftConfig::new(frame_size, DEFAULT_OVERLAP);
    let frame_shift = config.frame_shift();
    let signal = MultichannelSignal::new(vec![samples.to_vec()])?;
    let tensor = Stft::new(config)?.analyze(&signal)?;

    let magnitude: Vec<Vec<f64>> = (0..tensor.num_frames())
        .map(|f| tensor.frame(0, f).iter().map(|c| c.norm().max(1e-8)).collect())
        .collect();
    let min = magnitude.iter().flatten().fold(f64::INFINITY, |a, &b| a.min(b));

    let log_magnitude = magnitude
        .iter()
        .map(|frame| frame.iter().map(|&m| (m / min).log10()).collect())
        .collect();
    let phase = (0..tensor.num_frames())
        .map(|f| tensor.frame(0, f).iter().map(|c| c.arg()).collect())
        .collect();

    Ok(LogSpectrogram {
        log_magnitude,
        phase,
        frame_size,
        frame_shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / 16000.0).sin())
            .collect()
    }

    #[test]
    fn test_frame_shift() {
        assert_eq!(frame_shift(512, 0.75), 128);
        assert_eq!(frame_shift(512, 0.5), 256);
        assert_eq!(frame_shift(512, 0.0), 512);
        // floor(0.3 * 10) = 3
        assert_eq!(frame_shift(10, 0.3), 7);
    }

    #[test]
    fn test_shape_contract() {
        let signal = MultichannelSignal::new(vec![sine(440.0, 2000); 3]).unwrap();
        let tensor = analysis_transform(&signal, 512, 0.75, None).unwrap();
        assert_eq!(tensor.shape(), (3, 13, 257));
    }

    #[test]
    fn test_exact_fit_frame_count() {
        let config = StftConfig::new(512, 0.5);
        assert_eq!(config.num_frames(512), Some(1));
        assert_eq!(config.num_frames(768), Some(2));
        assert_eq!(config.num_frames(769), Some(3));
        assert_eq!(config.num_frames(511), None);
    }

    #[test]
    fn test_too_short_signal_fails() {
        let signal = MultichannelSignal::new(vec![vec![0.0; 100]]).unwrap();
        let err = analysis_transform(&signal, 512, 0.75, None).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_invalid_config_fails() {
        let signal = MultichannelSignal::new(vec![vec![0.0; 1024]]).unwrap();
        assert!(matches!(
            analysis_transform(&signal, 0, 0.5, None),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            analysis_transform(&signal, 256, 1.0, None),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            analysis_transform(&signal, 256, 0.5, Some(Window::Custom(vec![1.0; 255]))),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_synthesis_length() {
        let signal = MultichannelSignal::new(vec![sine(300.0, 2000); 2]).unwrap();
        let tensor = analysis_transform(&signal, 512, 0.75, None).unwrap();
        let out = synthesis_transform(&tensor, None, 0.75).unwrap();
        assert_eq!(out.num_channels(), 2);
        assert_eq!(out.len(), 12 * 128 + 512);
        assert!(out.len() >= signal.len());
        assert!(out.len() - signal.len() < 128);
    }

    #[test]
    fn test_synthesis_rejects_mismatched_frame_size() {
        let tensor = TfTensor::zeros(1, 4, 257);
        assert!(matches!(
            synthesis_transform(&tensor, Some(256), 0.5),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_periodic_hann_half_overlap_is_identity() {
        let len = 4096;
        let signal = MultichannelSignal::new(vec![sine(1000.0, len), sine(250.0, len)]).unwrap();
        let tensor =
            analysis_transform(&signal, 256, 0.5, Some(Window::PeriodicHann)).unwrap();
        let out = synthesis_transform(&tensor, Some(256), 0.5).unwrap();

        // The first half-frame only sees one window slope.
        for c in 0..2 {
            for i in 256..len - 256 {
                let (a, b) = (signal.channel(c)[i], out.channel(c)[i]);
                assert!((a - b).abs() < 1e-9, "ch {c} sample {i}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_rectangular_no_overlap_is_identity() {
        let len = 1000;
        let signal = MultichannelSignal::new(vec![sine(700.0, len)]).unwrap();
        let tensor = analysis_transform(&signal, 100, 0.0, Some(Window::Rectangular)).unwrap();
        let out = synthesis_transform(&tensor, None, 0.0).unwrap();
        for i in 0..len {
            assert!((signal.channel(0)[i] - out.channel(0)[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_log_spectrum_minimum_is_zero() {
        let spec = log_spectrum(&sine(500.0, 4000), 256).unwrap();
        assert_eq!(spec.num_bins(), 129);
        assert_eq!(spec.frame_shift, 64);
        assert_eq!(spec.num_frames(), spec.phase.len());

        let min = spec
            .log_magnitude
            .iter()
            .flatten()
            .fold(f64::INFINITY, |a, &b| a.min(b));
        assert!(min.abs() < 1e-12);

        // 500 Hz at 16 kHz with 256-point frames lands on bin 8.
        let frame = &spec.log_magnitude[spec.num_frames() / 2];
        let peak = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8);
    }
}
