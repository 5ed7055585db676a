//! Owned containers for multichannel time-domain signals and
//! time-frequency tensors.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

/// A multichannel real-valued signal of shape `(channels, samples)`.
///
/// All channels share the same length. The channel count is fixed once the
/// signal is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct MultichannelSignal {
    channels: Vec<Vec<f64>>,
}

impl MultichannelSignal {
    /// Build a signal from per-channel sample vectors.
    ///
    /// Fails when `channels` is empty or the channel lengths differ.
    pub fn new(channels: Vec<Vec<f64>>) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(Error::shape("signal must have at least one channel"));
        };
        let len = first.len();
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != len) {
            return Err(Error::shape(format!(
                "channel {idx} has {} samples, expected {len}",
                ch.len()
            )));
        }
        Ok(Self { channels })
    }

    /// A silent signal of the given shape.
    pub fn zeros(num_channels: usize, len: usize) -> Result<Self> {
        Self::new(vec![vec![0.0; len]; num_channels])
    }

    /// Deinterleave `f32` frames (`[c0, c1, .., c0, c1, ..]`).
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::shape("signal must have at least one channel"));
        }
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(f64::from(s));
            }
        }
        Self::new(channels)
    }

    /// Interleave into `f32` frames.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.num_channels() * self.len());
        for i in 0..self.len() {
            for ch in &self.channels {
                out.push(ch[i] as f32);
            }
        }
        out
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// True when the channels hold no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Peak absolute amplitude across all channels.
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0, |acc: f64, &x| acc.max(x.abs()))
    }

    /// Multiply every sample by `gain` in place.
    pub fn scale(&mut self, gain: f64) {
        for x in self.channels.iter_mut().flatten() {
            *x *= gain;
        }
    }

    /// Divide by the peak absolute amplitude so the new peak is 1.
    ///
    /// Returns the original peak. Fails with [`Error::SilentInput`] when the
    /// signal is all zeros.
    pub fn normalize_peak(&mut self) -> Result<f64> {
        let peak = self.peak();
        if peak == 0.0 || !peak.is_finite() {
            return Err(Error::SilentInput);
        }
        self.scale(1.0 / peak);
        Ok(peak)
    }

    /// Shorten every channel to at most `len` samples.
    pub fn truncate(&mut self, len: usize) {
        for ch in &mut self.channels {
            ch.truncate(len);
        }
    }

    /// Keep only the first `count` channels.
    pub fn take_channels(mut self, count: usize) -> Result<Self> {
        if count == 0 || count > self.num_channels() {
            return Err(Error::shape(format!(
                "cannot take {count} channels from a {}-channel signal",
                self.num_channels()
            )));
        }
        self.channels.truncate(count);
        Ok(self)
    }
}

/// Complex time-frequency tensor indexed `(channel, frame, bin)`.
///
/// Storage is dense and row-major, so the bins of one frame are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct TfTensor {
    data: Vec<Complex64>,
    channels: usize,
    frames: usize,
    bins: usize,
}

impl TfTensor {
    /// A zero-filled tensor.
    pub fn zeros(channels: usize, frames: usize, bins: usize) -> Self {
        Self {
            data: vec![Complex64::new(0.0, 0.0); channels * frames * bins],
            channels,
            frames,
            bins,
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    /// Number of frequency bins.
    pub fn num_bins(&self) -> usize {
        self.bins
    }

    /// `(channels, frames, bins)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.frames, self.bins)
    }

    #[inline]
    fn offset(&self, channel: usize, frame: usize, bin: usize) -> usize {
        (channel * self.frames + frame) * self.bins + bin
    }

    /// Value at `(channel, frame, bin)`.
    #[inline]
    pub fn get(&self, channel: usize, frame: usize, bin: usize) -> Complex64 {
        self.data[self.offset(channel, frame, bin)]
    }

    /// Overwrite the value at `(channel, frame, bin)`.
    #[inline]
    pub fn set(&mut self, channel: usize, frame: usize, bin: usize, value: Complex64) {
        let idx = self.offset(channel, frame, bin);
        self.data[idx] = value;
    }

    /// Spectrum of one frame.
    pub fn frame(&self, channel: usize, frame: usize) -> &[Complex64] {
        let start = self.offset(channel, frame, 0);
        &self.data[start..start + self.bins]
    }

    /// Mutable spectrum of one frame.
    pub fn frame_mut(&mut self, channel: usize, frame: usize) -> &mut [Complex64] {
        let start = self.offset(channel, frame, 0);
        &mut self.data[start..start + self.bins]
    }

    /// Copy of the first `count` channels.
    pub fn select_channels(&self, count: usize) -> Result<Self> {
        if count > self.channels {
            return Err(Error::shape(format!(
                "cannot select {count} channels from a {}-channel tensor",
                self.channels
            )));
        }
        let len = count * self.frames * self.bins;
        Ok(Self {
            data: self.data[..len].to_vec(),
            channels: count,
            frames: self.frames,
            bins: self.bins,
        })
    }

    /// One bin across all frames and channels, as a `frames x channels` matrix.
    pub fn bin_matrix(&self, bin: usize) -> DMatrix<Complex64> {
        DMatrix::from_fn(self.frames, self.channels, |f, c| self.get(c, f, bin))
    }

    /// Write a `frames x k` matrix into channels `0..k` of one bin.
    pub fn set_bin_matrix(&mut self, bin: usize, values: &DMatrix<Complex64>) -> Result<()> {
        if values.nrows() != self.frames || values.ncols() > self.channels {
            return Err(Error::shape(format!(
                "bin matrix is {}x{}, tensor expects {}x(<= {})",
                values.nrows(),
                values.ncols(),
                self.frames,
                self.channels
            )));
        }
        for c in 0..values.ncols() {
            for f in 0..self.frames {
                self.set(c, f, bin, values[(f, c)]);
            }
        }
        Ok(())
    }

    /// Raw row-major data.
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }
}
