//! Dereverberation configuration with documented defaults.

use crate::error::{Error, Result};
use crate::fft::Window;
use crate::ndlp::{DEFAULT_DELAY, DEFAULT_ITERATIONS, DEFAULT_ORDER};
use crate::stft::StftConfig;

/// Default number of microphone channels.
pub const DEFAULT_MIC_COUNT: usize = 3;

/// Default number of dereverberated output channels.
pub const DEFAULT_OUTPUT_COUNT: usize = 2;

/// Default frame size of the dereverberation STFT.
pub const DEFAULT_FRAME_SIZE: usize = 512;

/// Default overlap of the dereverberation STFT.
pub const DEFAULT_OVERLAP: f64 = 0.5;

/// Configuration of a WPE dereverberation run.
///
/// Checked once by [`WpeConfig::validate`], which
/// [`Dereverberator::new`](crate::Dereverberator::new) calls before anything
/// else.
///
/// # Example
///
/// ```rust
/// use wpe_core::WpeConfig;
///
/// let config = WpeConfig::new(4, 1).with_order(10).with_iterations(3);
/// assert!(config.validate().is_ok());
/// assert!(WpeConfig::new(2, 3).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WpeConfig {
    /// Number of input channels.
    pub mic_count: usize,
    /// Number of output channels, taken from the leading inputs.
    pub output_count: usize,
    /// Taps per input channel.
    pub order: usize,
    /// Frames skipped before prediction starts.
    pub delay: usize,
    /// Variance re-estimation passes per bin.
    pub iterations: usize,
    /// STFT frame size in samples.
    pub frame_size: usize,
    /// STFT overlap fraction in `[0, 1)`.
    pub overlap: f64,
    /// STFT analysis window.
    pub window: Window,
    /// Optional lower bound on residual power before taking reciprocals.
    pub variance_floor: Option<f64>,
}

impl Default for WpeConfig {
    fn default() -> Self {
        Self {
            mic_count: DEFAULT_MIC_COUNT,
            output_count: DEFAULT_OUTPUT_COUNT,
            order: DEFAULT_ORDER,
            delay: DEFAULT_DELAY,
            iterations: DEFAULT_ITERATIONS,
            frame_size: DEFAULT_FRAME_SIZE,
            overlap: DEFAULT_OVERLAP,
            window: Window::Hann,
            variance_floor: None,
        }
    }
}

impl WpeConfig {
    /// Defaults with the given channel counts.
    pub fn new(mic_count: usize, output_count: usize) -> Self {
        Self {
            mic_count,
            output_count,
            ..Self::default()
        }
    }

    /// Set the prediction order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Set the prediction delay in frames.
    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    /// Set the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the STFT frame size.
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Set the STFT overlap.
    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the STFT window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Set the residual power floor.
    pub fn with_variance_floor(mut self, floor: Option<f64>) -> Self {
        self.variance_floor = floor;
        self
    }

    /// Framing part of the configuration.
    pub fn stft(&self) -> StftConfig {
        StftConfig::new(self.frame_size, self.overlap).with_window(self.window.clone())
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.mic_count == 0 {
            return Err(Error::config("mic_count must be positive"));
        }
        if self.output_count == 0 {
            return Err(Error::config("output_count must be positive"));
        }
        if self.output_count > self.mic_count {
            return Err(Error::config(format!(
                "output_count ({}) exceeds mic_count ({})",
                self.output_count, self.mic_count
            )));
        }
        if self.order == 0 {
            return Err(Error::config("prediction order must be positive"));
        }
        if self.delay == 0 {
            return Err(Error::config("prediction delay must be at least one frame"));
        }
        if self.iterations == 0 {
            return Err(Error::config("iterations must be positive"));
        }
        if let Some(floor) = self.variance_floor
            && !(floor.is_finite() && floor > 0.0)
        {
            return Err(Error::config(format!(
                "variance floor must be finite and positive, got {floor}"
            )));
        }
        self.stft().validate()
    }
}
