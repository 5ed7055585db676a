//! Real-input FFT wrapper and analysis windows.

use rustfft::{FftPlanner, num_complex::Complex64};
use std::f64::consts::PI;
use std::sync::Arc;

/// Window function applied to every analysis frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Window {
    /// Symmetric Hann window, `0.5 - 0.5 cos(2πn / (N-1))`.
    #[default]
    Hann,
    /// Periodic Hann window, `0.5 - 0.5 cos(2πn / N)`.
    ///
    /// Sums to a constant under overlap-add at 50% and 75% overlap.
    PeriodicHann,
    /// Symmetric Hamming window
    Hamming,
    /// Symmetric Blackman window
    Blackman,
    /// Rectangular (no windowing)
    Rectangular,
    /// Caller-supplied coefficients; length must equal the frame size.
    Custom(Vec<f64>),
}

impl Window {
    /// Get window coefficients for a frame of `size` samples.
    ///
    /// For [`Window::Custom`] the stored coefficients are returned as-is,
    /// regardless of `size`.
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        if let Window::Custom(coeffs) = self {
            return coeffs.clone();
        }
        if size <= 1 {
            return vec![1.0; size];
        }

        // Symmetric windows span N-1 intervals, periodic ones N.
        let sym = (size - 1) as f64;
        (0..size)
            .map(|i| {
                let n = i as f64;
                match self {
                    Window::Hann => 0.5 - 0.5 * (2.0 * PI * n / sym).cos(),
                    Window::PeriodicHann => 0.5 - 0.5 * (2.0 * PI * n / size as f64).cos(),
                    Window::Hamming => 0.54 - 0.46 * (2.0 * PI * n / sym).cos(),
                    Window::Blackman => {
                        let x = 2.0 * PI * n / sym;
                        0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
                    }
                    Window::Rectangular | Window::Custom(_) => 1.0,
                }
            })
            .collect()
    }

    /// Parse a window name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Some(Window::Hann),
            "periodic-hann" | "periodic_hann" => Some(Window::PeriodicHann),
            "hamming" => Some(Window::Hamming),
            "blackman" => Some(Window::Blackman),
            "rect" | "rectangular" | "none" => Some(Window::Rectangular),
            _ => None,
        }
    }
}

/// Forward/inverse FFT pair for real frames of a fixed size.
pub struct RealFft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl RealFft {
    /// Plan transforms for frames of `size` samples.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Number of non-redundant bins, `size / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Forward transform of a real frame.
    ///
    /// Writes bins `0..=size/2` into `spectrum`. `scratch` must hold `size`
    /// elements.
    pub fn forward_into(
        &self,
        input: &[f64],
        scratch: &mut [Complex64],
        spectrum: &mut [Complex64],
    ) {
        debug_assert_eq!(input.len(), self.size);
        for (dst, &x) in scratch.iter_mut().zip(input) {
            *dst = Complex64::new(x, 0.0);
        }
        self.fft.process(scratch);
        spectrum.copy_from_slice(&scratch[..self.num_bins()]);
    }

    /// Forward transform of a real frame, allocating the result.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut scratch = vec![Complex64::new(0.0, 0.0); self.size];
        let mut spectrum = vec![Complex64::new(0.0, 0.0); self.num_bins()];
        self.forward_into(input, &mut scratch, &mut spectrum);
        spectrum
    }

    /// Inverse transform of a half spectrum to a real frame.
    ///
    /// The negative-frequency half is rebuilt by conjugate symmetry. Any
    /// imaginary part on DC (and Nyquist, for even sizes) does not reach the
    /// real output. `scratch` must hold `size` elements.
    pub fn inverse_into(
        &self,
        spectrum: &[Complex64],
        scratch: &mut [Complex64],
        output: &mut [f64],
    ) {
        debug_assert_eq!(spectrum.len(), self.num_bins());
        let bins = spectrum.len();
        for (k, dst) in scratch.iter_mut().enumerate() {
            *dst = if k < bins {
                spectrum[k]
            } else {
                spectrum[self.size - k].conj()
            };
        }
        self.ifft.process(scratch);

        let scale = 1.0 / self.size as f64;
        for (dst, c) in output.iter_mut().zip(scratch.iter()) {
            *dst = c.re * scale;
        }
    }

    /// Inverse transform of a half spectrum, allocating the result.
    pub fn inverse(&self, spectrum: &[Complex64]) -> Vec<f64> {
        let mut scratch = vec![Complex64::new(0.0, 0.0); self.size];
        let mut output = vec![0.0; self.size];
        self.inverse_into(spectrum, &mut scratch, &mut output);
        output
    }
}
