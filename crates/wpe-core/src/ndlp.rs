//! Variance-normalized delayed linear prediction (NDLP) for one frequency bin.
//!
//! Each output channel of a bin is modelled as the direct sound plus a late
//! reverberant tail that can be predicted from the multichannel history at
//! least `delay` frames in the past:
//!
//! ```text
//! d[t] = x[t] - Σ_c Σ_a conj(g[a, c]) · x_c[t - delay - a]     a ∈ 0..order
//! ```
//!
//! The coefficients `g` minimize the variance-normalized error
//! `Σ_t |d[t]|² / λ[t]`, where `λ[t]` is the current estimate of the
//! direct-sound power at frame `t`. Each iteration alternates between
//!
//! ```text
//! R = X · diag(1/λ) · Xᴴ
//! r = X · conj(x ⊙ 1/λ)
//! g = R⁻¹ r
//! d = x - Xᵀ · conj(g)
//! λ = |d|²
//! ```
//!
//! which never increases `Σ_t ln λ[t]`.
//!
//! # References
//!
//! - Nakatani et al., "Speech Dereverberation Based on Variance-Normalized
//!   Delayed Linear Prediction", IEEE TASLP 18(7), 2010.
//! - Yoshioka & Nakatani, "Generalization of Multi-Channel Linear Prediction
//!   Methods for Blind MIMO Impulse Response Shortening", IEEE TASLP 20(10), 2012.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use rustfft::num_complex::Complex64;

/// Default number of taps per channel.
pub const DEFAULT_ORDER: usize = 30;

/// Default prediction delay in frames.
pub const DEFAULT_DELAY: usize = 2;

/// Default number of variance re-estimation passes.
pub const DEFAULT_ITERATIONS: usize = 2;

/// Cholesky pivots whose square falls below this fraction of the matching
/// diagonal entry mark the weighted correlation matrix as singular.
const PIVOT_TOLERANCE: f64 = 1e-13;

/// Result of [`BinPredictor::predict_with_trace`].
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Dereverberated bin, `frames x output_channels`.
    pub signal: DMatrix<Complex64>,
    /// Mean log-variance `mean_t ln λ[t]` of the predicted frames.
    ///
    /// Entry 0 is the input; entry `i` follows iteration `i`.
    pub log_variance: Vec<f64>,
}

/// Delayed linear predictor for a single frequency bin.
///
/// Stateless between calls, so one predictor can serve every bin from any
/// number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct BinPredictor {
    order: usize,
    delay: usize,
    iterations: usize,
    output_channels: usize,
    variance_floor: Option<f64>,
}

impl BinPredictor {
    /// Create a predictor.
    ///
    /// # Arguments
    ///
    /// * `order` — taps per input channel (p), at least 1
    /// * `delay` — frames skipped before prediction starts (d), at least 1
    /// * `iterations` — variance re-estimation passes, at least 1
    /// * `output_channels` — leading input channels to dereverberate, at least 1
    pub fn new(
        order: usize,
        delay: usize,
        iterations: usize,
        output_channels: usize,
    ) -> Result<Self> {
        if order == 0 {
            return Err(Error::config("prediction order must be positive"));
        }
        // A zero delay puts the target frame in its own regressor.
        if delay == 0 {
            return Err(Error::config("prediction delay must be at least one frame"));
        }
        if iterations == 0 {
            return Err(Error::config("iterations must be positive"));
        }
        if output_channels == 0 {
            return Err(Error::config("output channel count must be positive"));
        }
        Ok(Self {
            order,
            delay,
            iterations,
            output_channels,
            variance_floor: None,
        })
    }

    /// Clamp `|d|²` to at least `floor` before taking reciprocals.
    ///
    /// Off by default. Changes results wherever a residual falls below the
    /// floor.
    pub fn with_variance_floor(mut self, floor: Option<f64>) -> Result<Self> {
        if let Some(f) = floor
            && !(f.is_finite() && f > 0.0)
        {
            return Err(Error::config(format!(
                "variance floor must be finite and positive, got {f}"
            )));
        }
        self.variance_floor = floor;
        Ok(self)
    }

    /// Taps per channel.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Prediction delay in frames.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Variance re-estimation passes.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of dereverberated channels.
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Dereverberate one bin.
    ///
    /// `bin` is `frames x channels`; the result is `frames x output_channels`.
    /// The first `delay` frames pass through unchanged.
    pub fn predict(&self, bin: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
        self.predict_with_trace(bin).map(|p| p.signal)
    }

    /// Dereverberate one bin and report the log-variance after each pass.
    pub fn predict_with_trace(&self, bin: &DMatrix<Complex64>) -> Result<Prediction> {
        self.check_shape(bin)?;

        let (frames, _) = bin.shape();
        let predicted = frames - self.delay;
        let out = self.output_channels;

        let regressors = self.regressors(bin);
        let target = bin.view((self.delay, 0), (predicted, out)).into_owned();

        let mut weights = self.weights(&target)?;
        let mut log_variance = Vec::with_capacity(self.iterations + 1);
        log_variance.push(mean_log_variance(&weights));

        let mut residual = target.clone();
        for _ in 0..self.iterations {
            let coeffs = self.solve(&regressors, &target, &weights)?;
            residual = &target - regressors.transpose() * coeffs.conjugate();
            weights = self.weights(&residual)?;
            log_variance.push(mean_log_variance(&weights));
        }

        let mut signal = DMatrix::zeros(frames, out);
        signal
            .view_mut((0, 0), (self.delay, out))
            .copy_from(&bin.view((0, 0), (self.delay, out)));
        signal
            .view_mut((self.delay, 0), (predicted, out))
            .copy_from(&residual);

        Ok(Prediction {
            signal,
            log_variance,
        })
    }

    fn check_shape(&self, bin: &DMatrix<Complex64>) -> Result<()> {
        let (frames, channels) = bin.shape();
        if channels < self.output_channels {
            return Err(Error::shape(format!(
                "bin has {channels} channels, {} outputs requested",
                self.output_channels
            )));
        }
        if frames <= self.delay {
            return Err(Error::shape(format!(
                "bin has {frames} frames, nothing left to predict after a delay of {}",
                self.delay
            )));
        }
        let predicted = frames - self.delay;
        let taps = channels * self.order;
        if predicted < taps {
            return Err(Error::shape(format!(
                "{predicted} predicted frames cannot determine {taps} coefficients \
                 ({channels} channels x order {})",
                self.order
            )));
        }
        Ok(())
    }

    /// Stack the delayed history into a `(channels * order) x predicted` matrix.
    ///
    /// Column `t` predicts frame `t + delay`; row `a * channels + c` holds
    /// `x_c[t - a]`, zero before the first frame.
    fn regressors(&self, bin: &DMatrix<Complex64>) -> DMatrix<Complex64> {
        let (frames, channels) = bin.shape();
        let predicted = frames - self.delay;
        DMatrix::from_fn(channels * self.order, predicted, |row, t| {
            let (tap, c) = (row / channels, row % channels);
            if t >= tap {
                bin[(t - tap, c)]
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
    }

    /// Per-frame weights `1/λ[t]`, averaged over output channels.
    fn weights(&self, signal: &DMatrix<Complex64>) -> Result<DVector<f64>> {
        let floor = self.variance_floor.unwrap_or(0.0);
        let out = signal.ncols() as f64;
        let weights = DVector::from_fn(signal.nrows(), |t, _| {
            signal
                .row(t)
                .iter()
                .map(|x| 1.0 / x.norm_sqr().max(floor))
                .sum::<f64>()
                / out
        });

        if let Some(t) = weights.iter().position(|w| !w.is_finite()) {
            return Err(Error::singular(format!(
                "variance weight of frame {} is not finite (zero power)",
                t + self.delay
            )));
        }
        Ok(weights)
    }

    /// Solve `R g = r` for the prediction coefficients.
    fn solve(
        &self,
        regressors: &DMatrix<Complex64>,
        target: &DMatrix<Complex64>,
        weights: &DVector<f64>,
    ) -> Result<DMatrix<Complex64>> {
        let mut weighted = regressors.clone();
        for (mut col, &w) in weighted.column_iter_mut().zip(weights.iter()) {
            col *= Complex64::new(w, 0.0);
        }
        let correlation = &weighted * regressors.adjoint();
        let diagonal: Vec<f64> = correlation.diagonal().iter().map(|c| c.re).collect();

        let cross = regressors
            * DMatrix::from_fn(target.nrows(), target.ncols(), |t, o| {
                (target[(t, o)] * weights[t]).conj()
            });

        let cholesky = correlation
            .cholesky()
            .ok_or_else(|| {
                Error::singular("weighted correlation matrix is not positive definite")
            })?;

        let l = cholesky.l_dirty();
        for (k, &d) in diagonal.iter().enumerate() {
            let pivot = l[(k, k)];
            let pivot_sq = pivot.re * pivot.re;
            if !pivot_sq.is_finite() || pivot.re <= 0.0 || pivot_sq <= PIVOT_TOLERANCE * d {
                return Err(Error::singular(format!(
                    "weighted correlation matrix is rank deficient at coefficient {k}"
                )));
            }
        }

        let coeffs = cholesky.solve(&cross);
        if coeffs.iter().any(|c| !(c.re.is_finite() && c.im.is_finite())) {
            return Err(Error::singular("prediction coefficients are not finite"));
        }
        Ok(coeffs)
    }
}

fn mean_log_variance(weights: &DVector<f64>) -> f64 {
    -weights.iter().map(|w| w.ln()).sum::<f64>() / weights.len() as f64
}
