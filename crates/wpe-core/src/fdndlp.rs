//! Frequency-domain variance-normalized delayed linear prediction (FDNDLP).
//!
//! Drives the whole dereverberation run:
//!
//! 1. normalize the input by its peak absolute amplitude
//! 2. STFT analysis
//! 3. one [`BinPredictor`] call per frequency bin
//! 4. STFT synthesis
//! 5. normalize the output by its own peak absolute amplitude
//!
//! Bins share no state. With the `parallel` feature (on by default) they are
//! spread over the rayon thread pool; every task writes its result into its
//! own pre-allocated chunk of a bin-major buffer, which is then scattered
//! into the output tensor.

use crate::config::WpeConfig;
use crate::error::{Error, Result};
use crate::ndlp::BinPredictor;
use crate::signal::{MultichannelSignal, TfTensor};
use crate::stft::Stft;
use rustfft::num_complex::Complex64;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Multichannel WPE dereverberator.
///
/// # Example
///
/// ```rust,ignore
/// use wpe_core::{Dereverberator, WpeConfig};
///
/// let wpe = Dereverberator::new(WpeConfig::new(3, 2))?;
/// let dry = wpe.run(&reverberant)?;
/// assert_eq!(dry.num_channels(), 2);
/// ```
pub struct Dereverberator {
    config: WpeConfig,
    stft: Stft,
    predictor: BinPredictor,
}

impl Dereverberator {
    /// Validate `config` and prepare the framer and bin predictor.
    pub fn new(config: WpeConfig) -> Result<Self> {
        config.validate()?;
        let stft = Stft::new(config.stft())?;
        let predictor = BinPredictor::new(
            config.order,
            config.delay,
            config.iterations,
            config.output_count,
        )?
        .with_variance_floor(config.variance_floor)?;

        Ok(Self {
            config,
            stft,
            predictor,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &WpeConfig {
        &self.config
    }

    /// The per-bin predictor.
    pub fn predictor(&self) -> &BinPredictor {
        &self.predictor
    }

    /// Framer used for analysis and synthesis.
    pub fn stft(&self) -> &Stft {
        &self.stft
    }

    /// Dereverberate a `(mic_count, samples)` signal.
    ///
    /// The result has `output_count` channels, peak-normalized to 1, and the
    /// overlap-add length of the synthesis (up to one frame shift longer than
    /// the input).
    pub fn run(&self, signal: &MultichannelSignal) -> Result<MultichannelSignal> {
        self.run_with_progress(signal, &|_| {})
    }

    /// Like [`run`](Self::run), calling `progress` with each finished bin index.
    ///
    /// `progress` may be called from several threads and in any bin order.
    pub fn run_with_progress(
        &self,
        signal: &MultichannelSignal,
        progress: &(dyn Fn(usize) + Sync),
    ) -> Result<MultichannelSignal> {
        self.check_channels(signal.num_channels())?;

        let mut input = signal.clone();
        input.normalize_peak()?;

        let tensor = self.stft.analyze(&input)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            channels = tensor.num_channels(),
            frames = tensor.num_frames(),
            bins = tensor.num_bins(),
            "wpe: analysis done"
        );

        let dereverberated = self.dereverberate_tensor_with_progress(&tensor, progress)?;

        let mut output = self.stft.synthesize(&dereverberated)?;
        output.normalize_peak()?;
        Ok(output)
    }

    /// Dereverberate every bin of an analysed `(mic_count, frames, bins)` tensor.
    ///
    /// Returns a `(output_count, frames, bins)` tensor.
    pub fn dereverberate_tensor(&self, tensor: &TfTensor) -> Result<TfTensor> {
        self.dereverberate_tensor_with_progress(tensor, &|_| {})
    }

    /// Like [`dereverberate_tensor`](Self::dereverberate_tensor), reporting
    /// each finished bin to `progress`.
    pub fn dereverberate_tensor_with_progress(
        &self,
        tensor: &TfTensor,
        progress: &(dyn Fn(usize) + Sync),
    ) -> Result<TfTensor> {
        self.check_channels(tensor.num_channels())?;

        let (_, frames, bins) = tensor.shape();
        let out = self.config.output_count;
        let stride = frames * out;

        // Bin-major scratch: bin k owns columns[k * stride..(k + 1) * stride],
        // laid out like a column-major `frames x out` matrix.
        let mut columns = vec![Complex64::new(0.0, 0.0); bins * stride];

        let task = |(bin, chunk): (usize, &mut [Complex64])| -> Result<()> {
            let predicted = self
                .predictor
                .predict(&tensor.bin_matrix(bin))
                .map_err(|e| e.at_bin(bin))?;
            chunk.copy_from_slice(predicted.as_slice());
            progress(bin);
            Ok(())
        };

        #[cfg(feature = "parallel")]
        columns.par_chunks_mut(stride).enumerate().try_for_each(task)?;
        #[cfg(not(feature = "parallel"))]
        columns.chunks_mut(stride).enumerate().try_for_each(task)?;

        let mut output = tensor.select_channels(out)?;
        for (bin, chunk) in columns.chunks_exact(stride).enumerate() {
            for o in 0..out {
                for f in 0..frames {
                    output.set(o, f, bin, chunk[o * frames + f]);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(bins, frames, outputs = out, "wpe: all bins predicted");

        Ok(output)
    }

    fn check_channels(&self, channels: usize) -> Result<()> {
        if channels != self.config.mic_count {
            return Err(Error::shape(format!(
                "input has {channels} channels, configured for {}",
                self.config.mic_count
            )));
        }
        Ok(())
    }
}

/// Dereverberate `signal` with default framing (512-sample frames, 50%
/// overlap, Hann window) and a delay of two frames.
pub fn dereverberate(
    signal: &MultichannelSignal,
    mic_count: usize,
    output_count: usize,
    prediction_order: usize,
    iterations: usize,
) -> Result<MultichannelSignal> {
    let config = WpeConfig::new(mic_count, output_count)
        .with_order(prediction_order)
        .with_iterations(iterations);
    Dereverberator::new(config)?.run(signal)
}
