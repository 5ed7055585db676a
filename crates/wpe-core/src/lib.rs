//! WPE Core - Multichannel speech dereverberation
//!
//! Weighted prediction error (WPE) dereverberation in the STFT domain:
//! late reverberation in each frequency bin is predicted from delayed past
//! frames of all microphones and subtracted, with the prediction weighted by
//! the inverse of the iteratively estimated signal power.
//!
//! - [`fft`] - Real FFT wrapper and analysis windows
//! - [`signal`] - Multichannel time signals and time-frequency tensors
//! - [`stft`] - Multichannel STFT analysis and overlap-add synthesis
//! - [`ndlp`] - Per-bin iterative weighted delayed linear prediction
//! - [`fdndlp`] - Orchestration over all bins
//! - [`config`] - Run configuration and defaults
//!
//! ## Example
//!
//! ```rust,ignore
//! use wpe_core::{Dereverberator, MultichannelSignal, WpeConfig};
//!
//! let mics = MultichannelSignal::new(vec![mic0, mic1, mic2])?;
//! let wpe = Dereverberator::new(WpeConfig::new(3, 2).with_order(30))?;
//! let dry = wpe.run(&mics)?;
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): process frequency bins on the rayon thread pool
//! - `tracing`: debug-level events for each run

pub mod config;
pub mod error;
pub mod fdndlp;
pub mod fft;
pub mod ndlp;
pub mod signal;
pub mod stft;

pub use config::WpeConfig;
pub use error::{Error, Result};
pub use fdndlp::{Dereverberator, dereverberate};
pub use fft::{RealFft, Window};
pub use ndlp::{BinPredictor, Prediction};
pub use signal::{MultichannelSignal, TfTensor};
pub use stft::{
    LogSpectrogram, Stft, StftConfig, analysis_transform, log_spectrum, synthesis_transform,
};

pub use nalgebra::DMatrix;
pub use rustfft::num_complex::Complex64;
