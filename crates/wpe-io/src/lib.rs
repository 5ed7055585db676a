//! Multichannel audio file I/O for WPE dereverberation.
//!
//! This crate provides:
//!
//! - **WAV metadata**: [`read_wav_info`] without loading sample data
//! - **Multichannel reading**: [`read_wav`] for every channel, [`read_mics`]
//!   for the leading microphone channels of a recording
//! - **Multichannel writing**: [`write_wav`] at 16, 24 or 32-bit float
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wpe_io::{read_mics, write_wav};
//! use wpe_core::dereverberate;
//!
//! let (mics, spec) = read_mics("reverberant.wav", 3)?;
//! let dry = dereverberate(&mics, 3, 2, 30, 2)?;
//! write_wav("dry.wav", &dry, spec)?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, read_mics, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file has fewer channels than the caller needs.
    #[error("{path} has {found} channel(s), {required} required")]
    NotEnoughChannels {
        /// File that was read.
        path: String,
        /// Channels present in the file.
        found: usize,
        /// Channels requested.
        required: usize,
    },

    /// The requested sample format is not supported.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Decoded samples could not form a signal.
    #[error("Signal error: {0}")]
    Signal(#[from] wpe_core::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
