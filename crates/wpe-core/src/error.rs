//! Error types for the dereverberation core.

use thiserror::Error;

/// Errors raised by the framer, the bin predictor, and the orchestrator.
///
/// Every failure is surfaced immediately; nothing is retried and no partial
/// result is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrong input dimensionality, channel-count mismatch, or too few frames.
    #[error("shape error: {0}")]
    Shape(String),

    /// The weighted correlation matrix of a bin cannot be solved.
    #[error("singular system: {0}")]
    SingularSystem(String),

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The input has zero peak amplitude and cannot be normalized.
    #[error("input signal is silent (peak amplitude is zero)")]
    SilentInput,

    /// A bin predictor failure, tagged with the offending frequency bin.
    #[error("frequency bin {bin}: {source}")]
    Bin {
        /// Index of the frequency bin that failed.
        bin: usize,
        /// The predictor error.
        source: Box<Error>,
    },
}

impl Error {
    /// Create a shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Error::Shape(msg.into())
    }

    /// Create a singular system error.
    pub fn singular(msg: impl Into<String>) -> Self {
        Error::SingularSystem(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    /// Attach a frequency bin index to this error.
    pub fn at_bin(self, bin: usize) -> Self {
        Error::Bin {
            bin,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any bin tagging peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::Bin { source, .. } => source.root(),
            other => other,
        }
    }

    /// The frequency bin this error is attached to, if any.
    pub fn bin(&self) -> Option<usize> {
        match self {
            Error::Bin { bin, .. } => Some(*bin),
            _ => None,
        }
    }
}

/// Convenience result type for the dereverberation core.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn at_bin_wraps_and_exposes_source() {
        let err = Error::singular("pivot 3 vanished").at_bin(17);
        assert_eq!(err.bin(), Some(17));
        assert!(matches!(err.root(), Error::SingularSystem(_)));
        assert!(err.source().is_some(), "bin error must expose its source");
    }

    #[test]
    fn bin_display_includes_index_and_cause() {
        let err = Error::shape("only 2 frames").at_bin(5);
        let msg = err.to_string();
        assert_eq!(msg, "frequency bin 5: shape error: only 2 frames");
    }

    #[test]
    fn plain_errors_have_no_bin() {
        let err = Error::config("iterations must be positive");
        assert_eq!(err.bin(), None);
        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "invalid configuration: iterations must be positive"
        );
    }

    #[test]
    fn silent_input_display() {
        assert_eq!(
            Error::SilentInput.to_string(),
            "input signal is silent (peak amplitude is zero)"
        );
    }
}
