//! Error types for numpress encoding/decoding operations.

use thiserror::Error;

/// Errors that can occur during numpress operations.
///
/// Each variant maps to a stable numeric code through [`NumpressError::code`],
/// so a binding or command-line layer can report a distinct failure signal
/// per kind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumpressError {
    /// The encoded stream is shorter than the codec's minimum viable length.
    #[error("{codec} stream too short: expected at least {expected} bytes, got {actual}")]
    StreamTooShort {
        /// Name of the codec that rejected the stream.
        codec: &'static str,
        /// Minimum number of bytes required at this point.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// The encoded stream ends in the middle of a value or carries an invalid terminator.
    #[error(
        "corrupt stream at byte {offset} ({} nibble) after {decoded} decoded values",
        phase(.half)
    )]
    StreamCorrupt {
        /// Byte offset at which the failing value started.
        offset: usize,
        /// Whether the failing value started on the low nibble of `offset`.
        half: bool,
        /// Number of values successfully reconstructed before the failure.
        decoded: usize,
    },

    /// A prediction residual (or seed value) does not fit a signed 32-bit integer.
    ///
    /// A smaller fixed point may succeed.
    #[error("value {index}: residual {residual} exceeds the signed 32-bit range")]
    Overflow32 {
        /// Index of the offending value in the input array.
        index: usize,
        /// The residual that was out of range.
        residual: i64,
    },

    /// A scaled value is not finite or does not fit a signed 64-bit integer.
    ///
    /// No fixed point can encode this value; use the safe codec.
    #[error("value {index}: scaled value {value} exceeds the signed 64-bit range")]
    Overflow64 {
        /// Index of the offending value in the input array.
        index: usize,
        /// The scaled value (`value * fixed_point`).
        value: f64,
    },

    /// The requested accuracy needs a fixed point above the overflow ceiling.
    #[error("accuracy {accuracy} needs a fixed point above the safe limit {limit}")]
    InfeasibleAccuracy {
        /// The requested absolute accuracy.
        accuracy: f64,
        /// The largest fixed point that is safe for the data.
        limit: f64,
    },

    /// The fixed point is not a finite positive number.
    #[error("invalid fixed point: {0} (must be finite and > 0)")]
    InvalidFixedPoint(f64),

    /// The fixed point given to the decoder differs from the one embedded in the stream.
    #[error("fixed point mismatch: expected {expected}, stream carries {found}")]
    FixedPointMismatch {
        /// The fixed point supplied by the caller.
        expected: f64,
        /// The fixed point read from the stream header.
        found: f64,
    },

    /// A count does not round into `[0, 2^32 - 2]`.
    #[error("value {index}: {value} cannot be stored as a count in [0, 4294967294]")]
    CountOutOfRange {
        /// Index of the offending value in the input array.
        index: usize,
        /// The offending value.
        value: f64,
    },
}

/// A codec name that is not one of `linear`, `pic`, `slof`, `safe`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown numpress scheme {0:?} (expected linear, pic, slof or safe)")]
pub struct ParseSchemeError(pub String);

fn phase(half: &bool) -> &'static str {
    if *half {
        "low"
    } else {
        "high"
    }
}

impl NumpressError {
    /// Stable numeric code for this error kind, for FFI and exit statuses.
    ///
    /// Codes are negative and never reused.
    pub const fn code(&self) -> i32 {
        match self {
            NumpressError::StreamTooShort { .. } => -1,
            NumpressError::StreamCorrupt { .. } => -2,
            NumpressError::Overflow32 { .. } => -3,
            NumpressError::Overflow64 { .. } => -4,
            NumpressError::InfeasibleAccuracy { .. } => -5,
            NumpressError::InvalidFixedPoint(_) => -6,
            NumpressError::FixedPointMismatch { .. } => -7,
            NumpressError::CountOutOfRange { .. } => -8,
        }
    }

    /// Whether retrying the encode with a smaller fixed point can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, NumpressError::Overflow32 { .. })
    }

    /// Replace the decoded-prefix length of a [`NumpressError::StreamCorrupt`].
    pub(crate) fn with_decoded(self, count: usize) -> Self {
        match self {
            NumpressError::StreamCorrupt { offset, half, .. } => NumpressError::StreamCorrupt {
                offset,
                half,
                decoded: count,
            },
            other => other,
        }
    }
}
