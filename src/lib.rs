//! # msnumpress
//!
//! Numeric compression codecs for mass spectrometry data arrays.
//!
//! ## Overview
//!
//! Mass spectrometry files hold long arrays of doubles: m/z values that grow
//! smoothly, retention times, and non-negative ion counts. This crate packs
//! them far below 8 bytes per value with four small codecs:
//!
//! 1. **Linear**: fixed-point integers stored as residuals against a
//!    second-order linear prediction, written with a nibble-granular integer
//!    code. Best for m/z and retention time.
//! 2. **Pic**: values rounded to non-negative integers and written with the
//!    same nibble code. Best for ion counts.
//! 3. **Slof**: `ln(x + 1)` quantized to two bytes. Fixed size and seekable,
//!    with bounded relative error. Best for intensities.
//! 4. **Safe**: raw 8-byte doubles, the lossless fallback.
//!
//! ## Quick Start
//!
//! ```rust
//! use msnumpress::{decode_linear, encode_linear, optimal_linear_fixed_point};
//!
//! let mz = vec![100.0, 200.0, 300.00005, 400.00010];
//!
//! // Encode with 5 decimal places of precision
//! let encoded = encode_linear(&mz, Some(100_000.0)).unwrap();
//! assert_eq!(encoded.len(), 18);
//!
//! // The fixed point travels in the stream header
//! let decoded = decode_linear(&encoded, None).unwrap();
//! for (orig, dec) in mz.iter().zip(decoded.iter()) {
//!     assert!((orig - dec).abs() < 5e-6);
//! }
//!
//! // Or let the optimizer pick the largest overflow-safe fixed point
//! let fixed_point = optimal_linear_fixed_point(&mz);
//! let encoded = encode_linear(&mz, Some(fixed_point)).unwrap();
//! ```
//!
//! ## Stream Formats
//!
//! All integers are little-endian.
//!
//! | Codec | Header | Body | Size |
//! |-------|--------|------|------|
//! | Linear | 8-byte f64 fixed point | 2 x i32 seeds, packed nibble residuals | at most `16 + ceil(4.5 (n - 2))` |
//! | Pic | none | packed nibble counts | at most `ceil(4.5 n)` |
//! | Slof | 8-byte f64 fixed point | n x u16 | exactly `8 + 2n` |
//! | Safe | none | n x f64 | exactly `8n` |
//!
//! Linear and slof streams can also be written without the header
//! ([`Framing::OutOfBand`]), in which case the decoder must be given the same
//! fixed point.
//!
//! ## Choosing a Fixed Point
//!
//! | Fixed point | Linear absolute error |
//! |-------------|----------------------|
//! | 1000 | 5e-4 |
//! | 100000 | 5e-6 |
//! | [`optimal_linear_fixed_point`] | smallest without overflow |
//! | [`optimal_linear_fixed_point_mass`] | the requested accuracy, or `-1` |
//!
//! Encoding fails with [`NumpressError::Overflow32`] when the fixed point is
//! too large for the data; a smaller one will work. [`NumpressError::Overflow64`]
//! means no fixed point can work and [`encode_safe`] is the way out.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod fixed_point;
mod linear;
pub mod nibble;
mod pic;
mod safe;
mod scheme;
mod slof;

#[cfg(test)]
mod tests;

pub use error::{NumpressError, ParseSchemeError};
pub use fixed_point::{
    optimal_linear_fixed_point, optimal_linear_fixed_point_mass, optimal_slof_fixed_point,
    read_fixed_point, try_optimal_linear_fixed_point_mass, Framing, DEFAULT_LINEAR_FIXED_POINT,
    DEFAULT_SLOF_FIXED_POINT, INFEASIBLE_FIXED_POINT,
};
pub use linear::{decode_linear, encode_linear, LinearCodec, LinearDecoder};
pub use pic::{decode_pic, encode_pic, PicCodec, PicDecoder, MAX_COUNT};
pub use safe::{decode_safe, encode_safe, SafeCodec};
pub use scheme::Scheme;
pub use slof::{decode_slof, encode_slof, SlofCodec};

/// Convenience type alias for Results with NumpressError.
pub type Result<T> = std::result::Result<T, NumpressError>;
