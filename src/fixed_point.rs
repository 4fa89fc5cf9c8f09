//! Fixed-point scale selection and the embedded fixed-point header.
//!
//! Linear and slof streams carry their fixed point as an 8-byte little-endian
//! IEEE-754 prefix. The optimizers pick the largest fixed point that keeps
//! every integer the codec produces inside its storage width:
//!
//! | Optimizer | Ceiling |
//! |-----------|---------|
//! | [`optimal_linear_fixed_point`] | prediction residuals and seeds fit `i32` |
//! | [`optimal_linear_fixed_point_mass`] | as above, plus scaled values fit `i64` |
//! | [`optimal_slof_fixed_point`] | `ln(x + 1) * fp` fits `u16` |

use tracing::debug;

use crate::error::NumpressError;

/// Default fixed point for the linear codec (5 decimal places).
pub const DEFAULT_LINEAR_FIXED_POINT: f64 = 100_000.0;

/// Default fixed point for the slof codec.
pub const DEFAULT_SLOF_FIXED_POINT: f64 = 3_000.0;

/// Sentinel returned by [`optimal_linear_fixed_point_mass`] when no fixed point
/// reaches the requested accuracy.
pub const INFEASIBLE_FIXED_POINT: f64 = -1.0;

/// Size of the embedded fixed-point header in bytes.
pub const HEADER_LEN: usize = 8;

/// Largest signed 32-bit integer as a float.
const I32_CEILING: f64 = i32::MAX as f64;

/// `2^63`, the first float outside the signed 64-bit range.
const I64_CEILING: f64 = 9_223_372_036_854_775_808.0;

/// Largest unsigned 16-bit integer as a float.
const U16_CEILING: f64 = u16::MAX as f64;

/// Check that `fixed_point` is finite and strictly positive.
#[inline]
pub fn validate(fixed_point: f64) -> Result<f64, NumpressError> {
    if fixed_point.is_finite() && fixed_point > 0.0 {
        Ok(fixed_point)
    } else {
        Err(NumpressError::InvalidFixedPoint(fixed_point))
    }
}

/// Whether a scaled value can be rounded into an `i64`.
#[inline]
pub(crate) fn fits_i64(scaled: f64) -> bool {
    scaled.is_finite() && scaled.abs() < I64_CEILING
}

/// How a stream carries its fixed point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Framing {
    /// The stream starts with the 8-byte fixed-point header.
    #[default]
    Embedded,
    /// No header; encoder and decoder agree on the fixed point out of band.
    OutOfBand,
}

impl Framing {
    /// Number of header bytes this framing adds to a stream.
    #[inline]
    pub const fn header_len(self) -> usize {
        match self {
            Framing::Embedded => HEADER_LEN,
            Framing::OutOfBand => 0,
        }
    }
}

/// The 8-byte little-endian header for `fixed_point`.
#[inline]
pub fn fixed_point_header(fixed_point: f64) -> [u8; HEADER_LEN] {
    fixed_point.to_le_bytes()
}

/// Read the fixed point embedded at the start of a linear or slof stream.
///
/// # Example
/// ```
/// use msnumpress::{encode_slof, fixed_point::read_fixed_point};
///
/// let encoded = encode_slof(&[1.0, 2.0], 1000.0).unwrap();
/// assert_eq!(read_fixed_point(&encoded).unwrap(), 1000.0);
/// ```
pub fn read_fixed_point(bytes: &[u8]) -> Result<f64, NumpressError> {
    read_header(bytes, "fixed point header")
}

/// Read the header, naming `codec` if the stream is too short.
pub(crate) fn read_header(bytes: &[u8], codec: &'static str) -> Result<f64, NumpressError> {
    let header: [u8; HEADER_LEN] = bytes
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(NumpressError::StreamTooShort {
            codec,
            expected: HEADER_LEN,
            actual: bytes.len(),
        })?;
    validate(f64::from_le_bytes(header))
}

/// Read the header of an embedded stream and check it against a caller-supplied fixed point.
pub(crate) fn check_header(
    bytes: &[u8],
    codec: &'static str,
    expected: f64,
) -> Result<f64, NumpressError> {
    let expected = validate(expected)?;
    let found = read_header(bytes, codec)?;
    if found != expected {
        debug!(codec, expected, found, "fixed point mismatch");
        return Err(NumpressError::FixedPointMismatch { expected, found });
    }
    Ok(found)
}

/// Compute the largest linear fixed point that cannot overflow the codec.
///
/// The two seeds are stored as `i32`, and every later value as an `i32`
/// residual against `2 * prev - prev_prev`. The bound is
/// `floor(i32::MAX / m)` where `m` is the largest of the seed magnitudes and
/// `ceil(|residual| + 1)` over the data (the `+ 1` absorbs rounding).
///
/// Returns `0.0` for empty data.
///
/// # Example
/// ```
/// use msnumpress::optimal_linear_fixed_point;
///
/// assert_eq!(optimal_linear_fixed_point(&[100.0, 101.0, 102.0, 103.0]), 21262214.0);
/// ```
pub fn optimal_linear_fixed_point(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut max_double = data.iter().take(2).fold(1.0f64, |m, v| m.max(v.abs()));

    for w in data.windows(3) {
        let extrapol = w[1] + (w[1] - w[0]);
        let diff = w[2] - extrapol;
        max_double = max_double.max((diff.abs() + 1.0).ceil());
    }

    let fp = (I32_CEILING / max_double).floor();
    debug!(len = data.len(), fixed_point = fp, "computed linear fixed point");
    fp
}

/// Compute the linear fixed point that gives at least `mass_acc` absolute accuracy.
///
/// Rounding to the fixed-point grid loses at most half a unit, so the
/// candidate is `0.5 / mass_acc`. Returns [`INFEASIBLE_FIXED_POINT`] when the
/// candidate is above [`optimal_linear_fixed_point`], when it would push the
/// largest scaled magnitude outside `i64`, or when `mass_acc` is not a finite
/// positive number.
///
/// # Example
/// ```
/// use msnumpress::{optimal_linear_fixed_point_mass, INFEASIBLE_FIXED_POINT};
///
/// let data = [100.0, 200.0, 300.00005, 400.00010];
/// assert_eq!(optimal_linear_fixed_point_mass(&data, 0.001), 500.0);
/// assert_eq!(optimal_linear_fixed_point_mass(&data, 1e-8), INFEASIBLE_FIXED_POINT);
/// ```
pub fn optimal_linear_fixed_point_mass(data: &[f64], mass_acc: f64) -> f64 {
    try_optimal_linear_fixed_point_mass(data, mass_acc).unwrap_or(INFEASIBLE_FIXED_POINT)
}

/// [`optimal_linear_fixed_point_mass`] with infeasibility reported as an error.
pub fn try_optimal_linear_fixed_point_mass(
    data: &[f64],
    mass_acc: f64,
) -> Result<f64, NumpressError> {
    let limit = optimal_linear_fixed_point(data);
    let infeasible = NumpressError::InfeasibleAccuracy {
        accuracy: mass_acc,
        limit,
    };

    if !(mass_acc.is_finite() && mass_acc > 0.0) {
        debug!(mass_acc, "accuracy must be finite and positive");
        return Err(infeasible);
    }

    let fp = 0.5 / mass_acc;
    if fp > limit {
        debug!(mass_acc, fixed_point = fp, limit, "accuracy exceeds the i32 residual ceiling");
        return Err(infeasible);
    }

    let max_abs = data.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if !fits_i64(fp * max_abs) {
        debug!(mass_acc, fixed_point = fp, max_abs, "accuracy exceeds the i64 value ceiling");
        return Err(infeasible);
    }

    Ok(fp)
}

/// Compute the largest slof fixed point for `data`.
///
/// The bound is `floor(65535 / max(1, ln(x + 1)))`, so every rounded slot fits
/// a `u16`. Returns `0.0` for empty data.
///
/// # Example
/// ```
/// use msnumpress::optimal_slof_fixed_point;
///
/// assert_eq!(optimal_slof_fixed_point(&[100.0, 101.0, 102.0, 103.0]), 14110.0);
/// ```
pub fn optimal_slof_fixed_point(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let max_log = data.iter().fold(1.0f64, |m, v| m.max((v + 1.0).ln()));
    let fp = (U16_CEILING / max_log).floor();
    debug!(len = data.len(), fixed_point = fp, "computed slof fixed point");
    fp
}
