//! Short logarithmic-float codec: two bytes per value, fixed size, seekable.
//!
//! Each value is stored as `round(ln(value + 1) * fixed_point)` clamped into a
//! `u16`, and restored as `exp(slot / fixed_point) - 1`. The relative error is
//! bounded by the fixed point, not by the magnitude of the value.
//!
//! ## Encoding Format
//!
//! - Fixed point (8 bytes, f64 LE), omitted with [`Framing::OutOfBand`]
//! - Slots (n x 2 bytes, u16 LE)

use tracing::{debug, trace};

use crate::error::NumpressError;
use crate::fixed_point::{
    check_header, fixed_point_header, optimal_slof_fixed_point, read_header, validate, Framing,
    DEFAULT_SLOF_FIXED_POINT,
};

/// Bytes per encoded value.
const SLOT_LEN: usize = 2;

const CODEC: &str = "slof";

/// Short logarithmic-float compressor/decompressor.
///
/// # Example
/// ```
/// use msnumpress::SlofCodec;
///
/// let codec = SlofCodec::default();
/// let data = vec![0.0, 1.5, 250.0, 12345.0];
/// let encoded = codec.encode(&data).unwrap();
/// assert_eq!(encoded.len(), 8 + 2 * data.len());
///
/// let decoded = codec.decode(&encoded).unwrap();
/// for (orig, dec) in data.iter().zip(decoded.iter()) {
///     assert!((orig - dec).abs() <= 5e-4 * orig.max(1.0));
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlofCodec {
    fixed_point: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    framing: Framing,
}

impl Default for SlofCodec {
    fn default() -> Self {
        SlofCodec::new(DEFAULT_SLOF_FIXED_POINT)
    }
}

impl SlofCodec {
    /// Create a codec with the given fixed point and an embedded header.
    pub const fn new(fixed_point: f64) -> Self {
        SlofCodec {
            fixed_point,
            framing: Framing::Embedded,
        }
    }

    /// Create a codec with the largest fixed point whose slots fit a `u16` for `data`.
    ///
    /// Falls back to [`DEFAULT_SLOF_FIXED_POINT`] for empty data.
    pub fn optimal(data: &[f64]) -> Self {
        let fixed_point = optimal_slof_fixed_point(data);
        if fixed_point > 0.0 {
            SlofCodec::new(fixed_point)
        } else {
            SlofCodec::default()
        }
    }

    /// Switch between an embedded header and an out-of-band fixed point.
    pub const fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// The configured fixed point.
    pub const fn fixed_point(&self) -> f64 {
        self.fixed_point
    }

    /// The configured framing.
    pub const fn framing(&self) -> Framing {
        self.framing
    }

    /// Exact encoded size of `n` values.
    pub const fn max_encoded_len(&self, n: usize) -> usize {
        self.framing.header_len() + SLOT_LEN * n
    }

    /// Encode `data`.
    ///
    /// Values whose slot falls outside `[0, 65535]` are clamped, so values
    /// at or below `0` decode as `0` and NaN decodes as `0`.
    pub fn encode(&self, data: &[f64]) -> Result<Vec<u8>, NumpressError> {
        let fp = validate(self.fixed_point)?;
        let mut out = Vec::with_capacity(self.max_encoded_len(data.len()));

        if self.framing == Framing::Embedded {
            out.extend_from_slice(&fixed_point_header(fp));
        }
        for &value in data {
            out.extend_from_slice(&to_slot(value, fp).to_le_bytes());
        }

        trace!(values = data.len(), bytes = out.len(), "slof encode");
        Ok(out)
    }

    /// Decode a stream.
    ///
    /// With [`Framing::Embedded`] the fixed point comes from the stream header
    /// and the configured one is ignored; use [`decode_slof`] to check it.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
        let (fp, body_start) = match self.framing {
            Framing::Embedded => (read_header(bytes, CODEC)?, self.framing.header_len()),
            Framing::OutOfBand => (validate(self.fixed_point)?, 0),
        };

        let body = &bytes[body_start..];
        let slots = body.chunks_exact(SLOT_LEN);
        if !slots.remainder().is_empty() {
            let err = NumpressError::StreamCorrupt {
                offset: bytes.len() - 1,
                half: false,
                decoded: body.len() / SLOT_LEN,
            };
            debug!(error = %err, "slof body has a dangling byte");
            return Err(err);
        }

        let out: Vec<f64> = slots
            .map(|s| (u16::from_le_bytes([s[0], s[1]]) as f64 / fp).exp() - 1.0)
            .collect();

        trace!(bytes = bytes.len(), values = out.len(), "slof decode");
        Ok(out)
    }
}

#[inline]
fn to_slot(value: f64, fixed_point: f64) -> u16 {
    let slot = ((value + 1.0).ln() * fixed_point).round();
    if slot.is_nan() {
        0
    } else {
        slot.clamp(0.0, u16::MAX as f64) as u16
    }
}

/// Encode `data` with the slof codec and an embedded header.
///
/// # Example
/// ```
/// use msnumpress::{decode_slof, encode_slof};
///
/// let encoded = encode_slof(&[1.0, 2.0], 1000.0).unwrap();
/// assert_eq!(encoded.len(), 12);
/// let decoded = decode_slof(&encoded, Some(1000.0)).unwrap();
/// assert!((decoded[1] - 2.0).abs() < 0.01);
/// ```
pub fn encode_slof(data: &[f64], fixed_point: f64) -> Result<Vec<u8>, NumpressError> {
    SlofCodec::new(fixed_point).encode(data)
}

/// Decode a slof stream with an embedded header.
///
/// With `Some(fp)` the header must equal `fp`, otherwise
/// [`NumpressError::FixedPointMismatch`] is returned.
pub fn decode_slof(bytes: &[u8], fixed_point: Option<f64>) -> Result<Vec<f64>, NumpressError> {
    if let Some(fp) = fixed_point {
        check_header(bytes, CODEC, fp)?;
    }
    SlofCodec::default().decode(bytes)
}
