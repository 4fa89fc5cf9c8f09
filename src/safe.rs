//! Lossless pass-through codec: every value as 8 little-endian bytes.
//!
//! The fallback when no fixed point is safe for the data. Bit patterns,
//! including NaN payloads and signed zeros, survive unchanged.

use tracing::{debug, trace};

use crate::error::NumpressError;

/// Bytes per encoded value.
const VALUE_LEN: usize = 8;

/// Lossless compressor/decompressor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SafeCodec;

impl SafeCodec {
    /// Exact encoded size of `n` values.
    pub const fn max_encoded_len(&self, n: usize) -> usize {
        VALUE_LEN * n
    }

    /// Encode `data`; this cannot fail.
    pub fn encode(&self, data: &[f64]) -> Vec<u8> {
        let out: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        trace!(values = data.len(), bytes = out.len(), "safe encode");
        out
    }

    /// Decode a stream whose length is a multiple of 8.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
        let values = bytes.chunks_exact(VALUE_LEN);
        let dangling = values.remainder().len();
        if dangling != 0 {
            let err = NumpressError::StreamCorrupt {
                offset: bytes.len() - dangling,
                half: false,
                decoded: bytes.len() / VALUE_LEN,
            };
            debug!(error = %err, "safe stream has a partial value");
            return Err(err);
        }

        let out: Vec<f64> = values
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect();
        trace!(bytes = bytes.len(), values = out.len(), "safe decode");
        Ok(out)
    }
}

/// Encode `data` losslessly.
///
/// # Example
/// ```
/// use msnumpress::{decode_safe, encode_safe};
///
/// let data = [1.0, -0.0, f64::MAX, f64::NAN];
/// let encoded = encode_safe(&data);
/// assert_eq!(encoded.len(), 32);
///
/// let decoded = decode_safe(&encoded).unwrap();
/// assert_eq!(decoded[2], f64::MAX);
/// assert!(decoded[3].is_nan());
/// ```
pub fn encode_safe(data: &[f64]) -> Vec<u8> {
    SafeCodec.encode(data)
}

/// Decode a lossless stream.
pub fn decode_safe(bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
    SafeCodec.decode(bytes)
}
