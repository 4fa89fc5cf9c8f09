//! Rounded-integer codec for non-negative counts such as ion intensities.
//!
//! Each value is rounded to the nearest integer and written with the nibble
//! integer code, with no header and no prediction. Counts must round into
//! `[0, 4294967294]`.

use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::error::NumpressError;
use crate::nibble::{NibblePack, MAX_INT_NIBBLES};

/// Largest count the codec accepts.
pub const MAX_COUNT: f64 = 4_294_967_294.0;

/// Rounded-integer compressor/decompressor.
///
/// # Example
/// ```
/// use msnumpress::PicCodec;
///
/// let encoded = PicCodec.encode(&[0.0, 1.0, 2.0]).unwrap();
/// assert_eq!(encoded, vec![0x87, 0x17, 0x20]);
/// assert_eq!(PicCodec.decode(&encoded).unwrap(), vec![0.0, 1.0, 2.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PicCodec;

impl PicCodec {
    /// Worst-case encoded size of `n` values.
    pub const fn max_encoded_len(&self, n: usize) -> usize {
        (n * MAX_INT_NIBBLES + 1) / 2
    }

    /// Encode `data` as rounded counts.
    ///
    /// # Errors
    /// [`NumpressError::CountOutOfRange`] if a value is NaN or rounds outside `[0, 4294967294]`.
    pub fn encode(&self, data: &[f64]) -> Result<Vec<u8>, NumpressError> {
        let mut pack = NibblePack::<Vec<u8>>::with_capacity(self.max_encoded_len(data.len()));

        for (index, &value) in data.iter().enumerate() {
            let count = value.round();
            if !(0.0..=MAX_COUNT).contains(&count) {
                debug!(index, value, "pic count out of range");
                return Err(NumpressError::CountOutOfRange { index, value });
            }
            // reinterpret: the nibble code works on 32-bit patterns
            pack.write_int(count as u32 as i32);
        }

        let out = pack.into_vec();
        trace!(values = data.len(), bytes = out.len(), "pic encode");
        Ok(out)
    }

    /// Decode a stream into a vector.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
        let mut out = Vec::with_capacity(bytes.len());
        for value in self.decoder(bytes) {
            out.push(value?);
        }
        trace!(bytes = bytes.len(), values = out.len(), "pic decode");
        Ok(out)
    }

    /// Start a lazy decode of `bytes`.
    pub fn decoder<'a>(&self, bytes: &'a [u8]) -> PicDecoder<'a> {
        PicDecoder {
            pack: NibblePack::new(bytes),
            emitted: 0,
            done: false,
        }
    }
}

/// Lazy decoder over a pic stream, fused after the first error.
#[derive(Clone, Debug)]
pub struct PicDecoder<'a> {
    pack: NibblePack<&'a [u8]>,
    emitted: usize,
    done: bool,
}

impl PicDecoder<'_> {
    /// Number of values yielded so far.
    pub fn decoded(&self) -> usize {
        self.emitted
    }
}

impl Iterator for PicDecoder<'_> {
    type Item = Result<f64, NumpressError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.pack.next_int() {
            None => {
                self.done = true;
                None
            }
            Some(Ok(count)) => {
                self.emitted += 1;
                Some(Ok(count as u32 as f64))
            }
            Some(Err(err)) => {
                self.done = true;
                let err = err.with_decoded(self.emitted);
                debug!(error = %err, "pic decode stopped");
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let nibbles_left = (self.pack.as_slice().len() * 2)
            .saturating_sub(self.pack.cursor().position());
        (0, Some(nibbles_left))
    }
}

impl FusedIterator for PicDecoder<'_> {}

/// Encode `data` with the rounded-integer codec.
pub fn encode_pic(data: &[f64]) -> Result<Vec<u8>, NumpressError> {
    PicCodec.encode(data)
}

/// Decode a rounded-integer stream.
pub fn decode_pic(bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
    PicCodec.decode(bytes)
}
