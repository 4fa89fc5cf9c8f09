//! Linear-prediction codec for smooth, monotone-ish arrays such as m/z values.
//!
//! Values are scaled to fixed-point integers with `round(value * fixed_point)`.
//! The first two become raw seeds, and every later value is stored as the
//! residual against the second-order extrapolation `2 * prev - prev_prev`,
//! written with the nibble integer code.
//!
//! ## Encoding Format
//!
//! - Fixed point (8 bytes, f64 LE), omitted with [`Framing::OutOfBand`]
//! - Seeds (0-2 x 4 bytes, i32 LE)
//! - Residuals (packed nibbles, zero padded to a whole byte)
//!
//! Arrays of zero, one or two values produce only the header and seeds.

use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::error::NumpressError;
use crate::fixed_point::{
    check_header, fits_i64, fixed_point_header, optimal_linear_fixed_point, read_header,
    validate, Framing, DEFAULT_LINEAR_FIXED_POINT,
};
use crate::nibble::{NibbleCursor, NibblePack, MAX_INT_NIBBLES};

/// Bytes per raw seed.
const SEED_LEN: usize = 4;

/// Number of raw seeds before residual coding starts.
const SEED_COUNT: usize = 2;

const CODEC: &str = "linear";

/// Linear-prediction compressor/decompressor.
///
/// The codec is a plain configuration value; it holds no per-call state and
/// can be shared freely across threads.
///
/// # Example
/// ```
/// use msnumpress::LinearCodec;
///
/// let codec = LinearCodec::new(100_000.0);
/// let data = vec![100.0, 200.0, 300.00005, 400.00010];
/// let encoded = codec.encode(&data).unwrap();
/// let decoded = codec.decode(&encoded).unwrap();
/// for (orig, dec) in data.iter().zip(decoded.iter()) {
///     assert!((orig - dec).abs() < 5e-6);
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearCodec {
    fixed_point: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    framing: Framing,
}

impl Default for LinearCodec {
    fn default() -> Self {
        LinearCodec::new(DEFAULT_LINEAR_FIXED_POINT)
    }
}

impl LinearCodec {
    /// Create a codec with the given fixed point and an embedded header.
    ///
    /// The fixed point is validated when the codec is used.
    pub const fn new(fixed_point: f64) -> Self {
        LinearCodec {
            fixed_point,
            framing: Framing::Embedded,
        }
    }

    /// Create a codec with the largest fixed point that cannot overflow on `data`.
    ///
    /// Falls back to [`DEFAULT_LINEAR_FIXED_POINT`] for empty data.
    pub fn optimal(data: &[f64]) -> Self {
        let fixed_point = optimal_linear_fixed_point(data);
        if fixed_point > 0.0 {
            LinearCodec::new(fixed_point)
        } else {
            LinearCodec::default()
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

    /// Worst-case encoded size of `n` values.
    pub const fn max_encoded_len(&self, n: usize) -> usize {
        let seeds = if n < SEED_COUNT { n } else { SEED_COUNT };
        let residuals = n - seeds;
        self.framing.header_len() + seeds * SEED_LEN + (residuals * MAX_INT_NIBBLES + 1) / 2
    }

    /// Encode `data`.
    ///
    /// # Errors
    /// - [`NumpressError::InvalidFixedPoint`] if the fixed point is not finite and positive.
    /// - [`NumpressError::Overflow64`] if a scaled value is not finite or leaves the `i64` range.
    /// - [`NumpressError::Overflow32`] if a seed or residual leaves the `i32` range; a smaller
    ///   fixed point may succeed.
    pub fn encode(&self, data: &[f64]) -> Result<Vec<u8>, NumpressError> {
        let fp = validate(self.fixed_point)?;
        let mut pack = NibblePack::<Vec<u8>>::with_capacity(self.max_encoded_len(data.len()));

        if self.framing == Framing::Embedded {
            pack.write_bytes(&fixed_point_header(fp));
        }

        let mut window = [0i64; SEED_COUNT];
        for (index, (&value, slot)) in data.iter().zip(window.iter_mut()).enumerate() {
            let fixed = to_fixed(value, fp, index)?;
            let seed = i32::try_from(fixed).map_err(|_| {
                debug!(index, seed = fixed, "linear seed exceeds i32");
                NumpressError::Overflow32 {
                    index,
                    residual: fixed,
                }
            })?;
            pack.write_bytes(&seed.to_le_bytes());
            *slot = fixed;
        }

        for (index, &value) in data.iter().enumerate().skip(SEED_COUNT) {
            let fixed = to_fixed(value, fp, index)?;
            let extrapol = 2 * window[1] as i128 - window[0] as i128;
            let diff = fixed as i128 - extrapol;
            let diff = i32::try_from(diff).map_err(|_| {
                let residual = diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
                debug!(index, residual, "linear residual exceeds i32");
                NumpressError::Overflow32 { index, residual }
            })?;
            pack.write_int(diff);
            window = [window[1], fixed];
        }

        let out = pack.into_vec();
        trace!(values = data.len(), bytes = out.len(), "linear encode");
        Ok(out)
    }

    /// Decode a stream into a vector.
    ///
    /// With [`Framing::Embedded`] the fixed point comes from the stream header
    /// and the configured one is ignored; use [`decode_linear`] to check it.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
        let decoder = self.decoder(bytes)?;
        let mut out = Vec::with_capacity(decoder.size_hint().1.unwrap_or(0));
        for value in decoder {
            out.push(value?);
        }
        trace!(bytes = bytes.len(), values = out.len(), "linear decode");
        Ok(out)
    }

    /// Start a lazy decode of `bytes`.
    ///
    /// The header and seeds are checked up front; residual errors surface
    /// from the iterator after the valid prefix has been yielded.
    ///
    /// # Example
    /// ```
    /// use msnumpress::{LinearCodec, NumpressError};
    ///
    /// let codec = LinearCodec::new(100_000.0);
    /// let mut encoded = codec.encode(&[100.0, 200.0, 300.00005, 1234.56789]).unwrap();
    /// encoded.pop();
    ///
    /// let mut decoder = codec.decoder(&encoded).unwrap();
    /// assert_eq!(decoder.next(), Some(Ok(100.0)));
    /// assert_eq!(decoder.next(), Some(Ok(200.0)));
    /// assert!(decoder.next().unwrap().is_ok());
    /// assert!(matches!(decoder.next(), Some(Err(NumpressError::StreamCorrupt { .. }))));
    /// assert_eq!(decoder.next(), None);
    /// ```
    pub fn decoder<'a>(&self, bytes: &'a [u8]) -> Result<LinearDecoder<'a>, NumpressError> {
        let (fixed_point, body_start) = match self.framing {
            Framing::Embedded => (read_header(bytes, CODEC)?, self.framing.header_len()),
            Framing::OutOfBand => (validate(self.fixed_point)?, 0),
        };
        LinearDecoder::new(bytes, body_start, fixed_point)
    }
}

/// Scale `value` and round it into an `i64`.
#[inline]
fn to_fixed(value: f64, fixed_point: f64, index: usize) -> Result<i64, NumpressError> {
    let scaled = value * fixed_point;
    if !fits_i64(scaled) {
        debug!(index, scaled, "linear value exceeds i64");
        return Err(NumpressError::Overflow64 {
            index,
            value: scaled,
        });
    }
    Ok(scaled.round() as i64)
}

/// Lazy decoder over a linear stream.
///
/// Yields reconstructed values in order. After the first error it yields
/// `None`, so the values seen before the error are exactly the valid prefix.
#[derive(Clone, Debug)]
pub struct LinearDecoder<'a> {
    pack: NibblePack<&'a [u8]>,
    fixed_point: f64,
    seeds: usize,
    window: [i64; SEED_COUNT],
    emitted: usize,
    done: bool,
}

impl<'a> LinearDecoder<'a> {
    fn new(bytes: &'a [u8], body_start: usize, fixed_point: f64) -> Result<Self, NumpressError> {
        let body = &bytes[body_start..];
        let seeds = match body.len() {
            0 => 0,
            4 => 1,
            n if n >= SEED_COUNT * SEED_LEN => SEED_COUNT,
            n => {
                let expected = body_start + (n / SEED_LEN + 1) * SEED_LEN;
                debug!(expected, actual = bytes.len(), "linear seeds truncated");
                return Err(NumpressError::StreamTooShort {
                    codec: CODEC,
                    expected,
                    actual: bytes.len(),
                });
            }
        };

        let mut window = [0i64; SEED_COUNT];
        for (slot, raw) in window.iter_mut().zip(body.chunks_exact(SEED_LEN)).take(seeds) {
            *slot = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as i64;
        }

        let mut pack = NibblePack::new(bytes);
        pack.with_cursor(NibbleCursor::new(body_start + seeds * SEED_LEN));

        Ok(LinearDecoder {
            pack,
            fixed_point,
            seeds,
            window,
            emitted: 0,
            done: false,
        })
    }

    /// The fixed point the values are divided by.
    pub fn fixed_point(&self) -> f64 {
        self.fixed_point
    }

    /// Number of values yielded so far.
    pub fn decoded(&self) -> usize {
        self.emitted
    }

    fn fail(&mut self, err: NumpressError) -> Option<Result<f64, NumpressError>> {
        self.done = true;
        let err = err.with_decoded(self.emitted);
        debug!(error = %err, "linear decode stopped");
        Some(Err(err))
    }
}

impl Iterator for LinearDecoder<'_> {
    type Item = Result<f64, NumpressError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.emitted < self.seeds {
            let value = self.window[self.emitted];
            self.emitted += 1;
            return Some(Ok(value as f64 / self.fixed_point));
        }

        let at = self.pack.cursor();
        let diff = match self.pack.next_int() {
            None => {
                self.done = true;
                return None;
            }
            Some(Err(err)) => return self.fail(err),
            Some(Ok(diff)) => diff,
        };

        let [prev_prev, prev] = self.window;
        let next = prev
            .checked_mul(2)
            .and_then(|e| e.checked_sub(prev_prev))
            .and_then(|e| e.checked_add(diff as i64));
        let Some(next) = next else {
            return self.fail(NumpressError::StreamCorrupt {
                offset: at.offset,
                half: at.half,
                decoded: 0,
            });
        };

        self.window = [prev, next];
        self.emitted += 1;
        Some(Ok(next as f64 / self.fixed_point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let seeds_left = self.seeds - self.emitted.min(self.seeds);
        let nibbles_left = (self.pack.as_slice().len() * 2)
            .saturating_sub(self.pack.cursor().position());
        (seeds_left, Some(seeds_left + nibbles_left))
    }
}

impl FusedIterator for LinearDecoder<'_> {}

/// Encode `data` with the linear codec and an embedded header.
///
/// With `None` the largest overflow-safe fixed point for `data` is used.
///
/// # Example
/// ```
/// use msnumpress::{decode_linear, encode_linear};
///
/// let data = [100.0, 200.0, 300.00005, 400.00010];
/// let encoded = encode_linear(&data, Some(100_000.0)).unwrap();
/// assert_eq!(encoded.len(), 18);
/// assert_eq!(&encoded[..8], &100_000.0f64.to_le_bytes());
///
/// let decoded = decode_linear(&encoded, None).unwrap();
/// assert_eq!(decoded.len(), 4);
/// ```
pub fn encode_linear(data: &[f64], fixed_point: Option<f64>) -> Result<Vec<u8>, NumpressError> {
    let codec = match fixed_point {
        Some(fp) => LinearCodec::new(fp),
        None => LinearCodec::optimal(data),
    };
    codec.encode(data)
}

/// Decode a linear stream with an embedded header.
///
/// With `Some(fp)` the header must equal `fp`, otherwise
/// [`NumpressError::FixedPointMismatch`] is returned. Headerless streams are
/// decoded with a [`LinearCodec`] using [`Framing::OutOfBand`].
pub fn decode_linear(bytes: &[u8], fixed_point: Option<f64>) -> Result<Vec<f64>, NumpressError> {
    if let Some(fp) = fixed_point {
        check_header(bytes, CODEC, fp)?;
    }
    LinearCodec::default().decode(bytes)
}
