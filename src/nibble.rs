//! Half-byte packing and the signed run-length integer code.
//!
//! Every integer is written as a count nibble followed by 0-8 value nibbles:
//!
//! | Count nibble | Meaning |
//! |--------------|---------|
//! | `0..=8` | that many leading `0x0` nibbles are implied |
//! | `9..=15` | `count - 8` leading `0xf` nibbles are implied |
//!
//! The remaining `8 - leading` nibbles follow least-significant first. Zero is
//! the single nibble `0x8`, `-1` is `0xf 0xf`, and a value with no collapsible
//! run costs nine nibbles.
//!
//! Nibbles are packed two per byte, high nibble first. A stream that ends on a
//! high nibble is padded with a `0x0` low nibble.

use crate::error::NumpressError;

/// Maximum number of nibbles a single integer occupies.
pub const MAX_INT_NIBBLES: usize = 9;

/// Number of nibbles in a 32-bit integer.
const INT_NIBBLES: usize = 8;

/// Mask selecting the most significant nibble of a 32-bit integer.
const TOP_NIBBLE: u32 = 0xf000_0000;

/// Low nibble value that terminates a stream ending on a half byte.
pub const PAD_NIBBLE: u8 = 0x0;

/// Position of the next nibble in a packed stream.
///
/// `half == false` addresses the high nibble of `offset`, `half == true` the low nibble.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NibbleCursor {
    /// Byte index into the stream.
    pub offset: usize,
    /// Whether the next nibble is the low half of `offset`.
    pub half: bool,
}

impl NibbleCursor {
    /// Cursor at the high nibble of byte `offset`.
    #[inline]
    pub const fn new(offset: usize) -> Self {
        NibbleCursor {
            offset,
            half: false,
        }
    }

    /// Absolute nibble index of this cursor.
    #[inline]
    pub const fn position(&self) -> usize {
        self.offset * 2 + self.half as usize
    }

    /// The cursor one nibble further on.
    #[inline]
    pub const fn advance(self) -> Self {
        if self.half {
            NibbleCursor {
                offset: self.offset + 1,
                half: false,
            }
        } else {
            NibbleCursor {
                offset: self.offset,
                half: true,
            }
        }
    }

    fn corrupt(self) -> NumpressError {
        NumpressError::StreamCorrupt {
            offset: self.offset,
            half: self.half,
            decoded: 0,
        }
    }
}

/// The nibbles of one encoded integer, count nibble first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nibbles {
    buf: [u8; MAX_INT_NIBBLES],
    len: u8,
}

impl Nibbles {
    /// The nibbles as a slice; each element holds a value in `0..=15`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// Number of nibbles, between 1 and 9.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false: every integer needs at least the count nibble.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Encode `x` as 1-9 nibbles.
///
/// # Example
/// ```
/// use msnumpress::nibble::encode_int;
///
/// assert_eq!(encode_int(0).as_slice(), &[0x8]);
/// assert_eq!(encode_int(-1).as_slice(), &[0xf, 0xf]);
/// assert_eq!(encode_int(35).as_slice(), &[0x6, 0x3, 0x2]);
/// ```
pub fn encode_int(x: i32) -> Nibbles {
    let bits = x as u32;
    let init = bits & TOP_NIBBLE;

    let (head, lead) = if init == 0 {
        let lead = (bits.leading_zeros() / 4) as usize;
        (lead as u8, lead)
    } else if init == TOP_NIBBLE {
        // -1 is all ones; at least one value nibble is always emitted
        let lead = ((bits.leading_ones() / 4) as usize).min(INT_NIBBLES - 1);
        (lead as u8 + 8, lead)
    } else {
        (0, 0)
    };

    let mut out = Nibbles {
        buf: [0; MAX_INT_NIBBLES],
        len: (1 + INT_NIBBLES - lead) as u8,
    };
    out.buf[0] = head;
    for i in 0..INT_NIBBLES - lead {
        out.buf[1 + i] = ((bits >> (4 * i)) & 0xf) as u8;
    }
    out
}

#[inline]
fn nibble_at(data: &[u8], cursor: NibbleCursor) -> Option<u8> {
    data.get(cursor.offset)
        .map(|b| if cursor.half { b & 0xf } else { b >> 4 })
}

/// Decode one integer starting at `cursor`.
///
/// Returns the value and the cursor just past it. The whole integer is
/// bounds-checked against `data` before any value nibble is read; a stream
/// that ends inside the integer yields [`NumpressError::StreamCorrupt`]
/// pointing at the count nibble.
///
/// # Example
/// ```
/// use msnumpress::nibble::{decode_int, NibbleCursor};
///
/// let data = [0x75, 0x80];
/// let (first, next) = decode_int(&data, NibbleCursor::new(0)).unwrap();
/// assert_eq!(first, 5);
/// let (second, _) = decode_int(&data, next).unwrap();
/// assert_eq!(second, 0);
/// ```
pub fn decode_int(data: &[u8], cursor: NibbleCursor) -> Result<(i32, NibbleCursor), NumpressError> {
    let head = nibble_at(data, cursor).ok_or_else(|| cursor.corrupt())?;
    let mut next = cursor.advance();

    let (lead, mut value) = if head <= 8 {
        (head as usize, 0u32)
    } else {
        let lead = (head - 8) as usize;
        (lead, !0u32 << (32 - 4 * lead))
    };

    if lead == INT_NIBBLES {
        return Ok((value as i32, next));
    }

    let remaining = INT_NIBBLES - lead;
    if next.position() + remaining > data.len() * 2 {
        return Err(cursor.corrupt());
    }

    for i in 0..remaining {
        let hb = nibble_at(data, next).ok_or_else(|| cursor.corrupt())?;
        value |= (hb as u32) << (4 * i);
        next = next.advance();
    }

    Ok((value as i32, next))
}

/// A nibble packer over a byte buffer.
///
/// Reading works on byte slices, writing on a growable `Vec<u8>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NibblePack<B> {
    buff: B,
    cursor: NibbleCursor,
}

impl<B> NibblePack<B> {
    /// Create a packer positioned at the start of `buff`.
    #[inline]
    pub fn new(buff: B) -> Self {
        NibblePack {
            buff,
            cursor: NibbleCursor::default(),
        }
    }

    /// Current position.
    #[inline]
    pub fn cursor(&self) -> NibbleCursor {
        self.cursor
    }

    /// Move to `cursor`.
    #[inline]
    pub fn with_cursor(&mut self, cursor: NibbleCursor) -> &mut Self {
        self.cursor = cursor;
        self
    }
}

impl<B: AsRef<[u8]>> NibblePack<B> {
    /// Get a reference to the underlying buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.buff.as_ref()
    }
}

// Reading operations for byte slices
impl<'a> NibblePack<&'a [u8]> {
    /// Whether every byte has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor.offset >= self.buff.len()
    }

    /// Whether only the zero pad nibble of the final byte remains.
    #[inline]
    pub fn at_padding(&self) -> bool {
        self.cursor.half
            && self.cursor.offset + 1 == self.buff.len()
            && self.buff[self.cursor.offset] & 0xf == PAD_NIBBLE
    }

    /// Read a single nibble.
    pub fn read_nibble(&mut self) -> Result<u8, NumpressError> {
        let hb = nibble_at(self.buff, self.cursor).ok_or_else(|| self.cursor.corrupt())?;
        self.cursor = self.cursor.advance();
        Ok(hb)
    }

    /// Read one encoded integer.
    #[inline]
    pub fn read_int(&mut self) -> Result<i32, NumpressError> {
        let (value, next) = decode_int(self.buff, self.cursor)?;
        self.cursor = next;
        Ok(value)
    }

    /// Read the next integer, or `None` once the stream (and its padding) is consumed.
    #[inline]
    pub fn next_int(&mut self) -> Option<Result<i32, NumpressError>> {
        if self.is_exhausted() || self.at_padding() {
            return None;
        }
        Some(self.read_int())
    }
}

impl Default for NibblePack<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// Writing operations for growable Vec
impl NibblePack<Vec<u8>> {
    /// Create a packer with pre-allocated capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    /// Write the low four bits of `nibble`.
    #[inline]
    pub fn write_nibble(&mut self, nibble: u8) {
        let nibble = nibble & 0xf;
        if self.cursor.half {
            if let Some(last) = self.buff.last_mut() {
                *last |= nibble;
            }
        } else {
            self.cursor = NibbleCursor::new(self.buff.len());
            self.buff.push(nibble << 4);
        }
        self.cursor = self.cursor.advance();
    }

    /// Write one integer as 1-9 nibbles.
    #[inline]
    pub fn write_int(&mut self, x: i32) {
        for &hb in encode_int(x).as_slice() {
            self.write_nibble(hb);
        }
    }

    /// Write whole bytes, closing a pending half byte with the pad nibble first.
    pub fn write_bytes(&mut self, values: &[u8]) {
        self.buff.extend_from_slice(values);
        self.cursor = NibbleCursor::new(self.buff.len());
    }

    /// Number of bytes written so far, counting a pending half byte.
    #[inline]
    pub fn len(&self) -> usize {
        self.buff.len()
    }

    /// Whether nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buff.is_empty()
    }

    /// Consume the packer and return the bytes; a trailing lone nibble is already zero padded.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buff
    }
}
