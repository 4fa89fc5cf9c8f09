//! Codec selection by name, for binding and command-line layers.

use std::fmt;
use std::str::FromStr;

use crate::error::{NumpressError, ParseSchemeError};
use crate::linear::LinearCodec;
use crate::pic::PicCodec;
use crate::safe::SafeCodec;
use crate::slof::SlofCodec;

/// One of the four codecs, with a stable lowercase name.
///
/// # Example
/// ```
/// use msnumpress::{encode_pic, Scheme};
///
/// let scheme: Scheme = "pic".parse().unwrap();
/// assert_eq!(scheme, Scheme::Pic);
/// assert_eq!(scheme.to_string(), "pic");
///
/// let encoded = encode_pic(&[3.0, 4.0]).unwrap();
/// assert_eq!(scheme.decode(&encoded).unwrap(), vec![3.0, 4.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scheme {
    /// Linear prediction with an embedded fixed point.
    Linear,
    /// Rounded non-negative integers.
    Pic,
    /// Short logarithmic floats with an embedded fixed point.
    Slof,
    /// Lossless 8-byte floats.
    Safe,
}

impl Scheme {
    /// Every scheme, in code order.
    pub const ALL: [Scheme; 4] = [Scheme::Linear, Scheme::Pic, Scheme::Slof, Scheme::Safe];

    /// Stable name of the scheme.
    pub const fn name(self) -> &'static str {
        match self {
            Scheme::Linear => "linear",
            Scheme::Pic => "pic",
            Scheme::Slof => "slof",
            Scheme::Safe => "safe",
        }
    }

    /// Worst-case size of `n` values encoded with this scheme's canonical framing.
    pub const fn max_encoded_len(self, n: usize) -> usize {
        match self {
            Scheme::Linear => LinearCodec::new(0.0).max_encoded_len(n),
            Scheme::Pic => PicCodec.max_encoded_len(n),
            Scheme::Slof => SlofCodec::new(0.0).max_encoded_len(n),
            Scheme::Safe => SafeCodec.max_encoded_len(n),
        }
    }

    /// Whether decoding reproduces the input bit for bit.
    pub const fn is_lossless(self) -> bool {
        matches!(self, Scheme::Safe)
    }

    /// Decode a canonical stream produced by this scheme.
    pub fn decode(self, bytes: &[u8]) -> Result<Vec<f64>, NumpressError> {
        match self {
            Scheme::Linear => LinearCodec::default().decode(bytes),
            Scheme::Pic => PicCodec.decode(bytes),
            Scheme::Slof => SlofCodec::default().decode(bytes),
            Scheme::Safe => SafeCodec.decode(bytes),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = ParseSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSchemeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_linear, encode_safe, encode_slof};

    #[test]
    fn test_names_roundtrip() {
        for scheme in Scheme::ALL {
            assert_eq!(scheme.name().parse::<Scheme>().unwrap(), scheme);
            assert_eq!(scheme.to_string(), scheme.name());
        }
        assert_eq!(" Linear ".parse::<Scheme>().unwrap(), Scheme::Linear);
    }

    #[test]
    fn test_unknown_name() {
        let err = "zlib".parse::<Scheme>().unwrap_err();
        assert_eq!(err, ParseSchemeError("zlib".to_string()));
        assert!(err.to_string().contains("zlib"));
    }

    #[test]
    fn test_decode_dispatch() {
        let data = [1.0, 2.0, 3.0];

        let linear = encode_linear(&data, Some(1000.0)).unwrap();
        assert_eq!(Scheme::Linear.decode(&linear).unwrap(), data.to_vec());

        let safe = encode_safe(&data);
        assert_eq!(Scheme::Safe.decode(&safe).unwrap(), data.to_vec());

        let slof = encode_slof(&data, 3000.0).unwrap();
        assert_eq!(Scheme::Slof.decode(&slof).unwrap().len(), 3);

        assert!(matches!(
            Scheme::Linear.decode(&safe[..5]),
            Err(NumpressError::StreamTooShort { .. })
        ));
    }

    #[test]
    fn test_max_encoded_len() {
        assert_eq!(Scheme::Linear.max_encoded_len(4), 25);
        assert_eq!(Scheme::Pic.max_encoded_len(3), 14);
        assert_eq!(Scheme::Slof.max_encoded_len(3), 14);
        assert_eq!(Scheme::Safe.max_encoded_len(3), 24);
        assert!(Scheme::Safe.is_lossless());
        assert!(!Scheme::Pic.is_lossless());
    }
}
