use crate::nibble::{decode_int, encode_int, NibbleCursor, NibblePack};
use crate::{
    decode_linear, decode_pic, decode_safe, decode_slof, encode_linear, encode_pic, encode_safe,
    encode_slof, optimal_linear_fixed_point, LinearCodec, PicCodec, SlofCodec,
    DEFAULT_SLOF_FIXED_POINT,
};
use proptest::prelude::*;

/// Fixed point used by the bounded-error properties.
const FP: f64 = 100_000.0;

prop_compose! {
    /// Values whose seeds and second differences fit i32 at `FP`
    fn arb_linear_data()(
        data in prop::collection::vec(-5_000.0f64..5_000.0, 0..300),
    ) -> Vec<f64> {
        data
    }
}

prop_compose! {
    /// Values with a wide spread, encoded with the optimal fixed point
    fn arb_wide_data()(
        data in prop::collection::vec(-1e6f64..1e6, 0..300),
    ) -> Vec<f64> {
        data
    }
}

prop_compose! {
    fn arb_counts()(
        counts in prop::collection::vec(0u32..u32::MAX, 0..300),
    ) -> Vec<f64> {
        counts.into_iter().map(f64::from).collect()
    }
}

prop_compose! {
    fn arb_intensities()(
        data in prop::collection::vec(0.0f64..1e8, 0..300),
    ) -> Vec<f64> {
        data
    }
}

proptest! {
    /// Property: every i32 survives the nibble code, and the cursor lands after its nibbles
    #[test]
    fn prop_int_roundtrip(x in any::<i32>()) {
        let nibbles = encode_int(x);
        let mut pack = NibblePack::<Vec<u8>>::default();
        pack.write_int(x);
        let bytes = pack.into_vec();

        let (value, next) = decode_int(&bytes, NibbleCursor::new(0)).unwrap();
        prop_assert_eq!(value, x);
        prop_assert_eq!(next.position(), nibbles.len());
    }

    /// Property: a sequence of integers decodes back in order
    #[test]
    fn prop_int_sequence_roundtrip(values in prop::collection::vec(any::<i32>(), 0..200)) {
        let mut pack = NibblePack::<Vec<u8>>::default();
        for &v in &values {
            pack.write_int(v);
        }
        let bytes = pack.into_vec();

        let mut reader = NibblePack::<&[u8]>::new(&bytes);
        let mut decoded = Vec::with_capacity(values.len());
        while let Some(v) = reader.next_int() {
            decoded.push(v.unwrap());
        }
        prop_assert_eq!(decoded, values);
    }

    /// Property: linear error is at most half a fixed-point unit
    #[test]
    fn prop_linear_error_bound(data in arb_linear_data()) {
        let encoded = encode_linear(&data, Some(FP)).unwrap();
        let decoded = decode_linear(&encoded, Some(FP)).unwrap();

        prop_assert_eq!(decoded.len(), data.len());
        for (orig, dec) in data.iter().zip(decoded.iter()) {
            prop_assert!((orig - dec).abs() <= 0.5 / FP + 1e-9, "orig={}, dec={}", orig, dec);
        }
    }

    /// Property: the optimal fixed point never overflows and stays within its own bound
    #[test]
    fn prop_linear_optimal_never_overflows(data in arb_wide_data()) {
        let encoded = encode_linear(&data, None).unwrap();
        let decoded = decode_linear(&encoded, None).unwrap();

        prop_assert_eq!(decoded.len(), data.len());
        if !data.is_empty() {
            let fp = optimal_linear_fixed_point(&data);
            for (orig, dec) in data.iter().zip(decoded.iter()) {
                prop_assert!((orig - dec).abs() <= 0.5 / fp + orig.abs() * 1e-15);
            }
        }
    }

    /// Property: counts round-trip exactly
    #[test]
    fn prop_pic_exact(data in arb_counts()) {
        let decoded = decode_pic(&encode_pic(&data).unwrap()).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// Property: slof error is relative above 1 and absolute below
    #[test]
    fn prop_slof_error_bound(data in arb_intensities()) {
        let encoded = encode_slof(&data, DEFAULT_SLOF_FIXED_POINT).unwrap();
        let decoded = decode_slof(&encoded, None).unwrap();

        prop_assert_eq!(decoded.len(), data.len());
        for (orig, dec) in data.iter().zip(decoded.iter()) {
            let tol = 5e-4 * orig.max(1.0);
            prop_assert!((orig - dec).abs() < tol, "orig={}, dec={}", orig, dec);
        }
    }

    /// Property: safe decoding is bit exact
    #[test]
    fn prop_safe_bit_exact(data in prop::collection::vec(any::<f64>(), 0..300)) {
        let decoded = decode_safe(&encode_safe(&data)).unwrap();
        let bits: Vec<u64> = decoded.iter().map(|v| v.to_bits()).collect();
        let expected: Vec<u64> = data.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(bits, expected);
    }

    /// Property: re-encoding decoded values is a fixed point of the round trip
    #[test]
    fn prop_idempotent_reencoding(data in arb_linear_data()) {
        let codec = LinearCodec::new(FP);
        let first = codec.decode(&codec.encode(&data).unwrap()).unwrap();
        let mut current = first.clone();
        for _ in 0..5 {
            current = codec.decode(&codec.encode(&current).unwrap()).unwrap();
        }
        prop_assert_eq!(&current, &first);

        let slof = SlofCodec::default();
        let magnitudes: Vec<f64> = data.iter().map(|v| v.abs()).collect();
        let first = slof.decode(&slof.encode(&magnitudes).unwrap()).unwrap();
        let mut current = first.clone();
        for _ in 0..5 {
            current = slof.decode(&slof.encode(&current).unwrap()).unwrap();
        }
        prop_assert_eq!(&current, &first);
    }

    /// Property: encoded sizes respect the advertised bounds
    #[test]
    fn prop_size_bounds(data in arb_linear_data()) {
        let n = data.len();

        let linear = LinearCodec::new(FP);
        prop_assert!(linear.encode(&data).unwrap().len() <= linear.max_encoded_len(n));

        let counts: Vec<f64> = data.iter().map(|v| v.abs()).collect();
        prop_assert!(encode_pic(&counts).unwrap().len() <= PicCodec.max_encoded_len(n));

        prop_assert_eq!(encode_slof(&counts, DEFAULT_SLOF_FIXED_POINT).unwrap().len(), 8 + 2 * n);
        prop_assert_eq!(encode_safe(&data).len(), 8 * n);
    }

    /// Property: a truncated stream never decodes to as many values as the original
    #[test]
    fn prop_truncation_never_silent_full_length(
        data in prop::collection::vec(0.0f64..1e6, 1..100),
        cut in 1usize..4,
    ) {
        let linear = encode_linear(&data, Some(1_000.0)).unwrap();
        let keep = linear.len().saturating_sub(cut);
        if let Ok(decoded) = decode_linear(&linear[..keep], None) {
            prop_assert!(decoded.len() < data.len());
        }

        let pic = encode_pic(&data).unwrap();
        let keep = pic.len().saturating_sub(cut);
        if let Ok(decoded) = decode_pic(&pic[..keep]) {
            prop_assert!(decoded.len() < data.len());
        }

        let slof = encode_slof(&data, DEFAULT_SLOF_FIXED_POINT).unwrap();
        let keep = slof.len() - cut;
        if let Ok(decoded) = decode_slof(&slof[..keep], None) {
            prop_assert!(decoded.len() < data.len());
        }
    }

    /// Property: arbitrary bytes never panic any decoder
    #[test]
    fn prop_decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = decode_linear(&bytes, None);
        let _ = decode_pic(&bytes);
        let _ = decode_slof(&bytes, None);
        let _ = decode_safe(&bytes);
    }
}
