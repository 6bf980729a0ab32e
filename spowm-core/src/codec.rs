//! Conversion between unsigned big-endian byte buffers and [`BigUint`].
//!
//! Inputs are accepted at any length (an empty buffer is zero, leading zero
//! bytes are ignored). Outputs are always exactly the requested width,
//! left-padded with zeros; a value that does not fit is an
//! [`SpowmError::EncodingOverflow`], never a truncated buffer.

use num::BigUint;
use num_traits::Zero;

use crate::utils::errors::SpowmError;
use crate::utils::math::byte_len;

/// Interprets `bytes` as an unsigned big-endian magnitude.
///
/// `declared_width` is the byte width the caller declared for the array the
/// buffer came from. It is informational only; no padding is enforced here.
pub fn decode(bytes: &[u8], declared_width: usize) -> BigUint {
    if bytes.len() != declared_width {
        tracing::trace!(
            actual = bytes.len(),
            declared_width,
            "decoding buffer of undeclared width"
        );
    }
    BigUint::from_bytes_be(bytes)
}

/// Decodes every buffer of an array whose width has already been validated.
pub fn decode_all<B: AsRef<[u8]>>(buffers: &[B], declared_width: usize) -> Vec<BigUint> {
    buffers
        .iter()
        .map(|b| decode(b.as_ref(), declared_width))
        .collect()
}

/// Encodes `value` as exactly `width` big-endian bytes.
pub fn encode(value: &BigUint, width: usize) -> Result<Vec<u8>, SpowmError> {
    let mut out = vec![0u8; width];
    encode_into(value, &mut out)?;
    Ok(out)
}

/// Writes `value` into `out`, big-endian and left-padded with zeros.
///
/// On overflow `out` is left untouched.
pub fn encode_into(value: &BigUint, out: &mut [u8]) -> Result<(), SpowmError> {
    let width = out.len();
    let needed = byte_len(value.bits());
    if needed > width {
        tracing::error!(needed, width, "encoded result exceeds output width");
        return Err(SpowmError::EncodingOverflow { needed, width });
    }

    let offset = width - needed;
    out[..offset].fill(0);
    if !value.is_zero() {
        // `to_bytes_be` is minimal for nonzero values, so it is exactly `needed` long
        out[offset..].copy_from_slice(&value.to_bytes_be());
    }
    Ok(())
}

/// Checks that every buffer in `buffers` has the same length and returns it.
///
/// An empty array has width 0.
pub fn uniform_width<B: AsRef<[u8]>>(
    buffers: &[B],
    array: &'static str,
) -> Result<usize, SpowmError> {
    let Some(first) = buffers.first() else {
        return Ok(0);
    };
    let expected = first.as_ref().len();
    match buffers
        .iter()
        .enumerate()
        .find(|(_, b)| b.as_ref().len() != expected)
    {
        Some((index, b)) => Err(SpowmError::NonUniformWidth {
            array,
            index,
            expected,
            actual: b.as_ref().len(),
        }),
        None => Ok(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{RngCore, SeedableRng};

    #[test]
    fn empty_buffer_is_zero() {
        assert!(decode(&[], 0).is_zero());
        assert!(decode(&[0, 0, 0], 3).is_zero());
    }

    #[test]
    fn leading_zeros_are_ignored() {
        assert_eq!(decode(&[0, 0, 1, 2], 4), BigUint::from(0x0102u32));
        assert_eq!(decode(&[1, 2], 2), BigUint::from(0x0102u32));
    }

    #[test]
    fn encode_pads_to_width() {
        assert_eq!(encode(&BigUint::from(5u8), 1).unwrap(), vec![5]);
        assert_eq!(
            encode(&BigUint::from(0x0102u32), 4).unwrap(),
            vec![0, 0, 1, 2]
        );
        assert_eq!(encode(&BigUint::zero(), 3).unwrap(), vec![0, 0, 0]);
        assert_eq!(encode(&BigUint::zero(), 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_overflow_is_reported() {
        let err = encode(&BigUint::from(0x010203u32), 2).unwrap_err();
        assert_eq!(
            err,
            SpowmError::EncodingOverflow {
                needed: 3,
                width: 2
            }
        );
        assert!(encode(&BigUint::from(1u8), 0).is_err());
    }

    #[test]
    fn encode_into_leaves_buffer_on_overflow() {
        let mut out = [0xAA; 2];
        assert!(encode_into(&BigUint::from(0x010000u32), &mut out).is_err());
        assert_eq!(out, [0xAA; 2]);

        encode_into(&BigUint::from(7u8), &mut out).unwrap();
        assert_eq!(out, [0, 7]);
    }

    #[test]
    fn decode_inverts_encode() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        for len in [1usize, 7, 32, 65, 512] {
            let mut bytes = vec![0u8; len];
            rng.fill_bytes(&mut bytes);
            let x = decode(&bytes, len);
            let width = len + (rng.next_u32() % 4) as usize;
            let encoded = encode(&x, width).unwrap();
            assert_eq!(encoded.len(), width);
            assert_eq!(decode(&encoded, width), x);
        }
    }

    #[test]
    fn uniform_width_detects_mismatch() {
        let ok: Vec<Vec<u8>> = vec![vec![1, 2], vec![0, 0], vec![9, 9]];
        assert_eq!(uniform_width(&ok, "bases").unwrap(), 2);

        let empty: Vec<Vec<u8>> = vec![];
        assert_eq!(uniform_width(&empty, "bases").unwrap(), 0);

        let bad: Vec<Vec<u8>> = vec![vec![1, 2], vec![0, 0], vec![9]];
        assert_eq!(
            uniform_width(&bad, "exponents").unwrap_err(),
            SpowmError::NonUniformWidth {
                array: "exponents",
                index: 2,
                expected: 2,
                actual: 1
            }
        );
    }
}
