//! Byte-level entry points.
//!
//! Every buffer is an unsigned big-endian magnitude; an empty buffer is zero.
//! Results are padded with leading zeros to the byte length of the modulus
//! buffer exactly as supplied. Within an array of bases, exponents, or values
//! every entry must have the same byte length.

use num::BigUint;

use crate::codec::{decode, decode_all, encode, encode_into, uniform_width};
use crate::elementwise;
use crate::multiexp::{prod_pow_source, EncodedPairs, MultiExpConfig, Strategy};
use crate::utils::errors::SpowmError;
use crate::utils::math::Math;
use crate::utils::{check_modulus, check_pair_lengths};

fn decode_modulus(modulus: &[u8]) -> Result<BigUint, SpowmError> {
    let modulus = decode(modulus, modulus.len());
    check_modulus(&modulus)?;
    Ok(modulus)
}

/// `prod_i bases[i]^exponents[i] mod modulus` with the windowed single-shot
/// strategy and the default window width.
pub fn spowm<B: AsRef<[u8]>, E: AsRef<[u8]>>(
    bases: &[B],
    exponents: &[E],
    modulus: &[u8],
) -> Result<Vec<u8>, SpowmError> {
    let config = MultiExpConfig::default().with_strategy(Strategy::SingleShot);
    spowm_with_config(bases, exponents, modulus, &config)
}

/// Same contract as [`spowm`], using the bounded-memory batched strategy.
pub fn spowm_batched<B: AsRef<[u8]>, E: AsRef<[u8]>>(
    bases: &[B],
    exponents: &[E],
    modulus: &[u8],
) -> Result<Vec<u8>, SpowmError> {
    let config = MultiExpConfig::default().with_strategy(Strategy::Batched);
    spowm_with_config(bases, exponents, modulus, &config)
}

/// Same contract as [`spowm`], computed with one exponentiation per pair.
pub fn spowm_naive<B: AsRef<[u8]>, E: AsRef<[u8]>>(
    bases: &[B],
    exponents: &[E],
    modulus: &[u8],
) -> Result<Vec<u8>, SpowmError> {
    let config = MultiExpConfig::default().with_strategy(Strategy::Naive);
    spowm_with_config(bases, exponents, modulus, &config)
}

#[tracing::instrument(skip_all, fields(n = bases.len(), strategy = %config.strategy))]
pub fn spowm_with_config<B: AsRef<[u8]>, E: AsRef<[u8]>>(
    bases: &[B],
    exponents: &[E],
    modulus: &[u8],
    config: &MultiExpConfig,
) -> Result<Vec<u8>, SpowmError> {
    let source = EncodedPairs::new(bases, exponents)?;
    let m = decode_modulus(modulus)?;
    let result = prod_pow_source(&source, &m, config)?;
    encode(&result, modulus.len())
}

/// `(a * b) mod modulus`
pub fn mulmod(a: &[u8], b: &[u8], modulus: &[u8]) -> Result<Vec<u8>, SpowmError> {
    let m = decode_modulus(modulus)?;
    let product = elementwise::mul_mod(&decode(a, a.len()), &decode(b, b.len()), &m)?;
    encode(&product, modulus.len())
}

/// Product of all `values` modulo `modulus`.
pub fn mulmod_all<V: AsRef<[u8]>>(values: &[V], modulus: &[u8]) -> Result<Vec<u8>, SpowmError> {
    if values.is_empty() {
        return Err(SpowmError::EmptyInput);
    }
    let width = uniform_width(values, "values")?;
    let m = decode_modulus(modulus)?;
    let product = elementwise::mul_mod_all(&decode_all(values, width), &m)?;
    encode(&product, modulus.len())
}

/// `bases[i]^exponents[i] mod modulus` for every `i`, one padded buffer per index.
pub fn powmod_all<B: AsRef<[u8]>, E: AsRef<[u8]>>(
    bases: &[B],
    exponents: &[E],
    modulus: &[u8],
) -> Result<Vec<Vec<u8>>, SpowmError> {
    check_pair_lengths(bases.len(), exponents.len())?;
    let base_width = uniform_width(bases, "bases")?;
    let exponent_width = uniform_width(exponents, "exponents")?;
    let m = decode_modulus(modulus)?;

    let powers = elementwise::powmod_all(
        &decode_all(bases, base_width),
        &decode_all(exponents, exponent_width),
        &m,
    )?;

    let width = modulus.len();
    let mut out = Vec::new();
    out.try_reserve_exact(powers.len())
        .map_err(|_| SpowmError::AllocationFailure {
            what: "result buffers",
            count: powers.len(),
        })?;
    for power in &powers {
        let mut buf = vec![0u8; width];
        encode_into(power, &mut buf)?;
        out.push(buf);
    }
    Ok(out)
}

/// Bytes needed for one window table of `window_width` entries over `modulus`.
///
/// Lets a caller size batches before choosing between the single-shot and
/// batched strategies.
pub fn table_size_hint(window_width: usize, modulus: &[u8]) -> usize {
    window_width.pow2() * modulus.len()
}
