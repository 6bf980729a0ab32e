//! Unwindowed batch operations. They double as the oracle the windowed
//! engine is tested against.

use num::BigUint;
use num_traits::One;

use crate::utils::errors::SpowmError;
use crate::utils::{check_modulus, check_pair_lengths};

/// `(a * b) mod modulus`
pub fn mul_mod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> Result<BigUint, SpowmError> {
    check_modulus(modulus)?;
    Ok((a * b) % modulus)
}

/// Product of all `values` modulo `modulus`, accumulated left to right.
#[tracing::instrument(skip_all, fields(n = values.len()))]
pub fn mul_mod_all(values: &[BigUint], modulus: &BigUint) -> Result<BigUint, SpowmError> {
    if values.is_empty() {
        return Err(SpowmError::EmptyInput);
    }
    check_modulus(modulus)?;
    Ok(values
        .iter()
        .fold(BigUint::one() % modulus, |acc, v| (acc * v) % modulus))
}

/// `bases[i] ^ exponents[i] mod modulus` for every `i`, each computed independently.
#[tracing::instrument(skip_all, fields(n = bases.len()))]
pub fn powmod_all(
    bases: &[BigUint],
    exponents: &[BigUint],
    modulus: &BigUint,
) -> Result<Vec<BigUint>, SpowmError> {
    check_pair_lengths(bases.len(), exponents.len())?;
    check_modulus(modulus)?;
    Ok(bases
        .iter()
        .zip(exponents)
        .map(|(base, exponent)| base.modpow(exponent, modulus))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn big(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    #[test]
    fn mul_mod_reduces() {
        let m = BigUint::from(7u32);
        assert_eq!(
            mul_mod(&BigUint::from(5u32), &BigUint::from(6u32), &m).unwrap(),
            BigUint::from(2u32)
        );
        assert_eq!(
            mul_mod(&BigUint::one(), &BigUint::one(), &BigUint::zero()).unwrap_err(),
            SpowmError::ZeroModulus
        );
    }

    #[test]
    fn mul_mod_all_products() {
        let m = BigUint::from(1_000_000_007u64);
        assert_eq!(
            mul_mod_all(&big(&[2, 3, 5, 7]), &m).unwrap(),
            BigUint::from(210u32)
        );
        assert_eq!(
            mul_mod_all(&big(&[9]), &BigUint::from(4u32)).unwrap(),
            BigUint::one()
        );
        assert!(mul_mod_all(&big(&[9]), &BigUint::one()).unwrap().is_zero());
        assert_eq!(
            mul_mod_all(&[], &m).unwrap_err(),
            SpowmError::EmptyInput
        );
    }

    #[test]
    fn powmod_all_is_elementwise() {
        let m = BigUint::from(7u32);
        let powers = powmod_all(&big(&[3, 5, 0, 4]), &big(&[2, 3, 4, 0]), &m).unwrap();
        assert_eq!(powers, big(&[2, 6, 0, 1]));

        assert_eq!(
            powmod_all(&big(&[3, 5]), &big(&[2]), &m).unwrap_err(),
            SpowmError::InvalidInputLength(2, 1)
        );
    }
}
