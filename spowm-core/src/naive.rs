use num::BigUint;
use num_traits::One;

use crate::utils::errors::SpowmError;
use crate::utils::{check_modulus, check_pair_lengths};

/// `prod_i bases[i]^exponents[i] mod modulus`, one modular exponentiation per pair.
///
/// No tables are built. This is the reference the windowed strategies are
/// checked against, and the cheapest option when there are only one or two pairs.
#[tracing::instrument(skip_all, fields(n = bases.len()))]
pub fn prod_pow_naive(
    bases: &[BigUint],
    exponents: &[BigUint],
    modulus: &BigUint,
) -> Result<BigUint, SpowmError> {
    check_pair_lengths(bases.len(), exponents.len())?;
    check_modulus(modulus)?;
    Ok(bases
        .iter()
        .zip(exponents)
        .fold(BigUint::one() % modulus, |acc, (base, exponent)| {
            (acc * base.modpow(exponent, modulus)) % modulus
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn big(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    #[test]
    fn small_products() {
        let m = BigUint::from(7u32);
        assert_eq!(
            prod_pow_naive(&big(&[3, 5]), &big(&[2, 3]), &m).unwrap(),
            BigUint::from(5u32)
        );
        assert_eq!(
            prod_pow_naive(&big(&[2, 3, 4]), &big(&[5, 1, 2]), &BigUint::from(13u32)).unwrap(),
            BigUint::from(2u32)
        );
    }

    #[test]
    fn zero_exponents_give_one() {
        let m = BigUint::from(11u32);
        assert_eq!(
            prod_pow_naive(&big(&[4, 9, 10]), &big(&[0, 0, 0]), &m).unwrap(),
            BigUint::one()
        );
        assert!(prod_pow_naive(&big(&[4]), &big(&[0]), &BigUint::one())
            .unwrap()
            .is_zero());
    }

    #[test]
    fn zero_base_annihilates() {
        let m = BigUint::from(11u32);
        assert!(prod_pow_naive(&big(&[4, 0, 10]), &big(&[3, 1, 2]), &m)
            .unwrap()
            .is_zero());
        // 0^0 = 1
        assert_eq!(
            prod_pow_naive(&big(&[0, 2]), &big(&[0, 3]), &m).unwrap(),
            BigUint::from(8u32)
        );
    }

    #[test]
    fn rejects_invalid_requests() {
        let m = BigUint::from(11u32);
        assert_eq!(
            prod_pow_naive(&[], &[], &m).unwrap_err(),
            SpowmError::EmptyInput
        );
        assert_eq!(
            prod_pow_naive(&big(&[1]), &big(&[1]), &BigUint::zero()).unwrap_err(),
            SpowmError::ZeroModulus
        );
    }
}
