use num::BigUint;
use num_traits::Zero;

use errors::SpowmError;

pub mod errors;
pub mod math;

/// Shape check shared by every pairwise operation: at least one pair, and as
/// many exponents as bases.
pub(crate) fn check_pair_lengths(bases: usize, exponents: usize) -> Result<(), SpowmError> {
    if bases == 0 {
        return Err(SpowmError::EmptyInput);
    }
    if bases != exponents {
        return Err(SpowmError::InvalidInputLength(bases, exponents));
    }
    Ok(())
}

pub(crate) fn check_modulus(modulus: &BigUint) -> Result<(), SpowmError> {
    if modulus.is_zero() {
        return Err(SpowmError::ZeroModulus);
    }
    Ok(())
}
