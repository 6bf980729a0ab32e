//! Dispatch of independent requests across the rayon thread pool.
//!
//! Each request is evaluated start to finish on one worker with its own
//! tables; nothing is shared between requests except read-only inputs.

use num::BigUint;
use rayon::prelude::*;

use super::source::ColumnPairs;
use super::{prod_pow, prod_pow_source, MultiExpConfig};
use crate::utils::check_modulus;
use crate::utils::errors::SpowmError;

/// One self-contained product-of-powers request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProdPowRequest {
    pub bases: Vec<BigUint>,
    pub exponents: Vec<BigUint>,
    pub modulus: BigUint,
}

impl ProdPowRequest {
    pub fn new(bases: Vec<BigUint>, exponents: Vec<BigUint>, modulus: BigUint) -> Self {
        Self {
            bases,
            exponents,
            modulus,
        }
    }
}

/// Evaluates every request in parallel. Results are in request order and a
/// failing request does not affect the others.
#[tracing::instrument(skip_all, fields(num_requests = requests.len()))]
pub fn prod_pow_many(
    requests: &[ProdPowRequest],
    config: &MultiExpConfig,
) -> Vec<Result<BigUint, SpowmError>> {
    requests
        .par_iter()
        .map(|r| prod_pow(&r.bases, &r.exponents, &r.modulus, config))
        .collect()
}

/// For a row-major matrix of bases and one exponent per row, returns
/// `prod_r rows[r][c]^exponents[r] mod modulus` for every column `c`.
///
/// Columns are independent requests and are evaluated in parallel.
#[tracing::instrument(skip_all, fields(num_rows = rows.len()))]
pub fn prod_column_pow(
    rows: &[Vec<BigUint>],
    exponents: &[BigUint],
    modulus: &BigUint,
    config: &MultiExpConfig,
) -> Result<Vec<BigUint>, SpowmError> {
    let Some(first) = rows.first() else {
        return Err(SpowmError::EmptyInput);
    };
    if rows.len() != exponents.len() {
        return Err(SpowmError::InvalidInputLength(rows.len(), exponents.len()));
    }
    let num_columns = first.len();
    if let Some(row) = rows.iter().find(|row| row.len() != num_columns) {
        return Err(SpowmError::InvalidInputLength(num_columns, row.len()));
    }
    check_modulus(modulus)?;
    config.validate()?;

    (0..num_columns)
        .into_par_iter()
        .map(|column| {
            let source = ColumnPairs {
                rows,
                column,
                exponents,
            };
            prod_pow_source(&source, modulus, config)
        })
        .collect()
}
