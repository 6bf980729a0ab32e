use std::slice;

use num::BigUint;
use num_traits::One;

pub mod config;
pub mod parallel;
pub mod source;

pub use config::{suggested_window_width, MultiExpConfig, Strategy, DEFAULT_WINDOW_WIDTH};
pub use parallel::{prod_column_pow, prod_pow_many, ProdPowRequest};
pub use source::{DecodedPairs, EncodedPairs, PairSource};

use crate::naive::prod_pow_naive;
use crate::utils::check_modulus;
use crate::utils::errors::SpowmError;
use crate::window_table::{check_window_width, WindowTable};

/// `prod_i bases[i]^exponents[i] mod modulus`, evaluated with the strategy
/// selected by `config`.
pub fn prod_pow(
    bases: &[BigUint],
    exponents: &[BigUint],
    modulus: &BigUint,
    config: &MultiExpConfig,
) -> Result<BigUint, SpowmError> {
    let source = DecodedPairs::new(bases, exponents)?;
    prod_pow_source(&source, modulus, config)
}

/// Same as [`prod_pow`], reading pairs from any [`PairSource`].
#[tracing::instrument(skip_all, fields(n = source.len()))]
pub fn prod_pow_source<S: PairSource + ?Sized>(
    source: &S,
    modulus: &BigUint,
    config: &MultiExpConfig,
) -> Result<BigUint, SpowmError> {
    check_modulus(modulus)?;
    config.validate()?;

    let strategy = config.resolve(source.len());
    tracing::debug!(%strategy, window_width = config.window_width, "evaluating product of powers");
    match strategy {
        Strategy::SingleShot => single_shot(source, modulus, config.window_width),
        Strategy::Batched => batched(source, modulus, config.window_width),
        Strategy::Naive => {
            let n = source.len();
            prod_pow_naive(&source.bases(0..n), &source.exponents(0..n), modulus)
        }
        Strategy::Auto => unreachable!("MultiExpConfig::resolve never returns Auto"),
    }
}

/// Tabulates every block up front and runs a single square-and-multiply sweep
/// over all of them, so each squaring is shared by the whole request.
///
/// Memory holds all `N` decoded pairs plus `ceil(N / W)` tables.
#[tracing::instrument(skip_all, fields(n = source.len(), window_width = window_width))]
pub fn single_shot<S: PairSource + ?Sized>(
    source: &S,
    modulus: &BigUint,
    window_width: usize,
) -> Result<BigUint, SpowmError> {
    let n = source.len();
    if n == 0 {
        return Err(SpowmError::EmptyInput);
    }
    check_modulus(modulus)?;
    check_window_width(window_width)?;

    let bases = source.bases(0..n);
    let exponents = source.exponents(0..n);

    let num_blocks = n.div_ceil(window_width);
    let mut tables = Vec::new();
    tables
        .try_reserve_exact(num_blocks)
        .map_err(|_| SpowmError::AllocationFailure {
            what: "window tables",
            count: num_blocks,
        })?;

    // Blocks are full width except possibly the last, which is never empty.
    for block in bases.chunks(window_width) {
        let mut table = WindowTable::new(block.len(), modulus)?;
        table.precompute(block)?;
        tables.push(table);
    }
    tracing::debug!(num_blocks, "precomputed window tables");

    Ok(simultaneous_sweep(&tables, &exponents, window_width, modulus))
}

/// Processes one block at a time with a single reusable table, multiplying
/// each block's partial product into the running result.
///
/// Only one block of pairs is decoded at any moment; the price is that every
/// block repeats its own squarings.
#[tracing::instrument(skip_all, fields(n = source.len(), window_width = window_width))]
pub fn batched<S: PairSource + ?Sized>(
    source: &S,
    modulus: &BigUint,
    window_width: usize,
) -> Result<BigUint, SpowmError> {
    let n = source.len();
    if n == 0 {
        return Err(SpowmError::EmptyInput);
    }
    check_modulus(modulus)?;
    check_window_width(window_width)?;

    let mut table = WindowTable::new(window_width.min(n), modulus)?;
    let mut result = BigUint::one() % modulus;

    for start in (0..n).step_by(window_width) {
        let end = (start + window_width).min(n);
        let bases = source.bases(start..end);
        let exponents = source.exponents(start..end);

        if bases.len() < table.width() {
            table.narrow(bases.len())?;
        }
        table.precompute(&bases)?;

        let partial =
            simultaneous_sweep(slice::from_ref(&table), &exponents, window_width, modulus);
        result = (result * partial) % modulus;
    }
    Ok(result)
}

/// Simultaneous square-and-multiply over `tables`, where `tables[k]` was
/// precomputed from the bases of block `k` and `exponents` holds the matching
/// exponents, `block_width` per block.
///
/// Bits are consumed from the most significant bit of the longest exponent
/// down to bit 0. At each bit the result is squared once, then multiplied by
/// each block's table entry for that bit, in block order.
fn simultaneous_sweep(
    tables: &[WindowTable],
    exponents: &[BigUint],
    block_width: usize,
    modulus: &BigUint,
) -> BigUint {
    debug_assert_eq!(tables.len(), exponents.len().div_ceil(block_width));

    let max_num_bits = exponents.iter().map(|e| e.bits()).max().unwrap_or(0);
    let mut result = BigUint::one() % modulus;

    for index in (0..max_num_bits).rev() {
        result = (&result * &result) % modulus;

        for (table, block) in tables.iter().zip(exponents.chunks(block_width)) {
            let mask = exponent_mask(block, index);
            // entry 0 is the identity
            if mask != 0 {
                result = (result * table.query(mask)) % modulus;
            }
        }
    }
    result
}

/// Bit `index` of every exponent in `block`, packed so that the first exponent
/// lands in the least significant bit.
#[inline]
fn exponent_mask(block: &[BigUint], index: u64) -> usize {
    block
        .iter()
        .rev()
        .fold(0, |mask, e| (mask << 1) | usize::from(e.bit(index)))
}
