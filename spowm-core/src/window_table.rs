use num::BigUint;
use num_traits::{One, Zero};

use crate::utils::errors::SpowmError;
use crate::utils::math::Math;

/// Largest supported window width; a table of this width holds 2^16 entries.
pub const MAX_WINDOW_WIDTH: usize = 16;

pub(crate) fn check_window_width(width: usize) -> Result<(), SpowmError> {
    if width == 0 || width > MAX_WINDOW_WIDTH {
        return Err(SpowmError::InvalidWindowWidth {
            width,
            max: MAX_WINDOW_WIDTH,
        });
    }
    Ok(())
}

/// Products of every subset of a block of `width` bases, reduced modulo `modulus`.
///
/// `query(mask)` is the product of the bases whose index bit is set in `mask`,
/// with base `j` of the block selected by bit `2^j`. A table is allocated once and
/// may be precomputed again for any number of base sets of the same width.
#[derive(Debug, Clone)]
pub struct WindowTable<'a> {
    width: usize,
    modulus: &'a BigUint,
    entries: Vec<BigUint>,
}

impl<'a> WindowTable<'a> {
    /// Allocates storage for `2^width` entries. Entries read as zero until
    /// [`Self::precompute`] is called.
    pub fn new(width: usize, modulus: &'a BigUint) -> Result<Self, SpowmError> {
        check_window_width(width)?;
        if modulus.is_zero() {
            return Err(SpowmError::ZeroModulus);
        }

        let len = width.pow2();
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(len)
            .map_err(|_| SpowmError::AllocationFailure {
                what: "table entries",
                count: len,
            })?;
        entries.resize(len, BigUint::zero());

        Ok(Self {
            width,
            modulus,
            entries,
        })
    }

    /// Fills the table from `bases`, overwriting any previous contents.
    ///
    /// Every non-trivial entry is the product of the entry with its lowest set
    /// bit cleared and the single-base entry for that bit, so the whole table
    /// costs `2^width - width - 1` modular multiplications.
    #[tracing::instrument(skip_all, name = "WindowTable::precompute", fields(width = self.width))]
    pub fn precompute(&mut self, bases: &[BigUint]) -> Result<(), SpowmError> {
        if bases.len() != self.width {
            return Err(SpowmError::InvalidInputLength(self.width, bases.len()));
        }

        let modulus = self.modulus;
        self.entries[0] = BigUint::one() % modulus;
        for (j, base) in bases.iter().enumerate() {
            self.entries[1 << j] = base % modulus;
        }

        for mask in 3..self.entries.len() {
            let low = mask & mask.wrapping_neg();
            if low == mask {
                continue;
            }
            let product = &self.entries[mask ^ low] * &self.entries[low];
            self.entries[mask] = product % modulus;
        }
        Ok(())
    }

    /// Shrinks the table to a narrower width, keeping its storage.
    ///
    /// Used for the final, narrower block of a request. The contents must be
    /// precomputed again before they are queried.
    pub fn narrow(&mut self, width: usize) -> Result<(), SpowmError> {
        if width == 0 || width > self.width {
            return Err(SpowmError::InvalidWindowWidth {
                width,
                max: self.width,
            });
        }
        self.width = width;
        self.entries.truncate(width.pow2());
        Ok(())
    }

    /// Product of the bases selected by `mask`.
    ///
    /// # Panics
    /// If `mask >= 2^width`.
    #[inline]
    pub fn query(&self, mask: usize) -> &BigUint {
        &self.entries[mask]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
