use std::borrow::Cow;
use std::ops::Range;

use num::BigUint;

use crate::codec::{decode_all, uniform_width};
use crate::utils::check_pair_lengths;
use crate::utils::errors::SpowmError;

/// An ordered sequence of (base, exponent) pairs that the engine reads block by block.
///
/// Implementations hand out borrowed slices when the integers already exist and
/// decode on demand otherwise, so a strategy that only asks for one block at a
/// time never holds more than one block of decoded integers.
pub trait PairSource {
    fn len(&self) -> usize;

    fn bases(&self, range: Range<usize>) -> Cow<'_, [BigUint]>;

    fn exponents(&self, range: Range<usize>) -> Cow<'_, [BigUint]>;
}

/// Pairs that are already [`BigUint`]s.
#[derive(Clone, Copy, Debug)]
pub struct DecodedPairs<'a> {
    bases: &'a [BigUint],
    exponents: &'a [BigUint],
}

impl<'a> DecodedPairs<'a> {
    pub fn new(bases: &'a [BigUint], exponents: &'a [BigUint]) -> Result<Self, SpowmError> {
        check_pair_lengths(bases.len(), exponents.len())?;
        Ok(Self { bases, exponents })
    }
}

impl PairSource for DecodedPairs<'_> {
    fn len(&self) -> usize {
        self.bases.len()
    }

    fn bases(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Borrowed(&self.bases[range])
    }

    fn exponents(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Borrowed(&self.exponents[range])
    }
}

/// Pairs given as unsigned big-endian byte buffers, decoded per requested range.
#[derive(Clone, Copy, Debug)]
pub struct EncodedPairs<'a, B, E> {
    bases: &'a [B],
    exponents: &'a [E],
    base_width: usize,
    exponent_width: usize,
}

impl<'a, B: AsRef<[u8]>, E: AsRef<[u8]>> EncodedPairs<'a, B, E> {
    /// Fails unless both arrays are non-empty, equally long, and each uses a
    /// single byte width for all of its entries.
    pub fn new(bases: &'a [B], exponents: &'a [E]) -> Result<Self, SpowmError> {
        check_pair_lengths(bases.len(), exponents.len())?;
        let base_width = uniform_width(bases, "bases")?;
        let exponent_width = uniform_width(exponents, "exponents")?;
        Ok(Self {
            bases,
            exponents,
            base_width,
            exponent_width,
        })
    }

    pub fn base_width(&self) -> usize {
        self.base_width
    }

    pub fn exponent_width(&self) -> usize {
        self.exponent_width
    }
}

impl<B: AsRef<[u8]>, E: AsRef<[u8]>> PairSource for EncodedPairs<'_, B, E> {
    fn len(&self) -> usize {
        self.bases.len()
    }

    fn bases(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Owned(decode_all(&self.bases[range], self.base_width))
    }

    fn exponents(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Owned(decode_all(&self.exponents[range], self.exponent_width))
    }
}

/// Column `column` of a row-major matrix of bases, paired with one exponent per row.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColumnPairs<'a> {
    pub(crate) rows: &'a [Vec<BigUint>],
    pub(crate) column: usize,
    pub(crate) exponents: &'a [BigUint],
}

impl PairSource for ColumnPairs<'_> {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn bases(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Owned(
            self.rows[range]
                .iter()
                .map(|row| row[self.column].clone())
                .collect(),
        )
    }

    fn exponents(&self, range: Range<usize>) -> Cow<'_, [BigUint]> {
        Cow::Borrowed(&self.exponents[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_pairs_borrow() {
        let bases = [1u32, 2, 3].map(BigUint::from);
        let exponents = [4u32, 5, 6].map(BigUint::from);
        let pairs = DecodedPairs::new(&bases, &exponents).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(matches!(pairs.bases(1..3), Cow::Borrowed(_)));
        assert_eq!(pairs.exponents(1..3).as_ref(), &exponents[1..3]);
    }

    #[test]
    fn encoded_pairs_decode_ranges() {
        let bases = vec![vec![0, 1], vec![0, 2], vec![1, 0]];
        let exponents = vec![vec![3], vec![4], vec![5]];
        let pairs = EncodedPairs::new(&bases, &exponents).unwrap();
        assert_eq!(pairs.base_width(), 2);
        assert_eq!(pairs.exponent_width(), 1);
        assert_eq!(
            pairs.bases(1..3).as_ref(),
            &[BigUint::from(2u32), BigUint::from(256u32)]
        );
        assert_eq!(pairs.exponents(0..1).as_ref(), &[BigUint::from(3u32)]);
    }

    #[test]
    fn shape_errors() {
        let empty: Vec<Vec<u8>> = vec![];
        assert_eq!(
            EncodedPairs::new(&empty, &empty).unwrap_err(),
            SpowmError::EmptyInput
        );

        let bases = vec![vec![1u8], vec![2]];
        let exponents = vec![vec![1u8]];
        assert_eq!(
            EncodedPairs::new(&bases, &exponents).unwrap_err(),
            SpowmError::InvalidInputLength(2, 1)
        );

        let ragged = vec![vec![1u8], vec![2, 3]];
        assert!(matches!(
            EncodedPairs::new(&ragged, &bases).unwrap_err(),
            SpowmError::NonUniformWidth { array: "bases", index: 1, .. }
        ));
    }

    #[test]
    fn column_pairs_select_one_column() {
        let rows = vec![
            vec![BigUint::from(1u32), BigUint::from(2u32)],
            vec![BigUint::from(3u32), BigUint::from(4u32)],
        ];
        let exponents = [BigUint::from(9u32), BigUint::from(8u32)];
        let column = ColumnPairs {
            rows: &rows,
            column: 1,
            exponents: &exponents,
        };
        assert_eq!(column.len(), 2);
        assert_eq!(
            column.bases(0..2).as_ref(),
            &[BigUint::from(2u32), BigUint::from(4u32)]
        );
    }
}
