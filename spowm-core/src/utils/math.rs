/// Table-size arithmetic on window widths.
pub trait Math {
    /// `2^self`, the number of entries in a table of this width.
    fn pow2(self) -> usize;
    /// `ceil(log2(self))`, the width needed to index `self` entries.
    fn log_2(self) -> usize;
}

impl Math for usize {
    #[inline]
    fn pow2(self) -> usize {
        1 << self
    }

    fn log_2(self) -> usize {
        assert_ne!(self, 0);
        (usize::BITS - (self - 1).leading_zeros()) as usize
    }
}

/// Number of bytes in the minimal big-endian encoding of a value with `bits` significant bits.
#[inline]
pub fn byte_len(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}
