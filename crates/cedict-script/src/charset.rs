use bitvec::prelude::*;

type BitSet = BitVec<usize, Lsb0>;

/// A set of characters stored as one bit per code point.
///
/// Sized to the largest code point seen, so lookups past the end are simply
/// absent.
pub(crate) struct CharSet {
    bits: BitSet,
    len: usize,
}

impl CharSet {
    /// Split two character streams into (only in `left`, only in `right`).
    pub(crate) fn exclusive_pair(
        left: impl Iterator<Item = char>,
        right: impl Iterator<Item = char>,
    ) -> (CharSet, CharSet) {
        let left: Vec<char> = left.collect();
        let right: Vec<char> = right.collect();
        let n = left
            .iter()
            .chain(right.iter())
            .map(|&c| c as usize + 1)
            .max()
            .unwrap_or(0);

        let mut left_bits = bitvec![usize, Lsb0; 0; n];
        let mut right_bits = bitvec![usize, Lsb0; 0; n];
        for c in left {
            left_bits.set(c as usize, true);
        }
        for c in right {
            right_bits.set(c as usize, true);
        }

        let mut left_only = left_bits.clone();
        let mask = !right_bits.clone();
        left_only &= &mask;

        let mut right_only = right_bits;
        let mask = !left_bits;
        right_only &= &mask;

        (Self::from_bits(left_only), Self::from_bits(right_only))
    }

    fn from_bits(bits: BitSet) -> Self {
        let len = bits.count_ones();
        Self { bits, len }
    }

    pub(crate) fn contains(&self, c: char) -> bool {
        self.bits.get(c as usize).is_some_and(|bit| *bit)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
