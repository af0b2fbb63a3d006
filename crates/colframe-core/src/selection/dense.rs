//! Bit-vector backing for selections over small or dense universes.

use super::RowSet;

/// A growable bit vector. Bit `i` set means row `i` is selected.
///
/// Bits are little-endian within each `u64` word. The vector grows on demand, so
/// there is no fixed capacity; trailing words may be zero.
#[derive(Clone, Debug, Default)]
pub struct DenseSelection {
    words: Vec<u64>,
    ones: usize,
}

impl DenseSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty selection with room for `bits` rows.
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            ones: 0,
        }
    }

    pub fn from_rows(rows: impl IntoIterator<Item = u32>) -> Self {
        let mut dense = Self::new();
        for row in rows {
            dense.add(row);
        }
        dense
    }

    fn ensure_words(&mut self, word_len: usize) {
        if self.words.len() < word_len {
            self.words.resize(word_len, 0);
        }
    }

    fn recount(&mut self) {
        self.ones = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Apply `f` to every word that overlaps `[start, end)`, passing the mask of
    /// bits inside the range.
    fn for_range_words(&mut self, start: u32, end: u32, mut f: impl FnMut(&mut u64, u64)) {
        if start >= end {
            return;
        }
        let (start, end) = (start as usize, end as usize);
        self.ensure_words(end.div_ceil(64));
        let first = start / 64;
        let last = (end - 1) / 64;
        for index in first..=last {
            let lo = if index == first { start % 64 } else { 0 };
            let hi = if index == last { (end - 1) % 64 } else { 63 };
            let mask = (u64::MAX >> (63 - hi)) & (u64::MAX << lo);
            f(&mut self.words[index], mask);
        }
        self.recount();
    }

    pub fn and_inplace(&mut self, other: &DenseSelection) {
        for (index, word) in self.words.iter_mut().enumerate() {
            *word &= other.words.get(index).copied().unwrap_or(0);
        }
        self.recount();
    }

    pub fn or_inplace(&mut self, other: &DenseSelection) {
        self.ensure_words(other.words.len());
        for (word, rhs) in self.words.iter_mut().zip(&other.words) {
            *word |= rhs;
        }
        self.recount();
    }

    pub fn and_not_inplace(&mut self, other: &DenseSelection) {
        for (word, rhs) in self.words.iter_mut().zip(&other.words) {
            *word &= !rhs;
        }
        self.recount();
    }

    pub fn iter(&self) -> DenseIter<'_> {
        DenseIter {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl RowSet for DenseSelection {
    fn add(&mut self, row: u32) {
        let row = row as usize;
        self.ensure_words(row / 64 + 1);
        let mask = 1u64 << (row % 64);
        let word = &mut self.words[row / 64];
        if *word & mask == 0 {
            *word |= mask;
            self.ones += 1;
        }
    }

    fn add_range(&mut self, start: u32, end: u32) {
        self.for_range_words(start, end, |word, mask| *word |= mask);
    }

    fn remove(&mut self, row: u32) {
        let row = row as usize;
        if let Some(word) = self.words.get_mut(row / 64) {
            let mask = 1u64 << (row % 64);
            if *word & mask != 0 {
                *word &= !mask;
                self.ones -= 1;
            }
        }
    }

    fn remove_range(&mut self, start: u32, end: u32) {
        self.for_range_words(start, end, |word, mask| *word &= !mask);
    }

    fn flip(&mut self, start: u32, end: u32) {
        self.for_range_words(start, end, |word, mask| *word ^= mask);
    }

    fn contains(&self, row: u32) -> bool {
        let row = row as usize;
        self.words
            .get(row / 64)
            .is_some_and(|word| (word >> (row % 64)) & 1 == 1)
    }

    fn len(&self) -> usize {
        self.ones
    }

    fn clear(&mut self) {
        self.words.clear();
        self.ones = 0;
    }

    fn select(&self, rank: usize) -> Option<u32> {
        if rank >= self.ones {
            return None;
        }
        let mut remaining = rank;
        for (index, &word) in self.words.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if remaining < ones {
                let mut word = word;
                for _ in 0..remaining {
                    word &= word - 1;
                }
                return Some((index * 64) as u32 + word.trailing_zeros());
            }
            remaining -= ones;
        }
        None
    }

    fn max(&self) -> Option<u32> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, word)| **word != 0)
            .map(|(index, word)| (index * 64) as u32 + (63 - word.leading_zeros()))
    }

    fn to_vec(&self) -> Vec<u32> {
        let mut rows = Vec::with_capacity(self.ones);
        rows.extend(self.iter());
        rows
    }
}

/// Ascending iterator over the set bits of a [`DenseSelection`].
#[derive(Clone, Debug)]
pub struct DenseIter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for DenseIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros();
                self.current &= self.current - 1;
                return Some((self.index * 64) as u32 + bit);
            }
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_contains() {
        let mut dense = DenseSelection::new();
        dense.add(3);
        dense.add(64);
        dense.add(3);
        assert_eq!(dense.len(), 2);
        assert!(dense.contains(64));
        assert!(!dense.contains(1_000));
        dense.remove(3);
        dense.remove(999);
        assert_eq!(dense.to_vec(), vec![64]);
    }

    #[test]
    fn test_ranges_across_words() {
        let mut dense = DenseSelection::new();
        dense.add_range(60, 130);
        assert_eq!(dense.len(), 70);
        assert_eq!(dense.select(0), Some(60));
        assert_eq!(dense.select(69), Some(129));
        assert_eq!(dense.select(70), None);
        dense.remove_range(64, 128);
        assert_eq!(dense.to_vec(), vec![60, 61, 62, 63, 128, 129]);
        dense.flip(62, 66);
        assert_eq!(dense.to_vec(), vec![60, 61, 64, 65, 128, 129]);
        assert_eq!(dense.max(), Some(129));
    }

    #[test]
    fn test_inplace_ops_with_different_lengths() {
        let mut a = DenseSelection::from_rows([1, 3, 5, 200]);
        let b = DenseSelection::from_rows([3, 5, 7]);
        a.and_inplace(&b);
        assert_eq!(a.to_vec(), vec![3, 5]);

        let mut c = DenseSelection::from_rows([1]);
        c.or_inplace(&DenseSelection::from_rows([500]));
        assert_eq!(c.to_vec(), vec![1, 500]);

        c.and_not_inplace(&DenseSelection::from_rows([1]));
        assert_eq!(c.to_vec(), vec![500]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_empty() {
        let dense = DenseSelection::with_capacity_bits(128);
        assert!(dense.is_empty());
        assert_eq!(dense.iter().next(), None);
        assert_eq!(dense.max(), None);
    }
}
