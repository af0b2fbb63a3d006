//! Row-index algebra.
//!
//! A [`Selection`] is an ordered set of distinct row indices. It is the result
//! of every filter and the input of [`Table::where_`](crate::Table::where_).
//! Selections carry no reference to a table; one is valid against any table with
//! at least `max() + 1` rows.
//!
//! Two backings implement [`RowSet`]: a dense bit vector, used when the universe
//! is small or densely selected, and a roaring bitmap otherwise. Results never
//! depend on the backing; binary operations between different backings convert
//! the right-hand side first.

mod compressed;
mod dense;

pub use compressed::CompressedSelection;
pub use dense::{DenseIter, DenseSelection};

use rand::Rng;

use crate::config::SelectionPolicy;
use crate::error::{Error, Result};

/// Operations shared by both selection backings.
pub trait RowSet {
    fn add(&mut self, row: u32);

    /// Add every row in `[start, end)`.
    fn add_range(&mut self, start: u32, end: u32);

    fn remove(&mut self, row: u32);

    /// Remove every row in `[start, end)`.
    fn remove_range(&mut self, start: u32, end: u32);

    /// Complement membership of every row in `[start, end)`.
    fn flip(&mut self, start: u32, end: u32);

    fn contains(&self, row: u32) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// The `rank`-th smallest member, 0-based.
    fn select(&self, rank: usize) -> Option<u32>;

    fn max(&self) -> Option<u32>;

    /// Members in ascending order.
    fn to_vec(&self) -> Vec<u32>;
}

/// An ordered set of row indices.
#[derive(Clone, Debug)]
pub enum Selection {
    Dense(DenseSelection),
    Compressed(CompressedSelection),
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    /// An empty selection with the compressed backing.
    pub fn new() -> Self {
        Selection::Compressed(CompressedSelection::new())
    }

    /// An empty selection with the dense backing.
    pub fn new_dense() -> Self {
        Selection::Dense(DenseSelection::new())
    }

    /// A selection holding exactly `rows`.
    pub fn with(rows: &[u32]) -> Self {
        Selection::Compressed(CompressedSelection::from_rows(rows))
    }

    /// A selection holding `[start, end)`.
    pub fn with_range(start: u32, end: u32) -> Self {
        let mut selection = Self::new();
        selection.add_range(start, end);
        selection
    }

    /// `[total_start, total_end)` minus `[excluded_start, excluded_end)`.
    pub fn without_range(total_start: u32, total_end: u32, excluded_start: u32, excluded_end: u32) -> Self {
        let mut selection = Self::with_range(total_start, total_end);
        selection.remove_range(excluded_start, excluded_end);
        selection
    }

    /// Build from ascending rows out of a universe of `universe` rows, choosing
    /// the backing with the default [`SelectionPolicy`].
    pub fn from_sorted_rows(rows: &[u32], universe: usize) -> Self {
        Self::from_sorted_rows_with(rows, universe, &SelectionPolicy::default())
    }

    pub fn from_sorted_rows_with(rows: &[u32], universe: usize, policy: &SelectionPolicy) -> Self {
        if policy.prefers_dense(rows.len(), universe) {
            let mut dense = DenseSelection::with_capacity_bits(universe);
            for &row in rows {
                dense.add(row);
            }
            Selection::Dense(dense)
        } else {
            Selection::Compressed(CompressedSelection::from_rows(rows))
        }
    }

    /// `n` distinct rows drawn uniformly from `[0, max)`.
    pub fn select_n_at_random<R: Rng + ?Sized>(n: usize, max: u32, rng: &mut R) -> Result<Self> {
        if n > max as usize {
            return Err(Error::invalid(format!(
                "cannot select {n} distinct rows from {max}"
            )));
        }
        let mut rows: Vec<u32> = rand::seq::index::sample(rng, max as usize, n)
            .into_iter()
            .map(|row| row as u32)
            .collect();
        rows.sort_unstable();
        Ok(Self::from_sorted_rows(&rows, max as usize))
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, Selection::Dense(_))
    }

    fn row_set(&self) -> &dyn RowSet {
        match self {
            Selection::Dense(dense) => dense,
            Selection::Compressed(compressed) => compressed,
        }
    }

    fn row_set_mut(&mut self) -> &mut dyn RowSet {
        match self {
            Selection::Dense(dense) => dense,
            Selection::Compressed(compressed) => compressed,
        }
    }

    pub fn add(&mut self, row: u32) -> &mut Self {
        self.row_set_mut().add(row);
        self
    }

    pub fn add_range(&mut self, start: u32, end: u32) -> &mut Self {
        self.row_set_mut().add_range(start, end);
        self
    }

    pub fn remove(&mut self, row: u32) -> &mut Self {
        self.row_set_mut().remove(row);
        self
    }

    pub fn remove_range(&mut self, start: u32, end: u32) -> &mut Self {
        self.row_set_mut().remove_range(start, end);
        self
    }

    pub fn flip(&mut self, start: u32, end: u32) -> &mut Self {
        self.row_set_mut().flip(start, end);
        self
    }

    pub fn contains(&self, row: u32) -> bool {
        self.row_set().contains(row)
    }

    pub fn len(&self) -> usize {
        self.row_set().len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_set().is_empty()
    }

    pub fn clear(&mut self) {
        self.row_set_mut().clear();
    }

    pub fn max(&self) -> Option<u32> {
        self.row_set().max()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.row_set().to_vec()
    }

    /// The `k`-th smallest member.
    pub fn get(&self, k: usize) -> Result<u32> {
        self.row_set()
            .select(k)
            .ok_or_else(|| Error::out_of_range(k, self.len()))
    }

    pub fn iter(&self) -> SelectionIter<'_> {
        match self {
            Selection::Dense(dense) => SelectionIter::Dense(dense.iter()),
            Selection::Compressed(compressed) => SelectionIter::Compressed(compressed.iter()),
        }
    }

    /// The same members with the dense backing.
    pub fn to_dense(&self) -> DenseSelection {
        match self {
            Selection::Dense(dense) => dense.clone(),
            Selection::Compressed(compressed) => DenseSelection::from_rows(compressed.iter()),
        }
    }

    /// The same members with the compressed backing.
    pub fn to_compressed(&self) -> CompressedSelection {
        match self {
            Selection::Dense(dense) => CompressedSelection::from_rows(&dense.to_vec()),
            Selection::Compressed(compressed) => compressed.clone(),
        }
    }

    /// Keep only rows also in `other`.
    pub fn and(&mut self, other: &Selection) -> &mut Self {
        match (&mut *self, other) {
            (Selection::Dense(lhs), Selection::Dense(rhs)) => lhs.and_inplace(rhs),
            (Selection::Dense(lhs), rhs) => lhs.and_inplace(&rhs.to_dense()),
            (Selection::Compressed(lhs), Selection::Compressed(rhs)) => lhs.and_inplace(rhs),
            (Selection::Compressed(lhs), rhs) => lhs.and_inplace(&rhs.to_compressed()),
        }
        self
    }

    /// Add every row of `other`.
    pub fn or(&mut self, other: &Selection) -> &mut Self {
        match (&mut *self, other) {
            (Selection::Dense(lhs), Selection::Dense(rhs)) => lhs.or_inplace(rhs),
            (Selection::Dense(lhs), rhs) => lhs.or_inplace(&rhs.to_dense()),
            (Selection::Compressed(lhs), Selection::Compressed(rhs)) => lhs.or_inplace(rhs),
            (Selection::Compressed(lhs), rhs) => lhs.or_inplace(&rhs.to_compressed()),
        }
        self
    }

    /// Remove every row of `other`.
    pub fn and_not(&mut self, other: &Selection) -> &mut Self {
        match (&mut *self, other) {
            (Selection::Dense(lhs), Selection::Dense(rhs)) => lhs.and_not_inplace(rhs),
            (Selection::Dense(lhs), rhs) => lhs.and_not_inplace(&rhs.to_dense()),
            (Selection::Compressed(lhs), Selection::Compressed(rhs)) => lhs.and_not_inplace(rhs),
            (Selection::Compressed(lhs), rhs) => lhs.and_not_inplace(&rhs.to_compressed()),
        }
        self
    }

    pub fn intersection(&self, other: &Selection) -> Selection {
        let mut result = self.clone();
        result.and(other);
        result
    }

    pub fn union(&self, other: &Selection) -> Selection {
        let mut result = self.clone();
        result.or(other);
        result
    }

    pub fn difference(&self, other: &Selection) -> Selection {
        let mut result = self.clone();
        result.and_not(other);
        result
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Selection::Compressed(lhs), Selection::Compressed(rhs)) => lhs == rhs,
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}

impl Eq for Selection {}

impl FromIterator<u32> for Selection {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for row in iter {
            selection.add(row);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = u32;
    type IntoIter = SelectionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`Selection`].
pub enum SelectionIter<'a> {
    Dense(DenseIter<'a>),
    Compressed(croaring::bitmap::BitmapIterator<'a>),
}

impl Iterator for SelectionIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            SelectionIter::Dense(iter) => iter.next(),
            SelectionIter::Compressed(iter) => iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn both(rows: &[u32]) -> [Selection; 2] {
        [
            Selection::from_sorted_rows_with(rows, 1 << 20, &SelectionPolicy::always_dense()),
            Selection::from_sorted_rows_with(rows, 1 << 20, &SelectionPolicy::always_compressed()),
        ]
    }

    #[test]
    fn test_and_example() {
        let mut a = Selection::with(&[1, 3, 5]);
        a.and(&Selection::with(&[3, 5, 7]));
        assert_eq!(a.to_vec(), vec![3, 5]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_cross_backing_equivalence() {
        let left = [1, 2, 3, 64, 65, 300, 70_000];
        let right = [2, 3, 4, 65, 1_000, 70_000];
        for lhs in both(&left) {
            for rhs in both(&right) {
                assert_eq!(lhs.intersection(&rhs).to_vec(), vec![2, 3, 65, 70_000]);
                assert_eq!(
                    lhs.union(&rhs).to_vec(),
                    vec![1, 2, 3, 4, 64, 65, 300, 1_000, 70_000]
                );
                assert_eq!(lhs.difference(&rhs).to_vec(), vec![1, 64, 300]);
            }
        }
    }

    #[test]
    fn test_algebra_laws() {
        let [dense, compressed] = both(&[0, 9, 17, 4_000]);
        let other = Selection::with(&[9, 10]);
        for a in [dense, compressed] {
            assert!(a.intersection(&other).len() <= a.len().min(other.len()));
            assert!(a.union(&other).len() >= a.len().max(other.len()));
            assert!(a.difference(&a).is_empty());
            assert_eq!(a.union(&a), a);
        }
    }

    #[test]
    fn test_fluent_chain_mutates_receiver() {
        let mut a = Selection::with_range(0, 10);
        a.and(&Selection::with_range(5, 20))
            .or(&Selection::with(&[100]))
            .and_not(&Selection::with(&[6]));
        assert_eq!(a.to_vec(), vec![5, 7, 8, 9, 100]);
    }

    #[test]
    fn test_equality_ignores_backing() {
        let [dense, compressed] = both(&[4, 8, 15, 16, 23, 42]);
        assert!(dense.is_dense());
        assert!(!compressed.is_dense());
        assert_eq!(dense, compressed);
        assert_ne!(dense, Selection::with(&[4]));
    }

    #[test]
    fn test_get_is_kth_smallest() {
        for selection in both(&[5, 10, 200]) {
            assert_eq!(selection.get(0).unwrap(), 5);
            assert_eq!(selection.get(2).unwrap(), 200);
            assert!(matches!(
                selection.get(3),
                Err(Error::OutOfRange { index: 3, len: 3 })
            ));
        }
    }

    #[test]
    fn test_flip_and_ranges() {
        for mut selection in both(&[1, 2]) {
            selection.flip(0, 4);
            assert_eq!(selection.to_vec(), vec![0, 3]);
        }
        assert_eq!(Selection::without_range(0, 6, 2, 4).to_vec(), vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_iter_is_restartable() {
        let selection = Selection::with(&[2, 4, 6]);
        let first: Vec<u32> = selection.iter().collect();
        let second: Vec<u32> = (&selection).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_density_policy_choice() {
        let small = Selection::from_sorted_rows(&[1, 2, 3], 10);
        assert!(small.is_dense());
        let sparse = Selection::from_sorted_rows(&[1, 2, 3], 1_000_000);
        assert!(!sparse.is_dense());
        let rows: Vec<u32> = (0..500_000).collect();
        assert!(Selection::from_sorted_rows(&rows, 1_000_000).is_dense());
    }

    #[test]
    fn test_select_n_at_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let selection = Selection::select_n_at_random(10, 50, &mut rng).unwrap();
        assert_eq!(selection.len(), 10);
        assert!(selection.iter().all(|row| row < 50));
        assert!(Selection::select_n_at_random(51, 50, &mut rng).is_err());
        assert_eq!(Selection::select_n_at_random(50, 50, &mut rng).unwrap().len(), 50);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut selection: Selection = [3, 1, 2].into_iter().collect();
        selection.remove(2);
        assert_eq!(selection.to_vec(), vec![1, 3]);
        selection.clear();
        assert!(selection.is_empty());
        assert_eq!(selection.max(), None);
    }
}
