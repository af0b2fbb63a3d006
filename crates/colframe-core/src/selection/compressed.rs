//! Roaring bitmap backing for sparse or large selections.

use croaring::Bitmap;

use super::RowSet;

#[derive(Clone, Debug, PartialEq)]
pub struct CompressedSelection {
    bitmap: Bitmap,
}

impl Default for CompressedSelection {
    fn default() -> Self {
        Self {
            bitmap: Bitmap::new(),
        }
    }
}

impl CompressedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[u32]) -> Self {
        Self {
            bitmap: Bitmap::of(rows),
        }
    }

    pub fn from_bitmap(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn and_inplace(&mut self, other: &CompressedSelection) {
        self.bitmap.and_inplace(&other.bitmap);
    }

    pub fn or_inplace(&mut self, other: &CompressedSelection) {
        self.bitmap.or_inplace(&other.bitmap);
    }

    pub fn and_not_inplace(&mut self, other: &CompressedSelection) {
        self.bitmap.andnot_inplace(&other.bitmap);
    }

    /// Convert long runs to run containers.
    pub fn optimize(&mut self) {
        self.bitmap.run_optimize();
    }

    pub fn iter(&self) -> croaring::bitmap::BitmapIterator<'_> {
        self.bitmap.iter()
    }
}

impl RowSet for CompressedSelection {
    fn add(&mut self, row: u32) {
        self.bitmap.add(row);
    }

    fn add_range(&mut self, start: u32, end: u32) {
        if start < end {
            self.bitmap.add_range(start..end);
        }
    }

    fn remove(&mut self, row: u32) {
        self.bitmap.remove(row);
    }

    fn remove_range(&mut self, start: u32, end: u32) {
        if start < end {
            self.bitmap.remove_range(start..end);
        }
    }

    fn flip(&mut self, start: u32, end: u32) {
        if start < end {
            self.bitmap.flip_inplace(start..end);
        }
    }

    fn contains(&self, row: u32) -> bool {
        self.bitmap.contains(row)
    }

    fn len(&self) -> usize {
        self.bitmap.cardinality() as usize
    }

    fn clear(&mut self) {
        self.bitmap.clear();
    }

    fn select(&self, rank: usize) -> Option<u32> {
        let rank = u32::try_from(rank).ok()?;
        self.bitmap.select(rank)
    }

    fn max(&self) -> Option<u32> {
        self.bitmap.maximum()
    }

    fn to_vec(&self) -> Vec<u32> {
        self.bitmap.to_vec()
    }
}
