//! Cross-tabulations and pivot tables.

mod crosstab;
mod pivot_table;

pub use crosstab::CrossTab;
pub use pivot_table::PivotTable;

use rustc_hash::FxHashMap;

use crate::aggregate::{GroupKey, KeyEncoder};
use crate::column::Column;

/// The distinct non-missing values of a column, in value order.
pub(crate) struct Levels {
    /// Level of each row; `None` for missing rows.
    pub(crate) of_row: Vec<Option<usize>>,
    /// First row holding each level, indexed by level.
    pub(crate) first_rows: Vec<usize>,
}

impl Levels {
    pub(crate) fn of(column: &Column) -> Self {
        let mut encoder = KeyEncoder::new(vec![column]);
        let mut seen: FxHashMap<GroupKey, usize> = FxHashMap::default();
        let mut first_rows = Vec::new();
        let encounter: Vec<Option<usize>> = (0..column.len())
            .map(|row| {
                if column.is_missing(row) {
                    return None;
                }
                let next = first_rows.len();
                let slot = *seen.entry(encoder.key(row)).or_insert(next);
                if slot == next {
                    first_rows.push(row);
                }
                Some(slot)
            })
            .collect();

        let mut order: Vec<usize> = (0..first_rows.len()).collect();
        order.sort_by(|&a, &b| column.compare_rows(first_rows[a], first_rows[b]));
        let mut rank = vec![0; order.len()];
        for (position, &slot) in order.iter().enumerate() {
            rank[slot] = position;
        }

        Self {
            of_row: encounter.into_iter().map(|slot| slot.map(|s| rank[s])).collect(),
            first_rows: order.iter().map(|&slot| first_rows[slot]).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.first_rows.len()
    }

    /// Display label of each level.
    pub(crate) fn labels(&self, column: &Column) -> crate::error::Result<Vec<String>> {
        self.first_rows.iter().map(|&row| column.get_string(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_value_ordered() {
        let column = Column::int32("n", &[10, 9, i32::MIN, 10, 100]);
        let levels = Levels::of(&column);
        assert_eq!(levels.len(), 3);
        assert_eq!(levels.labels(&column).unwrap(), vec!["9", "10", "100"]);
        assert_eq!(levels.of_row, vec![Some(1), Some(0), None, Some(1), Some(2)]);
    }
}
