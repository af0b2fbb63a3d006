//! Composite grouping keys.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::column::Column;

/// One code per grouping column. Equal codes mean equal cell values within
/// the column that produced them, and missing cells get a code of their own.
pub type GroupKey = SmallVec<[u64; 4]>;

/// Turns rows of a fixed set of columns into [`GroupKey`]s.
///
/// Columns with a stable per-row code (numbers, temporals, booleans and
/// dictionary strings) are keyed directly; plain strings are interned here.
pub(crate) struct KeyEncoder<'a> {
    columns: Vec<&'a Column>,
    interners: Vec<FxHashMap<&'a str, u64>>,
}

impl<'a> KeyEncoder<'a> {
    pub(crate) fn new(columns: Vec<&'a Column>) -> Self {
        let interners = columns.iter().map(|_| FxHashMap::default()).collect();
        Self { columns, interners }
    }

    pub(crate) fn key(&mut self, row: usize) -> GroupKey {
        let mut key = GroupKey::with_capacity(self.columns.len());
        for (column, interner) in self.columns.iter().zip(self.interners.iter_mut()) {
            key.push(cell_code(*column, row, interner));
        }
        key
    }
}

fn cell_code<'a>(column: &'a Column, row: usize, interner: &mut FxHashMap<&'a str, u64>) -> u64 {
    if let Some(bits) = column.key_bits(row) {
        return bits;
    }
    let text = match column {
        Column::String(c) => c.get(row).unwrap_or(""),
        _ => "",
    };
    let next = interner.len() as u64;
    *interner.entry(text).or_insert(next)
}

/// Each cell replaced by a small ordinal shared by equal values, with missing
/// cells as NaN. Lets counting reductions run over columns that have no
/// numeric representation.
pub(crate) fn ordinal_codes(column: &Column) -> Vec<f64> {
    let mut encoder = KeyEncoder::new(vec![column]);
    let mut ordinals: FxHashMap<u64, f64> = FxHashMap::default();
    (0..column.len())
        .map(|row| {
            if column.is_missing(row) {
                return f64::NAN;
            }
            let code = encoder.key(row)[0];
            let next = ordinals.len() as f64;
            *ordinals.entry(code).or_insert(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_for_dictionary_and_plain_strings_agree() {
        let values = ["a", "b", "a", "", "b"];
        let dict = Column::string("d", &values);
        let plain = Column::text("p", &values);
        let mut by_dict = KeyEncoder::new(vec![&dict]);
        let mut by_plain = KeyEncoder::new(vec![&plain]);
        let dict_keys: Vec<GroupKey> = (0..5).map(|row| by_dict.key(row)).collect();
        let plain_keys: Vec<GroupKey> = (0..5).map(|row| by_plain.key(row)).collect();
        for a in 0..5 {
            for b in 0..5 {
                assert_eq!(dict_keys[a] == dict_keys[b], plain_keys[a] == plain_keys[b]);
            }
        }
    }

    #[test]
    fn test_composite_key() {
        let team = Column::string("team", &["red", "red", "blue"]);
        let year = Column::int32("year", &[2020, 2021, 2020]);
        let mut encoder = KeyEncoder::new(vec![&team, &year]);
        let keys: Vec<GroupKey> = (0..3).map(|row| encoder.key(row)).collect();
        assert_eq!(keys[0].len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
    }

    #[test]
    fn test_ordinal_codes() {
        let column = Column::text("t", &["x", "y", "", "x"]);
        let codes = ordinal_codes(&column);
        assert_eq!(codes[0], 0.0);
        assert_eq!(codes[1], 1.0);
        assert!(codes[2].is_nan());
        assert_eq!(codes[3], 0.0);
    }
}
