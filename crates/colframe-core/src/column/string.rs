//! String columns, dictionary-encoded or plain.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::ColumnType;
use crate::error::{Error, Result};
use crate::selection::Selection;

const MISSING_CODE: i32 = i32::MIN;

/// Distinct values and their codes. Columns derived by `take` or `subset`
/// share one copy until either side adds a value.
#[derive(Debug, Clone, Default, PartialEq)]
struct Entries {
    code_by_value: FxHashMap<String, i32>,
    values: Vec<String>,
}

/// A per-column dictionary: each distinct string gets an `i32` code.
#[derive(Debug, Clone, Default, PartialEq)]
struct Dictionary {
    codes: Vec<i32>,
    entries: Arc<Entries>,
}

impl Dictionary {
    /// Encode `values`, or `None` when they hold more distinct strings than
    /// there are codes.
    fn encode(values: &[&str]) -> Option<Self> {
        let mut dict = Self {
            codes: Vec::with_capacity(values.len()),
            entries: Arc::default(),
        };
        for value in values {
            let code = dict.code_for(value).ok()?;
            dict.codes.push(code);
        }
        Some(dict)
    }

    fn code_for(&mut self, value: &str) -> Result<i32> {
        if value.is_empty() {
            return Ok(MISSING_CODE);
        }
        if let Some(code) = self.entries.code_by_value.get(value) {
            return Ok(*code);
        }
        let code = i32::try_from(self.entries.values.len())
            .map_err(|_| Error::invalid("dictionary is full"))?;
        let entries = Arc::make_mut(&mut self.entries);
        entries.values.push(value.to_string());
        entries.code_by_value.insert(value.to_string(), code);
        Ok(code)
    }

    fn lookup(&self, code: i32) -> &str {
        if code == MISSING_CODE {
            return "";
        }
        self.entries.values.get(code as usize).map_or("", String::as_str)
    }

    fn with_codes(&self, codes: Vec<i32>) -> Self {
        Self {
            codes,
            entries: Arc::clone(&self.entries),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Dictionary(Dictionary),
    Plain(Vec<String>),
}

/// A named column of strings. The empty string is the missing value.
///
/// The storage choice is fixed at construction: [`StringColumn::dictionary`]
/// (type `String`, for categorical data) or [`StringColumn::plain`] (type `Text`).
/// Both behave identically through the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct StringColumn {
    name: String,
    storage: Storage,
}

impl StringColumn {
    pub fn dictionary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Dictionary(Dictionary::default()),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Plain(Vec::new()),
        }
    }

    /// A dictionary column holding `values`. Falls back to plain storage if
    /// the values outnumber the dictionary codes.
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        match Dictionary::encode(values) {
            Some(dict) => Self {
                name: name.into(),
                storage: Storage::Dictionary(dict),
            },
            None => Self::plain_from_strs(name, values),
        }
    }

    pub fn plain_from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Plain(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn column_type(&self) -> ColumnType {
        match self.storage {
            Storage::Dictionary(_) => ColumnType::String,
            Storage::Plain(_) => ColumnType::Text,
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.storage, Storage::Dictionary(_))
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Dictionary(dict) => dict.codes.len(),
            Storage::Plain(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append(&mut self, value: &str) -> Result<&mut Self> {
        match &mut self.storage {
            Storage::Dictionary(dict) => {
                let code = dict.code_for(value)?;
                dict.codes.push(code);
            }
            Storage::Plain(values) => values.push(value.to_string()),
        }
        Ok(self)
    }

    pub fn append_missing(&mut self) -> &mut Self {
        match &mut self.storage {
            Storage::Dictionary(dict) => dict.codes.push(MISSING_CODE),
            Storage::Plain(values) => values.push(String::new()),
        }
        self
    }

    /// The string at `row`; empty when the row is missing.
    pub fn get(&self, row: usize) -> Result<&str> {
        self.value(row).ok_or_else(|| Error::out_of_range(row, self.len()))
    }

    pub fn get_string(&self, row: usize) -> Result<String> {
        self.get(row).map(str::to_string)
    }

    fn value(&self, row: usize) -> Option<&str> {
        match &self.storage {
            Storage::Dictionary(dict) => dict.codes.get(row).map(|code| dict.lookup(*code)),
            Storage::Plain(values) => values.get(row).map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).map(move |row| self.value(row).unwrap_or(""))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.storage {
            Storage::Dictionary(dict) => dict.codes.get(row) == Some(&MISSING_CODE),
            Storage::Plain(values) => values.get(row).is_some_and(|v| v.is_empty()),
        }
    }

    pub fn set(&mut self, row: usize, value: &str) -> Result<()> {
        let len = self.len();
        match &mut self.storage {
            Storage::Dictionary(dict) => {
                if row >= len {
                    return Err(Error::out_of_range(row, len));
                }
                let code = dict.code_for(value)?;
                dict.codes[row] = code;
            }
            Storage::Plain(values) => {
                let slot = values.get_mut(row).ok_or_else(|| Error::out_of_range(row, len))?;
                *slot = value.to_string();
            }
        }
        Ok(())
    }

    pub fn set_missing(&mut self, row: usize) -> Result<()> {
        self.set(row, "")
    }

    pub fn count_missing(&self) -> usize {
        (0..self.len()).filter(|row| self.is_missing(*row)).count()
    }

    pub fn remove(&mut self, row: usize) -> Result<String> {
        let len = self.len();
        if row >= len {
            return Err(Error::out_of_range(row, len));
        }
        Ok(match &mut self.storage {
            Storage::Dictionary(dict) => {
                let code = dict.codes.remove(row);
                dict.lookup(code).to_string()
            }
            Storage::Plain(values) => values.remove(row),
        })
    }

    pub fn subset(&self, selection: &Selection) -> Result<Self> {
        let rows: Vec<usize> = selection.iter().map(|row| row as usize).collect();
        self.take(&rows)
    }

    pub fn take(&self, rows: &[usize]) -> Result<Self> {
        let len = self.len();
        let storage = match &self.storage {
            Storage::Dictionary(dict) => {
                let codes = rows
                    .iter()
                    .map(|&row| dict.codes.get(row).copied().ok_or_else(|| Error::out_of_range(row, len)))
                    .collect::<Result<Vec<_>>>()?;
                Storage::Dictionary(dict.with_codes(codes))
            }
            Storage::Plain(values) => Storage::Plain(
                rows.iter()
                    .map(|&row| values.get(row).cloned().ok_or_else(|| Error::out_of_range(row, len)))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Self {
            name: self.name.clone(),
            storage,
        })
    }

    pub fn empty_copy(&self) -> Self {
        match self.storage {
            Storage::Dictionary(_) => Self::dictionary(self.name.clone()),
            Storage::Plain(_) => Self::plain(self.name.clone()),
        }
    }

    pub fn unique_count(&self) -> usize {
        match &self.storage {
            Storage::Dictionary(dict) => dict
                .codes
                .iter()
                .filter(|c| **c != MISSING_CODE)
                .collect::<FxHashSet<_>>()
                .len(),
            Storage::Plain(values) => values
                .iter()
                .filter(|v| !v.is_empty())
                .collect::<FxHashSet<_>>()
                .len(),
        }
    }

    /// Dictionary code for `row`, if dictionary-encoded.
    pub(crate) fn code(&self, row: usize) -> Option<i32> {
        match &self.storage {
            Storage::Dictionary(dict) => dict.codes.get(row).copied(),
            Storage::Plain(_) => None,
        }
    }

    /// Rows whose non-missing value satisfies `matches`. Dictionary columns
    /// test each distinct value once.
    pub(crate) fn scan_values(&self, matches: impl Fn(&str) -> bool) -> Selection {
        match &self.storage {
            Storage::Dictionary(dict) => {
                let hits: Vec<bool> = dict.entries.values.iter().map(|v| matches(v)).collect();
                crate::filter::scan(dict.codes.len(), |row| {
                    let code = dict.codes[row];
                    code != MISSING_CODE && hits.get(code as usize).copied().unwrap_or(false)
                })
            }
            Storage::Plain(values) => {
                crate::filter::scan(values.len(), |row| !values[row].is_empty() && matches(&values[row]))
            }
        }
    }

    /// Missing sorts first, then lexicographic order.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match (self.value(a), self.value(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_and_plain_agree() {
        let values = ["a", "b", "", "a"];
        let dict = StringColumn::from_strs("s", &values);
        let plain = StringColumn::plain_from_strs("s", &values);
        assert_eq!(dict.column_type(), ColumnType::String);
        assert_eq!(plain.column_type(), ColumnType::Text);
        for row in 0..values.len() {
            assert_eq!(dict.get(row).unwrap(), plain.get(row).unwrap());
            assert_eq!(dict.is_missing(row), plain.is_missing(row));
        }
        assert_eq!(dict.unique_count(), 2);
        assert_eq!(plain.unique_count(), 2);
        assert_eq!(dict.count_missing(), 1);
    }

    #[test]
    fn test_dictionaries_are_per_column() {
        let mut first = StringColumn::dictionary("a");
        let mut second = StringColumn::dictionary("b");
        first.append("x").unwrap().append("y").unwrap();
        second.append("y").unwrap();
        assert_eq!(first.code(1), Some(1));
        assert_eq!(second.code(0), Some(0));
    }

    #[test]
    fn test_set_and_remove() {
        let mut column = StringColumn::from_strs("s", &["a", "b"]);
        column.set(0, "c").unwrap();
        column.set_missing(1).unwrap();
        assert_eq!(column.get(0).unwrap(), "c");
        assert!(column.is_missing(1));
        assert_eq!(column.remove(0).unwrap(), "c");
        assert_eq!(column.len(), 1);
        assert!(column.set(3, "z").is_err());
    }

    #[test]
    fn test_subset_keeps_encoding() {
        let column = StringColumn::from_strs("s", &["a", "b", "c"]);
        let subset = column.subset(&Selection::with(&[0, 2])).unwrap();
        assert!(subset.is_dictionary());
        assert_eq!(subset.iter().collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(column.take(&[9]).is_err());
    }

    #[test]
    fn test_from_strs_matches_appends() {
        let built = StringColumn::from_strs("s", &["x", "", "y", "x"]);
        let mut appended = StringColumn::dictionary("s");
        for value in ["x", "", "y", "x"] {
            appended.append(value).unwrap();
        }
        assert_eq!(built, appended);
        assert_eq!(built.code(3), Some(0));
        assert!(built.is_missing(1));
    }

    #[test]
    fn test_take_shares_dictionary() {
        let column = StringColumn::from_strs("s", &["a", "b", "c"]);
        let taken = column.take(&[2, 0]).unwrap();
        let subset = column.subset(&Selection::with(&[1])).unwrap();
        let (Storage::Dictionary(source), Storage::Dictionary(t), Storage::Dictionary(u)) =
            (&column.storage, &taken.storage, &subset.storage)
        else {
            panic!("expected dictionary storage");
        };
        assert!(Arc::ptr_eq(&source.entries, &t.entries));
        assert!(Arc::ptr_eq(&source.entries, &u.entries));
        assert_eq!(t.codes, vec![2, 0]);
    }

    #[test]
    fn test_append_after_take_leaves_source_alone() {
        let column = StringColumn::from_strs("s", &["a", "b"]);
        let mut taken = column.take(&[1]).unwrap();
        taken.append("z").unwrap().append("a").unwrap();
        assert_eq!(taken.iter().collect::<Vec<_>>(), vec!["b", "z", "a"]);
        assert_eq!(taken.code(2), Some(0));
        let Storage::Dictionary(source) = &column.storage else {
            panic!("expected dictionary storage");
        };
        assert_eq!(source.entries.values, vec!["a", "b"]);
        assert!(source.entries.code_by_value.get("z").is_none());
        assert_eq!(column.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
