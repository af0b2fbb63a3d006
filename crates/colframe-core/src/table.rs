//! Named, ordered collections of equal-length columns.

use std::cmp::Ordering;

use tracing::{debug, instrument};

use crate::column::{Column, Value};
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::selection::Selection;

/// Whether two column names match, ignoring case.
pub(crate) fn same_column_name(a: &str, b: &str) -> bool {
    a == b || a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}

/// A named table. Every column has the same length and column names are
/// unique, ignoring case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of rows; zero for a table with no columns.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    fn check_insertable(&self, column: &Column) -> Result<()> {
        if self.column_index(column.name()).is_some() {
            return Err(Error::DuplicateColumn(column.name().to_string()));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(Error::length_mismatch(self.row_count(), column.len()));
        }
        Ok(())
    }

    pub fn add_column(&mut self, column: impl Into<Column>) -> Result<&mut Self> {
        let column = column.into();
        self.check_insertable(&column)?;
        self.columns.push(column);
        Ok(self)
    }

    pub fn insert_column(&mut self, index: usize, column: impl Into<Column>) -> Result<&mut Self> {
        let column = column.into();
        if index > self.columns.len() {
            return Err(Error::out_of_range(index, self.columns.len() + 1));
        }
        self.check_insertable(&column)?;
        self.columns.insert(index, column);
        Ok(self)
    }

    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let index = self.require_index(name)?;
        Ok(self.columns.remove(index))
    }

    /// Position of the column called `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| same_column_name(c.name(), name))
    }

    fn require_index(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        let index = self.require_index(name)?;
        Ok(&self.columns[index])
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        let index = self.require_index(name)?;
        Ok(&mut self.columns[index])
    }

    pub fn column_at(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::out_of_range(index, self.columns.len()))
    }

    /// The cell at `row` of the column at position `column`.
    pub fn get(&self, row: usize, column: usize) -> Result<Value> {
        self.column_at(column)?.get(row)
    }

    pub fn get_string(&self, row: usize, column: usize) -> Result<String> {
        self.column_at(column)?.get_string(row)
    }

    /// A new table holding copies of the named columns, in the order given.
    pub fn select_columns(&self, names: &[&str]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Table::with_columns(self.name.clone(), columns)
    }

    /// Same name and schema, no rows.
    pub fn empty_copy(&self) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.iter().map(Column::empty_copy).collect(),
        }
    }

    pub fn first(&self, n: usize) -> Result<Table> {
        let end = n.min(self.row_count());
        self.take_rows(&(0..end).collect::<Vec<_>>())
    }

    pub fn last(&self, n: usize) -> Result<Table> {
        let count = self.row_count();
        let start = count - n.min(count);
        self.take_rows(&(start..count).collect::<Vec<_>>())
    }

    /// Rows in `rows` order; every index must be below `row_count`.
    pub(crate) fn take_rows(&self, rows: &[usize]) -> Result<Table> {
        Ok(Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c.take(rows))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// The selected rows, in ascending row order.
    pub fn where_(&self, selection: &Selection) -> Result<Table> {
        let count = self.row_count();
        if let Some(max) = selection.max() {
            if max as usize >= count {
                return Err(Error::length_mismatch(count, max as usize + 1));
            }
        }
        Ok(Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c.subset(selection))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Every row not in `selection`.
    pub fn drop_where(&self, selection: &Selection) -> Result<Table> {
        let mut keep = Selection::with_range(0, self.row_count() as u32);
        keep.and_not(selection);
        self.where_(&keep)
    }

    #[instrument(skip_all, fields(table = %self.name))]
    pub fn filter(&self, filter: &Filter) -> Result<Table> {
        let selection = filter.apply(self)?;
        debug!(rows = self.row_count(), matched = selection.len(), "Filtered table");
        self.where_(&selection)
    }

    /// Rows with no missing value in any column.
    pub fn drop_rows_with_missing(&self) -> Result<Table> {
        let rows: Vec<usize> = (0..self.row_count())
            .filter(|row| !self.columns.iter().any(|c| c.is_missing(*row)))
            .collect();
        self.take_rows(&rows)
    }

    /// Stable sort on one or more columns. A leading `-` sorts that column
    /// descending. Missing values sort first ascending and last descending.
    #[instrument(skip_all, fields(table = %self.name))]
    pub fn sort_on(&self, keys: &[&str]) -> Result<Table> {
        let keys = keys
            .iter()
            .map(|key| match key.strip_prefix('-') {
                Some(name) => Ok((self.column(name)?, true)),
                None => Ok((self.column(key)?, false)),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<usize> = (0..self.row_count()).collect();
        rows.sort_by(|&a, &b| {
            keys.iter()
                .map(|(column, descending)| {
                    let order = column.compare_rows(a, b);
                    if *descending {
                        order.reverse()
                    } else {
                        order
                    }
                })
                .find(|order| *order != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        debug!(rows = rows.len(), keys = keys.len(), "Sorted table");
        self.take_rows(&rows)
    }

    pub fn sort_ascending_on(&self, names: &[&str]) -> Result<Table> {
        self.sort_on(names)
    }

    pub fn sort_descending_on(&self, names: &[&str]) -> Result<Table> {
        let keys: Vec<String> = names.iter().map(|name| format!("-{name}")).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.sort_on(&keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Predicate;

    fn people() -> Table {
        Table::with_columns(
            "people",
            vec![
                Column::string("name", &["Ann", "Bob", "Cid", "Dee", "Eve"]),
                Column::string("team", &["red", "blue", "", "red", "blue"]),
                Column::int32("age", &[31, 25, 40, i32::MIN, 25]),
            ],
        )
        .unwrap()
    }

    fn strings(table: &Table, column: &str) -> Vec<String> {
        let index = table.column_index(column).unwrap();
        (0..table.row_count())
            .map(|row| table.get_string(row, index).unwrap())
            .collect()
    }

    #[test]
    fn test_schema_validation() {
        let mut table = people();
        assert!(matches!(
            table.add_column(Column::int32("AGE", &[1, 2, 3, 4, 5])),
            Err(Error::DuplicateColumn(_))
        ));
        assert!(matches!(
            table.add_column(Column::int32("short", &[1])),
            Err(Error::LengthMismatch { expected: 5, actual: 1 })
        ));
        table.insert_column(0, Column::int32("id", &[1, 2, 3, 4, 5])).unwrap();
        assert_eq!(table.column_names(), vec!["id", "name", "team", "age"]);
        assert_eq!(table.column_index("Team"), Some(2));
        let removed = table.remove_column("id").unwrap();
        assert_eq!(removed.name(), "id");
        assert!(matches!(table.column("nope"), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_names_ignore_non_ascii_case() {
        let mut table = Table::with_columns("t", vec![Column::int32("Größe", &[1, 2])]).unwrap();
        assert_eq!(table.column_index("GRÖSSE"), None);
        assert_eq!(table.column_index("größe"), Some(0));
        assert_eq!(table.column_index("GRÖßE"), Some(0));
        assert!(matches!(
            table.add_column(Column::int32("GRÖßE", &[3, 4])),
            Err(Error::DuplicateColumn(_))
        ));
        table.add_column(Column::int32("Ärger", &[5, 6])).unwrap();
        assert_eq!(table.column("ärger").unwrap().name(), "Ärger");
        assert!(same_column_name("ΣΊΣΥΦΟΣ", "σίσυφοσ"));
        assert!(!same_column_name("a", "ab"));
    }

    #[test]
    fn test_cell_access() {
        let table = people();
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.get(1, 0).unwrap(), Value::String("Bob".into()));
        assert_eq!(table.get(3, 2).unwrap(), Value::Missing);
        assert!(table.get(9, 0).is_err());
        assert!(table.get(0, 9).is_err());
    }

    #[test]
    fn test_where_and_drop_where() {
        let table = people();
        let picked = table.where_(&Selection::with(&[4, 0])).unwrap();
        assert_eq!(strings(&picked, "name"), vec!["Ann", "Eve"]);
        let dropped = table.drop_where(&Selection::with(&[0, 1])).unwrap();
        assert_eq!(strings(&dropped, "name"), vec!["Cid", "Dee", "Eve"]);
        assert!(matches!(
            table.where_(&Selection::with(&[5])),
            Err(Error::LengthMismatch { expected: 5, actual: 6 })
        ));
    }

    #[test]
    fn test_filter() {
        let table = people();
        let young = table
            .filter(&Filter::column("age", Predicate::less_than(30)))
            .unwrap();
        assert_eq!(strings(&young, "name"), vec!["Bob", "Eve"]);
    }

    #[test]
    fn test_first_last_and_select() {
        let table = people();
        assert_eq!(strings(&table.first(2).unwrap(), "name"), vec!["Ann", "Bob"]);
        assert_eq!(strings(&table.last(2).unwrap(), "name"), vec!["Dee", "Eve"]);
        assert_eq!(table.last(10).unwrap().row_count(), 5);
        let narrow = table.select_columns(&["age", "name"]).unwrap();
        assert_eq!(narrow.column_names(), vec!["age", "name"]);
        assert_eq!(table.empty_copy().row_count(), 0);
        assert_eq!(table.empty_copy().column_count(), 3);
    }

    #[test]
    fn test_sort_multi_key_is_stable() {
        let table = people();
        let sorted = table.sort_on(&["age", "-name"]).unwrap();
        assert_eq!(strings(&sorted, "name"), vec!["Dee", "Eve", "Bob", "Ann", "Cid"]);
        let by_team = table.sort_on(&["team"]).unwrap();
        assert_eq!(strings(&by_team, "name"), vec!["Cid", "Bob", "Eve", "Ann", "Dee"]);
    }

    #[test]
    fn test_sort_descending_puts_missing_last() {
        let table = people();
        let sorted = table.sort_descending_on(&["age"]).unwrap();
        assert_eq!(strings(&sorted, "name"), vec!["Cid", "Ann", "Bob", "Eve", "Dee"]);
    }

    #[test]
    fn test_drop_rows_with_missing() {
        let table = people();
        let complete = table.drop_rows_with_missing().unwrap();
        assert_eq!(strings(&complete, "name"), vec!["Ann", "Bob", "Eve"]);
    }
}
