//! Slicing a table into groups of rows and aggregating each group.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use super::key::{GroupKey, KeyEncoder};
use super::reduction::{reduce_rows, reduction_input, Reduction};
use crate::column::{Column, StringColumn, Value};
use crate::config::SummaryConfig;
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::table::Table;

const KEY_SEPARATOR: &str = " | ";

/// A view of some rows of a table, identified by a label.
#[derive(Debug, Clone)]
pub struct TableSlice<'a> {
    table: &'a Table,
    label: String,
    key: Vec<Value>,
    rows: Selection,
}

impl<'a> TableSlice<'a> {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Values of the grouping columns shared by every row of the slice. Empty
    /// for step and whole-table slices.
    pub fn key(&self) -> &[Value] {
        &self.key
    }

    pub fn selection(&self) -> &Selection {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Copy the slice's rows into a table named after the slice.
    pub fn as_table(&self) -> Result<Table> {
        let mut table = self.table.where_(&self.rows)?;
        table.set_name(self.label.clone());
        Ok(table)
    }

    pub fn reduce<R: Reduction + ?Sized>(&self, column: &str, reduction: &R) -> Result<f64> {
        let column = self.table.column(column)?;
        let input = reduction_input(column);
        reduce_rows(reduction, column, &input, self.rows.iter().map(|row| row as usize))
    }
}

#[derive(Debug, Clone)]
enum Grouping {
    Columns(Vec<usize>),
    Steps,
    Whole,
}

/// The slices of one table, in a fixed order.
#[derive(Debug, Clone)]
pub struct TableSliceGroup<'a> {
    table: &'a Table,
    grouping: Grouping,
    slices: Vec<TableSlice<'a>>,
    config: SummaryConfig,
}

impl<'a> TableSliceGroup<'a> {
    /// One slice per distinct combination of values in `columns`, in order of
    /// first appearance. Missing values form a group of their own.
    #[instrument(skip_all, fields(table = %table.name(), columns = columns.len()))]
    pub fn split_on(table: &'a Table, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| Error::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let key_columns: Vec<&Column> = indices.iter().map(|&i| &table.columns()[i]).collect();

        let mut encoder = KeyEncoder::new(key_columns.clone());
        let mut slot_by_key: FxHashMap<GroupKey, usize> = FxHashMap::default();
        let mut members: Vec<Vec<u32>> = Vec::new();
        for row in 0..table.row_count() {
            let next = members.len();
            let slot = *slot_by_key.entry(encoder.key(row)).or_insert(next);
            if slot == next {
                members.push(Vec::new());
            }
            members[slot].push(row as u32);
        }

        let slices = members
            .into_iter()
            .map(|rows| {
                let first = rows[0] as usize;
                let key = key_columns
                    .iter()
                    .map(|c| c.get(first))
                    .collect::<Result<Vec<_>>>()?;
                let label = key
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(KEY_SEPARATOR);
                Ok(TableSlice {
                    table,
                    label,
                    key,
                    rows: Selection::from_sorted_rows(&rows, table.row_count()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(slices = slices.len(), rows = table.row_count(), "Split table on columns");
        Ok(Self {
            table,
            grouping: Grouping::Columns(indices),
            slices,
            config: SummaryConfig::default(),
        })
    }

    /// Contiguous runs of `step` rows; the last may be shorter. Each slice is
    /// labelled `"{template} {first}-{last}"` with inclusive row numbers.
    pub fn split_by_step(table: &'a Table, template: &str, step: usize) -> Result<Self> {
        if step == 0 {
            return Err(Error::invalid("step must be positive"));
        }
        let count = table.row_count();
        let slices: Vec<TableSlice<'a>> = (0..count)
            .step_by(step)
            .map(|start| {
                let end = (start + step).min(count);
                TableSlice {
                    table,
                    label: format!("{template} {start}-{}", end - 1),
                    key: Vec::new(),
                    rows: Selection::with_range(start as u32, end as u32),
                }
            })
            .collect();
        debug!(slices = slices.len(), step, "Split table by step");
        Ok(Self {
            table,
            grouping: Grouping::Steps,
            slices,
            config: SummaryConfig::default(),
        })
    }

    /// A single slice covering every row.
    pub fn whole(table: &'a Table) -> Self {
        let slice = TableSlice {
            table,
            label: table.name().to_string(),
            key: Vec::new(),
            rows: Selection::with_range(0, table.row_count() as u32),
        };
        Self {
            table,
            grouping: Grouping::Whole,
            slices: vec![slice],
            config: SummaryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SummaryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slices(&self) -> &[TableSlice<'a>] {
        &self.slices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableSlice<'a>> {
        self.slices.iter()
    }

    /// Reorder slices by their key values, using column order (missing first).
    /// Step slices are already in row order.
    pub fn sorted_by_key(mut self) -> Self {
        if let Grouping::Columns(indices) = &self.grouping {
            let columns: Vec<&Column> = indices.iter().map(|&i| &self.table.columns()[i]).collect();
            self.slices.sort_by(|a, b| {
                let (ra, rb) = (first_row(a), first_row(b));
                columns
                    .iter()
                    .map(|c| c.compare_rows(ra, rb))
                    .find(|order| *order != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        self
    }

    /// One row per slice: the key columns, then one `Float64` column per
    /// `(column, reduction)` pair named `"{reduction} [{column}]"`.
    #[instrument(skip_all, fields(table = %self.table.name(), slices = self.slices.len()))]
    pub fn aggregate<R: Reduction>(&self, specs: &[(&str, Vec<R>)]) -> Result<Table> {
        let mut columns = self.key_columns()?;
        for (name, reductions) in specs {
            let source = self.table.column(name)?;
            let input = reduction_input(source);
            for reduction in reductions {
                let mut values = Vec::with_capacity(self.slices.len());
                for slice in &self.slices {
                    let value = reduce_rows(reduction, source, &input, slice.rows.iter().map(|r| r as usize))?;
                    trace!(slice = %slice.label, column = %source.name(), reduction = %reduction.name(), value, "Reduced slice");
                    values.push(value);
                }
                let result_name = format!("{} [{}]", reduction.name(), source.name());
                columns.push(Column::float64(result_name, &values));
            }
        }
        let name = format!("{}{}", self.table.name(), self.config.summary_table_suffix);
        let result = Table::with_columns(name, columns)?;
        debug!(rows = result.row_count(), columns = result.column_count(), "Aggregated slices");
        Ok(result)
    }

    fn key_columns(&self) -> Result<Vec<Column>> {
        match &self.grouping {
            Grouping::Columns(indices) => {
                let firsts: Vec<usize> = self.slices.iter().map(first_row).collect();
                indices
                    .iter()
                    .map(|&i| self.table.columns()[i].take(&firsts))
                    .collect()
            }
            Grouping::Steps => {
                let mut group = StringColumn::plain(self.config.group_column_name.clone());
                for slice in &self.slices {
                    group.append(&slice.label)?;
                }
                Ok(vec![Column::String(group)])
            }
            Grouping::Whole => Ok(Vec::new()),
        }
    }
}

fn first_row(slice: &TableSlice<'_>) -> usize {
    slice.rows.iter().next().map_or(0, |row| row as usize)
}

impl<'g, 'a> IntoIterator for &'g TableSliceGroup<'a> {
    type Item = &'g TableSlice<'a>;
    type IntoIter = std::slice::Iter<'g, TableSlice<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;

    fn approvals() -> Table {
        Table::with_columns(
            "approval",
            vec![
                Column::string("who", &["bush", "obama", "bush", "", "obama", "bush"]),
                Column::int32("year", &[2004, 2010, 2004, 2010, 2011, 2005]),
                Column::int32("approval", &[44, 50, 52, 40, 46, 61]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_on_first_encounter_order() {
        let table = approvals();
        let group = TableSliceGroup::split_on(&table, &["who"]).unwrap();
        let labels: Vec<&str> = group.iter().map(TableSlice::label).collect();
        assert_eq!(labels, vec!["bush", "obama", ""]);
        assert_eq!(group.slices()[0].selection().to_vec(), vec![0, 2, 5]);
        let total: usize = group.iter().map(TableSlice::row_count).sum();
        assert_eq!(total, table.row_count());
    }

    #[test]
    fn test_split_on_composite_key() {
        let table = approvals();
        let group = TableSliceGroup::split_on(&table, &["who", "year"]).unwrap();
        assert_eq!(group.len(), 5);
        assert_eq!(group.slices()[0].label(), "bush | 2004");
        assert_eq!(
            group.slices()[0].key(),
            &[Value::String("bush".into()), Value::Int32(2004)]
        );
    }

    #[test]
    fn test_aggregate_by_column() {
        let table = approvals();
        let summary = TableSliceGroup::split_on(&table, &["who"])
            .unwrap()
            .aggregate(&[("approval", vec![Aggregate::Mean, Aggregate::Count])])
            .unwrap();
        assert_eq!(summary.name(), "approval summary");
        assert_eq!(summary.column_names(), vec!["who", "Mean [approval]", "Count [approval]"]);
        let means = summary.column("Mean [approval]").unwrap().as_f64_vec().unwrap();
        assert!((means[0] - 157.0 / 3.0).abs() < 1e-9);
        assert_eq!(means[1], 48.0);
        assert_eq!(means[2], 40.0);
        assert!(summary.column("who").unwrap().is_missing(2));
    }

    #[test]
    fn test_sorted_by_key() {
        let table = approvals();
        let group = TableSliceGroup::split_on(&table, &["who"]).unwrap().sorted_by_key();
        let labels: Vec<&str> = group.iter().map(TableSlice::label).collect();
        assert_eq!(labels, vec!["", "bush", "obama"]);
    }

    #[test]
    fn test_split_by_step() {
        let table = approvals();
        let group = TableSliceGroup::split_by_step(&table, "rows", 4).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.slices()[0].label(), "rows 0-3");
        assert_eq!(group.slices()[1].label(), "rows 4-5");
        let summary = group.aggregate(&[("approval", vec![Aggregate::Max])]).unwrap();
        assert_eq!(summary.column_names(), vec!["Group", "Max [approval]"]);
        assert_eq!(summary.get_string(1, 0).unwrap(), "rows 4-5");
        assert!(TableSliceGroup::split_by_step(&table, "rows", 0).is_err());
    }

    #[test]
    fn test_whole_and_slice_access() {
        let table = approvals();
        let group = TableSliceGroup::whole(&table);
        let slice = &group.slices()[0];
        assert_eq!(slice.row_count(), 6);
        assert_eq!(slice.reduce("approval", &Aggregate::Min).unwrap(), 40.0);
        assert_eq!(slice.as_table().unwrap().row_count(), 6);
    }

    #[test]
    fn test_errors_and_empty_tables() {
        let table = approvals();
        assert!(matches!(
            TableSliceGroup::split_on(&table, &["nope"]),
            Err(Error::UnknownColumn(_))
        ));
        let group = TableSliceGroup::split_on(&table, &["who"]).unwrap();
        assert!(matches!(
            group.aggregate(&[("who", vec![Aggregate::Mean])]),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            group.aggregate(&[("nope", vec![Aggregate::Mean])]),
            Err(Error::UnknownColumn(_))
        ));

        let empty = table.empty_copy();
        let summary = TableSliceGroup::split_on(&empty, &["who"])
            .unwrap()
            .aggregate(&[("approval", vec![Aggregate::Mean])])
            .unwrap();
        assert_eq!(summary.row_count(), 0);
    }
}
