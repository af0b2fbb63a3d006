//! Contingency tables.
//!
//! A counts table has a label column first, one `Int64` column per distinct
//! value of the column key, and a trailing total column. Its rows are the
//! distinct values of the row key followed by a trailing total row. Rows with
//! a missing value in either key are not counted.

use tracing::{debug, instrument};

use super::Levels;
use crate::column::{Column, Int64Column, StringColumn};
use crate::config::CrossTabConfig;
use crate::error::{Error, Result};
use crate::table::Table;

const COUNTS_PREFIX: &str = "Crosstab Counts: ";

pub struct CrossTab;

impl CrossTab {
    pub fn counts(table: &Table, row_key: &str, column_key: &str) -> Result<Table> {
        Self::counts_with(table, row_key, column_key, &CrossTabConfig::default())
    }

    #[instrument(skip_all, fields(table = %table.name(), row_key = %row_key, column_key = %column_key))]
    pub fn counts_with(
        table: &Table,
        row_key: &str,
        column_key: &str,
        config: &CrossTabConfig,
    ) -> Result<Table> {
        let rows = table.column(row_key)?;
        let cols = table.column(column_key)?;
        let row_levels = Levels::of(rows);
        let col_levels = Levels::of(cols);

        // One extra slot on each axis for the totals.
        let width = col_levels.len() + 1;
        let mut cells = vec![0i64; (row_levels.len() + 1) * width];
        for (r, c) in row_levels.of_row.iter().zip(&col_levels.of_row) {
            if let (Some(r), Some(c)) = (*r, *c) {
                cells[r * width + c] += 1;
                cells[r * width + width - 1] += 1;
                cells[row_levels.len() * width + c] += 1;
                cells[row_levels.len() * width + width - 1] += 1;
            }
        }

        let mut labels = StringColumn::dictionary(config.label_column.clone());
        for label in row_levels.labels(rows)? {
            labels.append(&label)?;
        }
        labels.append(&config.total_row_label)?;

        let mut columns = vec![Column::String(labels)];
        let mut headers = col_levels.labels(cols)?;
        headers.push(config.total_column_label.clone());
        for (c, header) in headers.into_iter().enumerate() {
            let values = (0..=row_levels.len()).map(|r| cells[r * width + c]).collect();
            columns.push(Column::Int64(Int64Column::from_values(header, values)));
        }

        let name = format!("{COUNTS_PREFIX}{} x {}", rows.name(), cols.name());
        let result = Table::with_columns(name, columns)?;
        debug!(
            row_levels = row_levels.len(),
            column_levels = col_levels.len(),
            total = cells[cells.len() - 1],
            "Built cross-tab counts"
        );
        Ok(result)
    }

    /// Occurrences of each distinct non-missing value of `column`, in value order.
    pub fn counts_one(table: &Table, column: &str) -> Result<Table> {
        let source = table.column(column)?;
        let levels = Levels::of(source);
        let mut counts = vec![0i64; levels.len()];
        for level in levels.of_row.iter().flatten() {
            counts[*level] += 1;
        }
        let mut categories = StringColumn::dictionary("Category");
        for label in levels.labels(source)? {
            categories.append(&label)?;
        }
        Table::with_columns(
            format!("{COUNTS_PREFIX}{}", source.name()),
            vec![
                Column::String(categories),
                Column::Int64(Int64Column::from_values("Count", counts)),
            ],
        )
    }

    /// Each count divided by its row total.
    pub fn row_percents(counts: &Table) -> Result<Table> {
        let grid = CountsGrid::read(counts)?;
        grid.proportions(counts, "Row", |r, _| grid.get(r, grid.width - 1))
    }

    /// Each count divided by its column total.
    pub fn column_percents(counts: &Table) -> Result<Table> {
        let grid = CountsGrid::read(counts)?;
        grid.proportions(counts, "Column", |_, c| grid.get(grid.height - 1, c))
    }

    /// Each count divided by the grand total.
    pub fn table_percents(counts: &Table) -> Result<Table> {
        let grid = CountsGrid::read(counts)?;
        let total = grid.get(grid.height - 1, grid.width - 1);
        grid.proportions(counts, "Table", |_, _| total)
    }

    pub fn row_percents_of(table: &Table, row_key: &str, column_key: &str) -> Result<Table> {
        Self::row_percents(&Self::counts(table, row_key, column_key)?)
    }

    pub fn column_percents_of(table: &Table, row_key: &str, column_key: &str) -> Result<Table> {
        Self::column_percents(&Self::counts(table, row_key, column_key)?)
    }

    pub fn table_percents_of(table: &Table, row_key: &str, column_key: &str) -> Result<Table> {
        Self::table_percents(&Self::counts(table, row_key, column_key)?)
    }
}

/// The numeric part of a counts table, row-major.
struct CountsGrid {
    cells: Vec<f64>,
    width: usize,
    height: usize,
}

impl CountsGrid {
    fn read(counts: &Table) -> Result<Self> {
        if counts.column_count() < 2 || counts.row_count() == 0 {
            return Err(Error::invalid(format!(
                "'{}' is not a cross-tab counts table",
                counts.name()
            )));
        }
        let width = counts.column_count() - 1;
        let height = counts.row_count();
        let columns = counts.columns()[1..]
            .iter()
            .map(Column::as_f64_vec)
            .collect::<Result<Vec<_>>>()?;
        let mut cells = Vec::with_capacity(width * height);
        for r in 0..height {
            cells.extend(columns.iter().map(|column| column[r]));
        }
        Ok(Self { cells, width, height })
    }

    fn get(&self, r: usize, c: usize) -> f64 {
        self.cells[r * self.width + c]
    }

    fn proportions(&self, counts: &Table, kind: &str, denominator: impl Fn(usize, usize) -> f64) -> Result<Table> {
        let mut columns = vec![counts.columns()[0].clone()];
        for (c, source) in counts.columns()[1..].iter().enumerate() {
            let values: Vec<f64> = (0..self.height)
                .map(|r| {
                    let total = denominator(r, c);
                    if total == 0.0 {
                        f64::NAN
                    } else {
                        self.get(r, c) / total
                    }
                })
                .collect();
            columns.push(Column::float64(source.name(), &values));
        }
        let pairing = counts.name().strip_prefix(COUNTS_PREFIX).unwrap_or(counts.name());
        Table::with_columns(format!("Crosstab {kind} Proportions: {pairing}"), columns)
    }
}
