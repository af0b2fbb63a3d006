use tracing::{debug, instrument};

use super::Levels;
use crate::aggregate::{reduce_rows, reduction_input, Reduction, TableSliceGroup};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::table::Table;

pub struct PivotTable;

impl PivotTable {
    /// Spread `value_columns` across the distinct values of `spread_column`.
    ///
    /// The result has one row per distinct combination of `group_columns`, in
    /// order of first appearance, then one `Float64` column per distinct spread
    /// value in value order (per spread value and value column when there are
    /// several value columns, named `"{spread}.{value column}"`). Each cell
    /// reduces the rows sharing the group and the spread value, and is
    /// missing when no row does. Rows whose spread value is missing are
    /// ignored.
    #[instrument(skip_all, fields(table = %table.name(), spread = %spread_column))]
    pub fn pivot<R: Reduction + ?Sized>(
        table: &Table,
        group_columns: &[&str],
        spread_column: &str,
        value_columns: &[&str],
        reduction: &R,
    ) -> Result<Table> {
        if value_columns.is_empty() {
            return Err(Error::invalid("pivot needs at least one value column"));
        }
        let values = value_columns
            .iter()
            .map(|name| table.column(name))
            .collect::<Result<Vec<_>>>()?;
        for column in &values {
            if !reduction.supports(column.column_type()) {
                return Err(Error::unsupported(format!(
                    "{} is not defined for {} column '{}'",
                    reduction.name(),
                    column.column_type(),
                    column.name()
                )));
            }
        }
        let inputs: Vec<Vec<f64>> = values.iter().map(|c| reduction_input(c)).collect();

        let spread = table.column(spread_column)?;
        let levels = Levels::of(spread);
        let level_labels = levels.labels(spread)?;

        let groups = TableSliceGroup::split_on(table, group_columns)?;
        let mut first_rows = Vec::with_capacity(groups.len());
        // cells[level][value column] holds one result per group.
        let mut cells = vec![vec![Vec::with_capacity(groups.len()); values.len()]; levels.len()];
        for slice in &groups {
            let mut rows_by_level: Vec<Vec<usize>> = vec![Vec::new(); levels.len()];
            for row in slice.selection() {
                if let Some(level) = levels.of_row[row as usize] {
                    rows_by_level[level].push(row as usize);
                }
            }
            first_rows.push(slice.selection().iter().next().map_or(0, |row| row as usize));
            for (level, rows) in rows_by_level.iter().enumerate() {
                for (v, column) in values.iter().enumerate() {
                    let cell = if rows.is_empty() {
                        f64::NAN
                    } else {
                        reduce_rows(reduction, column, &inputs[v], rows.iter().copied())?
                    };
                    cells[level][v].push(cell);
                }
            }
        }

        let mut columns = group_columns
            .iter()
            .map(|name| table.column(name)?.take(&first_rows))
            .collect::<Result<Vec<Column>>>()?;
        for (level, label) in level_labels.iter().enumerate() {
            for (v, column) in values.iter().enumerate() {
                let name = if values.len() == 1 {
                    label.clone()
                } else {
                    format!("{label}.{}", column.name())
                };
                columns.push(Column::float64(name, &cells[level][v]));
            }
        }

        let name = format!("Pivot: {} x {}", group_columns.join(","), spread.name());
        let result = Table::with_columns(name, columns)?;
        debug!(
            groups = groups.len(),
            spread_values = levels.len(),
            columns = result.column_count(),
            "Built pivot table"
        );
        Ok(result)
    }
}
