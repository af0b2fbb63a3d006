//! The boundary with file-format readers and writers.
//!
//! Readers fill a table row by row through [`TableBuilder`]. Writers either pull
//! cells through [`Table::get`] and [`Column::get_string`], or implement
//! [`ColumnWriter`] and let [`Table::write_columns`] hand each column to a task
//! run by a caller-supplied [`ColumnExecutor`].

use std::collections::VecDeque;
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::column::{Column, ColumnType, Value};
use crate::config::WriteConfig;
use crate::error::{Error, Result};
use crate::table::{same_column_name, Table};

/// Builds a table from rows of cells.
///
/// Columns are declared up front; once the first row is appended the set of
/// columns is fixed.
#[derive(Debug)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Declare the next column.
    pub fn declare(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<&mut Self> {
        let name = name.into();
        if self.rows > 0 {
            return Err(Error::invalid(format!(
                "cannot declare column '{name}' after {} rows were appended",
                self.rows
            )));
        }
        if self.columns.iter().any(|c| same_column_name(c.name(), &name)) {
            return Err(Error::DuplicateColumn(name));
        }
        self.columns.push(Column::new(name, column_type));
        Ok(self)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Append one row of typed cells. `Value::Missing` appends a missing cell.
    ///
    /// A row that fails part way leaves the builder unchanged.
    pub fn append_row(&mut self, cells: &[Value]) -> Result<&mut Self> {
        self.append_with(cells, |column, cell| column.append_value(cell))
    }

    /// Append one row of text cells, each parsed by its column's type. The empty
    /// string appends a missing cell.
    pub fn append_strings(&mut self, cells: &[&str]) -> Result<&mut Self> {
        self.append_with(cells, |column, cell| column.append_str(cell))
    }

    fn append_with<C>(
        &mut self,
        cells: &[C],
        append: impl Fn(&mut Column, &C) -> Result<()>,
    ) -> Result<&mut Self> {
        if cells.len() != self.columns.len() {
            return Err(Error::length_mismatch(self.columns.len(), cells.len()));
        }
        for (index, cell) in cells.iter().enumerate() {
            if let Err(err) = append(&mut self.columns[index], cell) {
                for column in &mut self.columns[..index] {
                    column.remove(self.rows)?;
                }
                return Err(err);
            }
        }
        self.rows += 1;
        Ok(self)
    }

    pub fn build(self) -> Result<Table> {
        debug!(
            table = %self.name,
            columns = self.columns.len(),
            rows = self.rows,
            "Built table"
        );
        Table::with_columns(self.name, self.columns)
    }
}

/// Writes one column to some destination. Called concurrently for different
/// columns of the same table.
pub trait ColumnWriter: Sync {
    fn write_column(&self, column: &Column) -> Result<()>;
}

impl<F> ColumnWriter for F
where
    F: Fn(&Column) -> Result<()> + Sync,
{
    fn write_column(&self, column: &Column) -> Result<()> {
        self(column)
    }
}

/// One unit of work handed to a [`ColumnExecutor`].
pub type ColumnTask<'a> = Box<dyn FnOnce() -> Result<()> + Send + 'a>;

/// Runs a batch of column tasks and waits for all of them.
///
/// The result at position `i` belongs to the task at position `i`.
pub trait ColumnExecutor {
    fn execute<'a>(&self, tasks: Vec<ColumnTask<'a>>) -> Vec<Result<()>>;
}

/// Runs every task on the calling thread, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ColumnExecutor for Sequential {
    fn execute<'a>(&self, tasks: Vec<ColumnTask<'a>>) -> Vec<Result<()>> {
        tasks.into_iter().map(|task| task()).collect()
    }
}

/// Runs tasks on scoped threads that live only for one `execute` call.
///
/// Workers pull tasks from a shared queue, so a slow column does not hold up
/// the others. `max_threads == 0` starts one thread per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedThreads {
    pub max_threads: usize,
}

impl ScopedThreads {
    pub fn new(max_threads: usize) -> Self {
        Self { max_threads }
    }

    fn workers_for(&self, tasks: usize) -> usize {
        match self.max_threads {
            0 => tasks,
            max => max.min(tasks),
        }
    }
}

impl Default for ScopedThreads {
    fn default() -> Self {
        WriteConfig::default().into()
    }
}

impl From<WriteConfig> for ScopedThreads {
    fn from(config: WriteConfig) -> Self {
        Self::new(config.max_threads)
    }
}

impl ColumnExecutor for ScopedThreads {
    fn execute<'a>(&self, tasks: Vec<ColumnTask<'a>>) -> Vec<Result<()>> {
        let count = tasks.len();
        let workers = self.workers_for(count);
        if workers <= 1 {
            return Sequential.execute(tasks);
        }

        let queue = Mutex::new(tasks.into_iter().enumerate().collect::<VecDeque<_>>());
        let results: Mutex<Vec<Option<Result<()>>>> = Mutex::new((0..count).map(|_| None).collect());
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    // The queue lock is released before the task runs.
                    let next = queue.lock().pop_front();
                    let Some((index, task)) = next else {
                        break;
                    };
                    let outcome = task();
                    results.lock()[index] = Some(outcome);
                });
            }
        });

        results
            .into_inner()
            .into_iter()
            .map(|outcome| outcome.unwrap_or_else(|| Err(Error::invalid("column task did not run"))))
            .collect()
    }
}

impl Table {
    /// Hand every column to `writer`, running the per-column tasks on
    /// `executor`. Returns once all tasks finished; the first failing column
    /// (in column order) determines the error.
    #[instrument(skip_all, fields(table = %self.name(), columns = self.column_count()))]
    pub fn write_columns<W, E>(&self, writer: &W, executor: &E) -> Result<()>
    where
        W: ColumnWriter + ?Sized,
        E: ColumnExecutor + ?Sized,
    {
        let tasks: Vec<ColumnTask<'_>> = self
            .columns()
            .iter()
            .map(|column| Box::new(move || writer.write_column(column)) as ColumnTask<'_>)
            .collect();
        let results = executor.execute(tasks);
        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(
            written = results.len() - failed,
            failed,
            "Wrote table columns"
        );
        results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::PackedDate;
    use std::collections::BTreeMap;

    fn builder() -> TableBuilder {
        let mut builder = TableBuilder::new("orders");
        builder
            .declare("id", ColumnType::Int32)
            .unwrap()
            .declare("customer", ColumnType::String)
            .unwrap()
            .declare("placed", ColumnType::Date)
            .unwrap()
            .declare("paid", ColumnType::Boolean)
            .unwrap();
        builder
    }

    #[test]
    fn test_builder_parses_strings() {
        let mut builder = builder();
        builder
            .append_strings(&["1", "ada", "2024-02-29", "true"])
            .unwrap()
            .append_strings(&["2", "", "", ""])
            .unwrap();
        let table = builder.build().unwrap();
        assert_eq!(table.name(), "orders");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_string(0, 2).unwrap(), "2024-02-29");
        assert_eq!(table.get(0, 2).unwrap(), Value::Date(PackedDate::of(2024, 2, 29).unwrap()));
        assert!(table.column("customer").unwrap().is_missing(1));
        assert!(table.column("placed").unwrap().is_missing(1));
        assert!(table.column("paid").unwrap().is_missing(1));
    }

    #[test]
    fn test_builder_typed_rows() {
        let mut builder = builder();
        builder
            .append_row(&[
                Value::Int32(7),
                Value::String("grace".into()),
                Value::Missing,
                Value::Boolean(false),
            ])
            .unwrap();
        let table = builder.build().unwrap();
        assert_eq!(table.get(0, 0).unwrap(), Value::Int32(7));
        assert_eq!(table.get(0, 3).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_builder_rejects_bad_rows() {
        let mut builder = builder();
        assert!(matches!(
            builder.append_strings(&["1", "ada"]),
            Err(Error::LengthMismatch { expected: 4, actual: 2 })
        ));
        assert!(builder.append_strings(&["1", "ada", "not a date", "true"]).is_err());
        assert_eq!(builder.row_count(), 0);
        builder.append_strings(&["1", "ada", "2024-01-01", "false"]).unwrap();
        assert!(matches!(builder.declare("late", ColumnType::Int8), Err(Error::InvalidData(_))));
        let table = builder.build().unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.columns().iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_builder_duplicate_column() {
        let mut builder = TableBuilder::new("t");
        builder.declare("Name", ColumnType::Text).unwrap();
        assert!(matches!(builder.declare("name", ColumnType::Text), Err(Error::DuplicateColumn(_))));
        builder.declare("Émission", ColumnType::Float64).unwrap();
        assert!(matches!(builder.declare("éMISSION", ColumnType::Float64), Err(Error::DuplicateColumn(_))));
        assert_eq!(builder.column_count(), 2);
    }

    fn sample() -> Table {
        Table::with_columns(
            "sample",
            vec![
                Column::int32("a", &[1, 2, 3]),
                Column::float64("b", &[0.5, f64::NAN, 2.5]),
                Column::string("c", &["x", "y", ""]),
                Column::int64("d", &[4, 5, 6]),
            ],
        )
        .unwrap()
    }

    /// Collects each column rendered as text.
    #[derive(Default)]
    struct Collect {
        out: Mutex<BTreeMap<String, Vec<String>>>,
    }

    impl ColumnWriter for Collect {
        fn write_column(&self, column: &Column) -> Result<()> {
            let cells = (0..column.len())
                .map(|row| column.get_string(row))
                .collect::<Result<Vec<_>>>()?;
            self.out.lock().insert(column.name().to_string(), cells);
            Ok(())
        }
    }

    #[test]
    fn test_write_columns_sequential_and_threaded() {
        let table = sample();
        for executor in [&Sequential as &dyn ColumnExecutor, &ScopedThreads::new(2), &ScopedThreads::new(0)] {
            let writer = Collect::default();
            table.write_columns(&writer, executor).unwrap();
            let out = writer.out.into_inner();
            assert_eq!(out.len(), 4);
            assert_eq!(out["a"], vec!["1", "2", "3"]);
            assert_eq!(out["b"][1], "");
            assert_eq!(out["c"], vec!["x", "y", ""]);
        }
    }

    #[test]
    fn test_write_columns_reports_first_error() {
        let table = sample();
        let writer = |column: &Column| -> Result<()> {
            match column.name() {
                "b" => Err(Error::invalid("b failed")),
                "d" => Err(Error::invalid("d failed")),
                _ => Ok(()),
            }
        };
        let err = table.write_columns(&writer, &ScopedThreads::new(3)).unwrap_err();
        assert_eq!(err.to_string(), "invalid data: b failed");
    }

    #[test]
    fn test_scoped_threads_from_config() {
        let executor = ScopedThreads::from(WriteConfig { max_threads: 8 });
        assert_eq!(executor.workers_for(3), 3);
        assert_eq!(executor.workers_for(20), 8);
        assert_eq!(ScopedThreads::default().max_threads, 4);
        assert!(executor.execute(Vec::new()).is_empty());
    }
}
