//! colframe core - an in-memory columnar dataframe engine.
//!
//! Tables are ordered lists of typed columns. Filters produce [`Selection`]s,
//! ordered row-index sets that can be combined and applied to any table of the
//! same height. Grouping, summaries, cross-tabs and pivots turn tables into new
//! tables.

pub mod aggregate;
pub mod column;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod pivot;
pub mod selection;
pub mod table;
pub mod temporal;

pub use aggregate::{Aggregate, GroupKey, MissingPolicy, Reduction, Summarizer, TableSlice, TableSliceGroup};
pub use column::{
    BooleanColumn, Column, ColumnType, DateColumn, DateTimeColumn, Float32Column, Float64Column,
    InstantColumn, Int16Column, Int32Column, Int64Column, Int8Column, PrimitiveColumn, StringColumn,
    TimeColumn, Value,
};
pub use config::{CrossTabConfig, FrameConfig, SelectionPolicy, SummaryConfig, WriteConfig};
pub use error::{Error, Result};
pub use filter::{
    Comparison, DatePredicates, Filter, NumericPredicates, Predicate, TemporalPredicates,
    TimePredicates,
};
pub use io::{ColumnExecutor, ColumnTask, ColumnWriter, ScopedThreads, Sequential, TableBuilder};
pub use pivot::{CrossTab, PivotTable};
pub use selection::{CompressedSelection, DenseSelection, Selection};
pub use table::Table;
pub use temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime, TimeUnit};
