//! colframe benchmark suite
//!
//! Criterion benchmarks for the engine, over deterministic generated tables.
//!
//! # Benchmark Categories
//!
//! - **Selection**: set algebra on both backings
//! - **Filter**: typed predicates and composite filters
//! - **Aggregate**: grouping, summaries, cross-tabs and pivots

pub mod fixtures;
pub mod harness;

pub use fixtures::{generate_sales, random_rows, Scale};
pub use harness::{init_tracing, BenchContext};
