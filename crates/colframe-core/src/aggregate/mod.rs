//! Split-apply-combine.
//!
//! A [`Table`](crate::table::Table) is split into a [`TableSliceGroup`], each
//! slice is reduced, and the results are combined into a new table with one
//! row per slice.

mod key;
mod reduction;
mod slice;
mod summarizer;

pub use key::GroupKey;
pub(crate) use key::KeyEncoder;
pub use reduction::{Aggregate, MissingPolicy, Reduction};
pub(crate) use reduction::{reduce_rows, reduction_input};
pub use slice::{TableSlice, TableSliceGroup};
pub use summarizer::Summarizer;
