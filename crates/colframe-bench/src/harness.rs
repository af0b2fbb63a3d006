//! Benchmark harness helpers.

use std::sync::Once;

use colframe_core::{Selection, SelectionPolicy, Table};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::fixtures::{generate_sales, random_rows, Scale};

static TRACING: Once = Once::new();

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default
/// `colframe_core=warn,colframe_bench=info`).
/// Safe to call from every bench; only the first call installs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "colframe_core=warn,colframe_bench=info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}

/// Generated data shared by the benchmarks of one group.
pub struct BenchContext {
    pub table: Table,
    pub sparse: Vec<u32>,
    pub dense: Vec<u32>,
}

impl BenchContext {
    pub fn with_scale(scale: Scale) -> Self {
        init_tracing();
        let table = generate_sales(scale);
        let universe = table.row_count() as u32;
        let ctx = Self {
            sparse: random_rows(table.row_count() / 100, universe, 1),
            dense: random_rows(table.row_count() / 2, universe, 2),
            table,
        };
        info!(
            scale = scale.name(),
            rows = ctx.table.row_count(),
            sparse = ctx.sparse.len(),
            dense = ctx.dense.len(),
            "Generated bench context"
        );
        ctx
    }

    /// `rows` stored with the bit-vector backing.
    pub fn dense_selection(&self, rows: &[u32]) -> Selection {
        Selection::from_sorted_rows_with(rows, self.table.row_count(), &SelectionPolicy::always_dense())
    }

    /// `rows` stored with the roaring backing.
    pub fn compressed_selection(&self, rows: &[u32]) -> Selection {
        Selection::from_sorted_rows_with(
            rows,
            self.table.row_count(),
            &SelectionPolicy::always_compressed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_context() {
        init_tracing();
        let ctx = BenchContext::with_scale(Scale::Small);
        assert_eq!(ctx.table.row_count(), 1_000);
        assert_eq!(ctx.sparse.len(), 10);
        assert_eq!(ctx.dense.len(), 500);
        assert_eq!(ctx.dense_selection(&ctx.sparse).len(), 10);
        assert_eq!(ctx.compressed_selection(&ctx.dense).len(), 500);
    }
}
