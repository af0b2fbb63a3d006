//! Test data generation for benchmarks.
//!
//! Every generator is seeded, so two runs see the same tables.

use colframe_core::{Column, PackedDate, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed_c01f;

const REGIONS: &[&str] = &["north", "south", "east", "west", "central"];
const PRODUCTS: &[&str] = &["anvil", "bolt", "crate", "drill", "easel", "file", "gauge", "hinge"];

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 1,000 rows. Use for quick iteration.
    Small,
    /// 100,000 rows.
    #[default]
    Medium,
    /// 1,000,000 rows.
    Large,
}

impl Scale {
    pub fn rows(&self) -> usize {
        match self {
            Scale::Small => 1_000,
            Scale::Medium => 100_000,
            Scale::Large => 1_000_000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Small => "small",
            Scale::Medium => "medium",
            Scale::Large => "large",
        }
    }
}

/// A sales table: `region` and `product` (dictionary strings), `day` (dates
/// in 2024), `units` (Int32, about 2% missing), `price` (Float64) and
/// `returned` (Boolean).
pub fn generate_sales(scale: Scale) -> Table {
    let mut rng = StdRng::seed_from_u64(SEED);
    let rows = scale.rows();
    let start = PackedDate::of(2024, 1, 1).expect("valid date");

    let mut regions = Vec::with_capacity(rows);
    let mut products = Vec::with_capacity(rows);
    let mut days = Vec::with_capacity(rows);
    let mut units = Vec::with_capacity(rows);
    let mut prices = Vec::with_capacity(rows);
    let mut returned = Vec::with_capacity(rows);
    for _ in 0..rows {
        regions.push(*REGIONS.choose(&mut rng).expect("regions"));
        products.push(*PRODUCTS.choose(&mut rng).expect("products"));
        days.push(start.plus_days(rng.gen_range(0..366)).expect("date in range"));
        units.push(if rng.gen_bool(0.02) { i32::MIN } else { rng.gen_range(1..200) });
        prices.push(rng.gen_range(0.5..500.0));
        returned.push(Some(rng.gen_bool(0.05)));
    }

    Table::with_columns(
        format!("sales_{}", scale.name()),
        vec![
            Column::string("region", &regions),
            Column::string("product", &products),
            Column::date("day", &days),
            Column::int32("units", &units),
            Column::float64("price", &prices),
            Column::boolean("returned", &returned),
        ],
    )
    .expect("generated columns share a length")
}

/// `count` distinct ascending rows out of `[0, universe)`.
pub fn random_rows(count: usize, universe: u32, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows: Vec<u32> = rand::seq::index::sample(&mut rng, universe as usize, count)
        .into_iter()
        .map(|row| row as u32)
        .collect();
    rows.sort_unstable();
    rows
}
