//! Grouping, summary, cross-tab and pivot benchmarks.

use colframe_bench::fixtures::Scale;
use colframe_bench::harness::BenchContext;
use colframe_core::{Aggregate, CrossTab, PivotTable, TableSliceGroup};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate/split");
    let ctx = BenchContext::with_scale(Scale::Medium);

    group.bench_function("one_key", |b| {
        b.iter(|| black_box(TableSliceGroup::split_on(&ctx.table, &["region"]).unwrap().len()));
    });
    group.bench_function("two_keys", |b| {
        b.iter(|| {
            black_box(
                TableSliceGroup::split_on(&ctx.table, &["region", "product"])
                    .unwrap()
                    .len(),
            )
        });
    });
    group.bench_function("by_step", |b| {
        b.iter(|| black_box(TableSliceGroup::split_by_step(&ctx.table, "rows", 1_000).unwrap().len()));
    });

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate/summarize");
    let ctx = BenchContext::with_scale(Scale::Medium);

    group.bench_function("whole", |b| {
        b.iter(|| {
            black_box(
                ctx.table
                    .summarize(&["units", "price"], vec![Aggregate::Mean, Aggregate::StandardDeviation])
                    .apply()
                    .unwrap(),
            )
        });
    });
    group.bench_function("by_region", |b| {
        b.iter(|| {
            black_box(
                ctx.table
                    .summarize(&["units", "price"], vec![Aggregate::Sum, Aggregate::Median])
                    .by(&["region"])
                    .unwrap(),
            )
        });
    });

    group.finish();
}

fn bench_pivot(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate/pivot");
    let ctx = BenchContext::with_scale(Scale::Medium);

    group.bench_function("crosstab_counts", |b| {
        b.iter(|| black_box(CrossTab::counts(&ctx.table, "region", "product").unwrap()));
    });
    group.bench_function("crosstab_row_percents", |b| {
        b.iter(|| black_box(CrossTab::row_percents_of(&ctx.table, "region", "product").unwrap()));
    });
    group.bench_function("pivot_sum", |b| {
        b.iter(|| {
            black_box(
                PivotTable::pivot(&ctx.table, &["region"], "product", &["units"], &Aggregate::Sum).unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_split, bench_summarize, bench_pivot);
criterion_main!(benches);
