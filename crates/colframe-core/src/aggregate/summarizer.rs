//! Summaries over whole tables or groups of rows.

use tracing::warn;

use super::reduction::Reduction;
use super::slice::TableSliceGroup;
use crate::config::SummaryConfig;
use crate::error::{Error, Result};
use crate::table::Table;

/// Applies a set of reductions to a set of columns, either across the whole
/// table or per group.
///
/// Each reduction is applied only to the columns whose type it supports.
pub struct Summarizer<'a, R: Reduction> {
    table: &'a Table,
    columns: Vec<String>,
    reductions: Vec<R>,
    config: SummaryConfig,
}

impl Table {
    pub fn summarize<R: Reduction>(&self, columns: &[&str], reductions: Vec<R>) -> Summarizer<'_, R> {
        Summarizer {
            table: self,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            reductions,
            config: SummaryConfig::default(),
        }
    }
}

impl<'a, R: Reduction> Summarizer<'a, R> {
    pub fn with_config(mut self, config: SummaryConfig) -> Self {
        self.config = config;
        self
    }

    /// One row summarizing every row of the table.
    pub fn apply(&self) -> Result<Table> {
        self.run(TableSliceGroup::whole(self.table))
    }

    /// One row per distinct combination of `columns`.
    pub fn by(&self, columns: &[&str]) -> Result<Table> {
        self.run(TableSliceGroup::split_on(self.table, columns)?)
    }

    /// One row per run of `step` consecutive rows.
    pub fn by_step(&self, template: &str, step: usize) -> Result<Table> {
        self.run(TableSliceGroup::split_by_step(self.table, template, step)?)
    }

    fn run(&self, group: TableSliceGroup<'a>) -> Result<Table> {
        let specs = self.compatible_pairs()?;
        group.with_config(self.config.clone()).aggregate(&specs)
    }

    fn compatible_pairs(&self) -> Result<Vec<(&str, Vec<&R>)>> {
        let mut specs = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let column = self.table.column(name)?;
            let mut applicable = Vec::new();
            for reduction in &self.reductions {
                if reduction.supports(column.column_type()) {
                    applicable.push(reduction);
                } else {
                    warn!(
                        column = %column.name(),
                        column_type = %column.column_type(),
                        reduction = %reduction.name(),
                        "Skipping reduction for incompatible column"
                    );
                }
            }
            if !applicable.is_empty() {
                specs.push((name.as_str(), applicable));
            }
        }
        if specs.is_empty() {
            return Err(Error::unsupported(
                "none of the reductions apply to the summarized column types",
            ));
        }
        Ok(specs)
    }
}
