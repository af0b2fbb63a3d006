//! Engine configuration.
//!
//! Nothing here is process-wide state: callers build a [`FrameConfig`] (or one of its
//! parts) and pass it to the operations that accept one. Every part has a `Default`
//! that matches the behavior of the plain, config-free entry points.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Policy used to pick a selection backing from a density estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Universes up to this many rows always use the dense bit-vector.
    pub dense_max_universe: usize,

    /// Above `dense_max_universe`, use the bit-vector when at least this fraction
    /// of the universe is selected.
    pub dense_min_density: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            dense_max_universe: 4_096,
            dense_min_density: 1.0 / 16.0,
        }
    }
}

impl SelectionPolicy {
    /// A policy that never chooses the dense backing.
    pub fn always_compressed() -> Self {
        Self {
            dense_max_universe: 0,
            dense_min_density: f64::INFINITY,
        }
    }

    /// A policy that always chooses the dense backing.
    pub fn always_dense() -> Self {
        Self {
            dense_max_universe: usize::MAX,
            dense_min_density: 0.0,
        }
    }

    /// Set the universe size below which the dense backing is always used.
    pub fn with_dense_max_universe(mut self, rows: usize) -> Self {
        self.dense_max_universe = rows;
        self
    }

    /// Set the minimum density for the dense backing on larger universes.
    pub fn with_dense_min_density(mut self, density: f64) -> Self {
        self.dense_min_density = density;
        self
    }

    /// Whether `members` selected rows out of `universe` should be stored densely.
    pub fn prefers_dense(&self, members: usize, universe: usize) -> bool {
        if universe <= self.dense_max_universe {
            return true;
        }
        (members as f64) / (universe as f64) >= self.dense_min_density
    }
}

/// Labels used by cross-tabulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossTabConfig {
    /// Name of the leading label column.
    pub label_column: String,

    /// Label of the synthetic totals row (always the last row).
    pub total_row_label: String,

    /// Name of the synthetic totals column (always the last column).
    pub total_column_label: String,
}

impl Default for CrossTabConfig {
    fn default() -> Self {
        Self {
            label_column: "[labels]".to_string(),
            total_row_label: "Total".to_string(),
            total_column_label: "total".to_string(),
        }
    }
}

impl CrossTabConfig {
    /// Set the label column name.
    pub fn with_label_column(mut self, name: impl Into<String>) -> Self {
        self.label_column = name.into();
        self
    }

    /// Set the totals row label.
    pub fn with_total_row_label(mut self, label: impl Into<String>) -> Self {
        self.total_row_label = label.into();
        self
    }

    /// Set the totals column name.
    pub fn with_total_column_label(mut self, label: impl Into<String>) -> Self {
        self.total_column_label = label.into();
        self
    }
}

/// Naming used by summary tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Name of the key column produced by step slicing.
    pub group_column_name: String,

    /// Suffix appended to the source table name for summary tables.
    pub summary_table_suffix: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            group_column_name: "Group".to_string(),
            summary_table_suffix: " summary".to_string(),
        }
    }
}

/// Configuration for per-column parallel writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Maximum number of worker threads for one write call. Zero means one per column.
    pub max_threads: usize,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { max_threads: 4 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub selection: SelectionPolicy,
    pub crosstab: CrossTabConfig,
    pub summary: SummaryConfig,
    pub write: WriteConfig,
}

impl FrameConfig {
    /// Decode a configuration from JSON. Absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the selection policy.
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Set the cross-tab labels.
    pub fn with_crosstab(mut self, crosstab: CrossTabConfig) -> Self {
        self.crosstab = crosstab;
        self
    }

    /// Set the summary naming.
    pub fn with_summary(mut self, summary: SummaryConfig) -> Self {
        self.summary = summary;
        self
    }

    /// Set the write configuration.
    pub fn with_write(mut self, write: WriteConfig) -> Self {
        self.write = write;
        self
    }
}
