//! Reductions: functions from a group of values to one number.

use std::fmt;

use rustc_hash::FxHashSet;

use super::key::ordinal_codes;
use crate::column::{Column, ColumnType, Primitive};
use crate::error::{Error, Result};

/// Whether a reduction sees missing cells (as NaN) or only present ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Exclude,
    Include,
}

/// A function that summarizes a group of values as one `f64`.
///
/// Numeric and boolean columns are presented as their values widened to
/// `f64`. Other columns are presented as ordinals shared by equal values,
/// which only counting reductions should accept.
pub trait Reduction: Send + Sync {
    /// Display name, used in result column names such as `"Mean [age]"`.
    fn name(&self) -> String;

    fn reduce(&self, values: &[f64]) -> f64;

    fn missing_policy(&self) -> MissingPolicy {
        MissingPolicy::Exclude
    }

    fn numeric_only(&self) -> bool {
        true
    }

    fn supports(&self, column_type: ColumnType) -> bool {
        !self.numeric_only() || column_type.is_numeric() || column_type == ColumnType::Boolean
    }
}

impl<R: Reduction + ?Sized> Reduction for &R {
    fn name(&self) -> String {
        (**self).name()
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        (**self).reduce(values)
    }

    fn missing_policy(&self) -> MissingPolicy {
        (**self).missing_policy()
    }

    fn numeric_only(&self) -> bool {
        (**self).numeric_only()
    }

    fn supports(&self, column_type: ColumnType) -> bool {
        (**self).supports(column_type)
    }
}

impl<R: Reduction + ?Sized> Reduction for Box<R> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        (**self).reduce(values)
    }

    fn missing_policy(&self) -> MissingPolicy {
        (**self).missing_policy()
    }

    fn numeric_only(&self) -> bool {
        (**self).numeric_only()
    }

    fn supports(&self, column_type: ColumnType) -> bool {
        (**self).supports(column_type)
    }
}

/// The built-in reductions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    /// Number of non-missing values.
    Count,
    /// Number of values, missing included.
    CountWithMissing,
    CountMissing,
    /// Number of distinct non-missing values.
    CountUnique,
    /// Boolean columns only.
    CountTrue,
    /// Boolean columns only.
    CountFalse,
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Range,
    /// Bias-corrected sample variance.
    Variance,
    PopulationVariance,
    StandardDeviation,
    Product,
    GeometricMean,
    QuadraticMean,
    SumOfSquares,
    SumOfLogs,
    FirstQuartile,
    ThirdQuartile,
    /// The given percentile, in `(0, 100]`.
    Percentile(f64),
    /// First non-missing value in row order.
    First,
    /// Last non-missing value in row order.
    Last,
    Skewness,
    Kurtosis,
}

fn ordinal_suffix(n: u64) -> &'static str {
    match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregate::Count => "Count",
            Aggregate::CountWithMissing => "Count including missing",
            Aggregate::CountMissing => "Count Missing Values",
            Aggregate::CountUnique => "Count Unique",
            Aggregate::CountTrue => "Number True",
            Aggregate::CountFalse => "Number False",
            Aggregate::Sum => "Sum",
            Aggregate::Mean => "Mean",
            Aggregate::Median => "Median",
            Aggregate::Min => "Min",
            Aggregate::Max => "Max",
            Aggregate::Range => "Range",
            Aggregate::Variance => "Variance",
            Aggregate::PopulationVariance => "Population Variance",
            Aggregate::StandardDeviation => "Std. Deviation",
            Aggregate::Product => "Product",
            Aggregate::GeometricMean => "Geometric Mean",
            Aggregate::QuadraticMean => "Quadratic Mean",
            Aggregate::SumOfSquares => "Sum of Squares",
            Aggregate::SumOfLogs => "Sum of Logs",
            Aggregate::FirstQuartile => "First Quartile",
            Aggregate::ThirdQuartile => "Third Quartile",
            Aggregate::Percentile(p) => {
                return if p.fract() == 0.0 && *p >= 0.0 {
                    let whole = *p as u64;
                    write!(f, "{whole}{} Percentile", ordinal_suffix(whole))
                } else {
                    write!(f, "{p}th Percentile")
                };
            }
            Aggregate::First => "First",
            Aggregate::Last => "Last",
            Aggregate::Skewness => "Skewness",
            Aggregate::Kurtosis => "Kurtosis",
        };
        f.write_str(name)
    }
}

impl Reduction for Aggregate {
    fn name(&self) -> String {
        self.to_string()
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Aggregate::Count | Aggregate::CountWithMissing => values.len() as f64,
            Aggregate::CountMissing => values.iter().filter(|v| v.is_nan()).count() as f64,
            Aggregate::CountUnique => values
                .iter()
                .filter(|v| !v.is_nan())
                .map(|v| v.key_bits())
                .collect::<FxHashSet<_>>()
                .len() as f64,
            Aggregate::CountTrue => values.iter().filter(|v| **v == 1.0).count() as f64,
            Aggregate::CountFalse => values.iter().filter(|v| **v == 0.0).count() as f64,
            Aggregate::Sum => non_empty(values, |v| v.iter().sum()),
            Aggregate::Mean => mean(values),
            Aggregate::Median => percentile(values, 50.0),
            Aggregate::Min => non_empty(values, |v| v.iter().copied().fold(f64::INFINITY, f64::min)),
            Aggregate::Max => non_empty(values, |v| v.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Aggregate::Range => non_empty(values, |v| {
                let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let min = v.iter().copied().fold(f64::INFINITY, f64::min);
                max - min
            }),
            Aggregate::Variance => variance(values),
            Aggregate::PopulationVariance => non_empty(values, |v| {
                let m = mean(v);
                v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / v.len() as f64
            }),
            Aggregate::StandardDeviation => variance(values).sqrt(),
            Aggregate::Product => non_empty(values, |v| v.iter().product()),
            Aggregate::GeometricMean => non_empty(values, |v| {
                (v.iter().map(|x| x.ln()).sum::<f64>() / v.len() as f64).exp()
            }),
            Aggregate::QuadraticMean => non_empty(values, |v| {
                (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt()
            }),
            Aggregate::SumOfSquares => non_empty(values, |v| v.iter().map(|x| x * x).sum()),
            Aggregate::SumOfLogs => non_empty(values, |v| v.iter().map(|x| x.ln()).sum()),
            Aggregate::FirstQuartile => percentile(values, 25.0),
            Aggregate::ThirdQuartile => percentile(values, 75.0),
            Aggregate::Percentile(p) => percentile(values, *p),
            Aggregate::First => values.first().copied().unwrap_or(f64::NAN),
            Aggregate::Last => values.last().copied().unwrap_or(f64::NAN),
            Aggregate::Skewness => skewness(values),
            Aggregate::Kurtosis => kurtosis(values),
        }
    }

    fn missing_policy(&self) -> MissingPolicy {
        match self {
            Aggregate::CountWithMissing | Aggregate::CountMissing => MissingPolicy::Include,
            _ => MissingPolicy::Exclude,
        }
    }

    fn numeric_only(&self) -> bool {
        !matches!(
            self,
            Aggregate::Count | Aggregate::CountWithMissing | Aggregate::CountMissing | Aggregate::CountUnique
        )
    }

    fn supports(&self, column_type: ColumnType) -> bool {
        match self {
            Aggregate::CountTrue | Aggregate::CountFalse => column_type == ColumnType::Boolean,
            _ => !self.numeric_only() || column_type.is_numeric() || column_type == ColumnType::Boolean,
        }
    }
}

fn non_empty(values: &[f64], f: impl FnOnce(&[f64]) -> f64) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        f(values)
    }
}

fn mean(values: &[f64]) -> f64 {
    non_empty(values, |v| v.iter().sum::<f64>() / v.len() as f64)
}

/// Sample variance; zero for a single value.
fn variance(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        1 => 0.0,
        n => {
            let m = mean(values);
            values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
        }
    }
}

/// Percentile estimate at position `p * (n + 1) / 100` of the sorted values,
/// interpolating between neighbours.
pub(crate) fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() || !(p > 0.0 && p <= 100.0) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = p * (n + 1) as f64 / 100.0;
    if position < 1.0 {
        return sorted[0];
    }
    if position >= n as f64 {
        return sorted[n - 1];
    }
    let floor = position.floor();
    let fraction = position - floor;
    let lower = sorted[floor as usize - 1];
    let upper = sorted[floor as usize];
    lower + fraction * (upper - lower)
}

/// Bias-corrected sample skewness; NaN below three values.
fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = variance(values);
    if var < 1e-19 {
        return 0.0;
    }
    let cubes = values.iter().map(|x| (x - m).powi(3)).sum::<f64>() / (var * var.sqrt());
    let n = n as f64;
    n / ((n - 1.0) * (n - 2.0)) * cubes
}

/// Bias-corrected sample excess kurtosis; NaN below four values.
fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = variance(values);
    if var < 1e-19 {
        return 0.0;
    }
    let sd = var.sqrt();
    let fourth = values.iter().map(|x| ((x - m) / sd).powi(4)).sum::<f64>();
    let n = n as f64;
    let coefficient = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let correction = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    coefficient * fourth - correction
}

/// The values a reduction sees for one column: widened numbers, or ordinals
/// for columns without a numeric form. Missing cells are NaN.
pub(crate) fn reduction_input(column: &Column) -> Vec<f64> {
    column.as_f64_vec().unwrap_or_else(|_| ordinal_codes(column))
}

/// Apply `reduction` to `rows` of `column`, whose reduction input is `input`.
pub(crate) fn reduce_rows<R: Reduction + ?Sized>(
    reduction: &R,
    column: &Column,
    input: &[f64],
    rows: impl Iterator<Item = usize>,
) -> Result<f64> {
    if !reduction.supports(column.column_type()) {
        return Err(Error::unsupported(format!(
            "{} is not defined for {} column '{}'",
            reduction.name(),
            column.column_type(),
            column.name()
        )));
    }
    let values: Vec<f64> = match reduction.missing_policy() {
        MissingPolicy::Exclude => rows.map(|row| input[row]).filter(|v| !v.is_nan()).collect(),
        MissingPolicy::Include => rows.map(|row| input[row]).collect(),
    };
    Ok(reduction.reduce(&values))
}
