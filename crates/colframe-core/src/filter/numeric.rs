//! Predicates over integer and float columns.
//!
//! Operands are `f64`; every non-missing row is widened before comparing.

use super::{scan, Comparison};
use crate::column::{Numeric, Primitive, PrimitiveColumn};
use crate::error::{Error, Result};
use crate::selection::Selection;

pub trait NumericPredicates {
    /// Rows whose non-missing value satisfies `matches`.
    fn scan_values(&self, matches: impl Fn(f64) -> bool) -> Selection;

    fn compare_to(&self, op: Comparison, value: f64) -> Selection {
        self.scan_values(|v| op.test(&v, &value))
    }

    fn is_equal_to(&self, value: f64) -> Selection {
        self.compare_to(Comparison::Equal, value)
    }

    fn is_not_equal_to(&self, value: f64) -> Selection {
        self.compare_to(Comparison::NotEqual, value)
    }

    fn is_greater_than(&self, value: f64) -> Selection {
        self.compare_to(Comparison::GreaterThan, value)
    }

    fn is_greater_than_or_equal_to(&self, value: f64) -> Selection {
        self.compare_to(Comparison::GreaterThanOrEqual, value)
    }

    fn is_less_than(&self, value: f64) -> Selection {
        self.compare_to(Comparison::LessThan, value)
    }

    fn is_less_than_or_equal_to(&self, value: f64) -> Selection {
        self.compare_to(Comparison::LessThanOrEqual, value)
    }

    fn is_between_inclusive(&self, low: f64, high: f64) -> Selection {
        self.scan_values(|v| v >= low && v <= high)
    }

    fn is_between_exclusive(&self, low: f64, high: f64) -> Selection {
        self.scan_values(|v| v > low && v < high)
    }

    fn is_in(&self, values: &[f64]) -> Selection {
        self.scan_values(|v| values.contains(&v))
    }

    fn is_not_in(&self, values: &[f64]) -> Selection {
        self.scan_values(|v| !values.contains(&v))
    }

    fn is_zero(&self) -> Selection {
        self.scan_values(|v| v == 0.0)
    }

    fn is_positive(&self) -> Selection {
        self.scan_values(|v| v > 0.0)
    }

    fn is_negative(&self) -> Selection {
        self.scan_values(|v| v < 0.0)
    }

    fn is_non_negative(&self) -> Selection {
        self.scan_values(|v| v >= 0.0)
    }

    fn is_close_to(&self, target: f64, margin: f64) -> Selection {
        self.scan_values(|v| v > target - margin && v < target + margin)
    }

    /// Row-wise comparison with another numeric column of the same length.
    fn compare_column<U: Numeric>(&self, other: &PrimitiveColumn<U>, op: Comparison) -> Result<Selection>;

    fn is_equal_to_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::Equal)
    }

    fn is_not_equal_to_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::NotEqual)
    }

    fn is_greater_than_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::GreaterThan)
    }

    fn is_greater_than_or_equal_to_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::GreaterThanOrEqual)
    }

    fn is_less_than_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::LessThan)
    }

    fn is_less_than_or_equal_to_column<U: Numeric>(&self, other: &PrimitiveColumn<U>) -> Result<Selection> {
        self.compare_column(other, Comparison::LessThanOrEqual)
    }
}

impl<T: Numeric> NumericPredicates for PrimitiveColumn<T> {
    fn scan_values(&self, matches: impl Fn(f64) -> bool) -> Selection {
        let values = self.values();
        scan(values.len(), |row| {
            let value = values[row];
            !value.is_missing_value() && matches(value.to_f64())
        })
    }

    fn compare_column<U: Numeric>(&self, other: &PrimitiveColumn<U>, op: Comparison) -> Result<Selection> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let (lhs, rhs) = (self.values(), other.values());
        Ok(scan(lhs.len(), |row| {
            !lhs[row].is_missing_value()
                && !rhs[row].is_missing_value()
                && op.test(&lhs[row].to_f64(), &rhs[row].to_f64())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int32Column, Int64Column};

    fn scores() -> Int32Column {
        Int32Column::from_values("score", vec![-5, 0, 7, i32::MIN, 12])
    }

    #[test]
    fn test_scalar_comparisons() {
        let column = scores();
        assert_eq!(column.is_equal_to(7.0).to_vec(), vec![2]);
        assert_eq!(column.is_not_equal_to(7.0).to_vec(), vec![0, 1, 4]);
        assert_eq!(column.is_greater_than(0.0).to_vec(), vec![2, 4]);
        assert_eq!(column.is_greater_than_or_equal_to(0.0).to_vec(), vec![1, 2, 4]);
        assert_eq!(column.is_less_than(0.0).to_vec(), vec![0]);
        assert_eq!(column.is_less_than_or_equal_to(7.0).to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_ranges_and_sets() {
        let column = scores();
        assert_eq!(column.is_between_inclusive(0.0, 7.0).to_vec(), vec![1, 2]);
        assert_eq!(column.is_between_exclusive(0.0, 7.0).to_vec(), Vec::<u32>::new());
        assert_eq!(column.is_in(&[12.0, -5.0]).to_vec(), vec![0, 4]);
        assert_eq!(column.is_not_in(&[12.0, -5.0]).to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_sign_predicates() {
        let column = scores();
        assert_eq!(column.is_zero().to_vec(), vec![1]);
        assert_eq!(column.is_positive().to_vec(), vec![2, 4]);
        assert_eq!(column.is_negative().to_vec(), vec![0]);
        assert_eq!(column.is_non_negative().to_vec(), vec![1, 2, 4]);
    }

    #[test]
    fn test_is_close_to_is_strict() {
        let column = Float64Column::from_values("x", vec![0.9, 1.0, 1.1, 1.2, f64::NAN]);
        assert_eq!(column.is_close_to(1.0, 0.15).to_vec(), vec![0, 1, 2]);
        assert_eq!(column.is_close_to(1.0, 0.0).to_vec(), Vec::<u32>::new());
    }

    #[test]
    fn test_column_to_column_across_widths() {
        let a = scores();
        let b = Int64Column::from_values("b", vec![-5, 1, i64::MIN, 0, 12]);
        assert_eq!(a.is_equal_to_column(&b).unwrap().to_vec(), vec![0, 4]);
        assert_eq!(a.is_less_than_column(&b).unwrap().to_vec(), vec![1]);
        assert_eq!(a.is_greater_than_column(&b).unwrap().to_vec(), Vec::<u32>::new());
        let short = Int64Column::from_values("c", vec![1]);
        assert!(a.is_equal_to_column(&short).is_err());
    }
}
