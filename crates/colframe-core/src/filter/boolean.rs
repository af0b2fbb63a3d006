use super::{scan, unsupported, Comparison, Predicate};
use crate::column::{BooleanColumn, ColumnType, Value};
use crate::error::{Error, Result};
use crate::selection::Selection;

impl BooleanColumn {
    pub fn is_true(&self) -> Selection {
        self.matching(true)
    }

    pub fn is_false(&self) -> Selection {
        self.matching(false)
    }

    fn matching(&self, wanted: bool) -> Selection {
        let values: Vec<Option<bool>> = self.iter().collect();
        scan(values.len(), |row| values[row] == Some(wanted))
    }

    /// Rows where both columns hold the same non-missing value.
    pub fn is_equal_to_column(&self, other: &BooleanColumn) -> Result<Selection> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let pairs: Vec<(Option<bool>, Option<bool>)> = self.iter().zip(other.iter()).collect();
        Ok(scan(pairs.len(), |row| match pairs[row] {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }))
    }
}

pub(crate) fn evaluate(column: &BooleanColumn, predicate: &Predicate) -> Result<Selection> {
    match predicate {
        Predicate::IsTrue => Ok(column.is_true()),
        Predicate::IsFalse => Ok(column.is_false()),
        Predicate::Compare(Comparison::Equal, Value::Boolean(v)) => Ok(column.matching(*v)),
        Predicate::Compare(Comparison::NotEqual, Value::Boolean(v)) => Ok(column.matching(!*v)),
        other => Err(unsupported(other, ColumnType::Boolean)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> BooleanColumn {
        BooleanColumn::from_options("flag", &[Some(true), None, Some(false), Some(true)])
    }

    #[test]
    fn test_true_false_skip_missing() {
        let column = flags();
        assert_eq!(column.is_true().to_vec(), vec![0, 3]);
        assert_eq!(column.is_false().to_vec(), vec![2]);
    }

    #[test]
    fn test_evaluate() {
        let column = flags();
        let not_true = evaluate(&column, &Predicate::not_equal_to(true)).unwrap();
        assert_eq!(not_true.to_vec(), vec![2]);
        assert!(matches!(
            evaluate(&column, &Predicate::IsZero),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_equal_to_column() {
        let a = flags();
        let b = BooleanColumn::from_options("other", &[Some(true), Some(true), Some(true), Some(false)]);
        assert_eq!(a.is_equal_to_column(&b).unwrap().to_vec(), vec![0]);
        assert!(a.is_equal_to_column(&BooleanColumn::new("e")).is_err());
    }
}
