//! String predicates. Dictionary columns test each distinct value once.

use regex::Regex;

use super::{unsupported, Comparison, Predicate};
use crate::column::{StringColumn, Value};
use crate::error::{Error, Result};
use crate::selection::Selection;

impl StringColumn {
    pub fn compare_to(&self, op: Comparison, value: &str) -> Selection {
        self.scan_values(|v| op.test(v, value))
    }

    pub fn is_equal_to(&self, value: &str) -> Selection {
        self.scan_values(|v| v == value)
    }

    pub fn is_not_equal_to(&self, value: &str) -> Selection {
        self.scan_values(|v| v != value)
    }

    pub fn is_in(&self, values: &[&str]) -> Selection {
        self.scan_values(|v| values.iter().any(|x| *x == v))
    }

    pub fn is_not_in(&self, values: &[&str]) -> Selection {
        self.scan_values(|v| !values.iter().any(|x| *x == v))
    }

    pub fn starts_with(&self, prefix: &str) -> Selection {
        self.scan_values(|v| v.starts_with(prefix))
    }

    pub fn ends_with(&self, suffix: &str) -> Selection {
        self.scan_values(|v| v.ends_with(suffix))
    }

    pub fn contains_string(&self, needle: &str) -> Selection {
        self.scan_values(|v| v.contains(needle))
    }

    pub fn matches_regex(&self, pattern: &str) -> Result<Selection> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::invalid(format!("invalid pattern '{pattern}': {e}")))?;
        Ok(self.scan_values(|v| regex.is_match(v)))
    }

    pub fn equals_ignore_case(&self, value: &str) -> Selection {
        let wanted = value.to_lowercase();
        self.scan_values(|v| v.to_lowercase() == wanted)
    }

    /// Lengths are counted in characters.
    pub fn is_longer_than(&self, length: usize) -> Selection {
        self.scan_values(|v| v.chars().count() > length)
    }

    pub fn is_shorter_than(&self, length: usize) -> Selection {
        self.scan_values(|v| v.chars().count() < length)
    }

    pub fn length_equals(&self, length: usize) -> Selection {
        self.scan_values(|v| v.chars().count() == length)
    }

    pub fn is_upper_case(&self) -> Selection {
        self.scan_values(|v| v.chars().all(char::is_uppercase))
    }

    pub fn is_lower_case(&self) -> Selection {
        self.scan_values(|v| v.chars().all(char::is_lowercase))
    }

    pub fn is_alpha(&self) -> Selection {
        self.scan_values(|v| v.chars().all(char::is_alphabetic))
    }

    pub fn is_numeric(&self) -> Selection {
        self.scan_values(|v| v.chars().all(|c| c.is_ascii_digit()))
    }

    pub fn is_alpha_numeric(&self) -> Selection {
        self.scan_values(|v| v.chars().all(char::is_alphanumeric))
    }

    pub fn is_equal_to_column(&self, other: &StringColumn) -> Result<Selection> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let rows: Vec<u32> = self
            .iter()
            .zip(other.iter())
            .enumerate()
            .filter(|(_, (a, b))| !a.is_empty() && a == b)
            .map(|(row, _)| row as u32)
            .collect();
        Ok(Selection::from_sorted_rows(&rows, self.len()))
    }
}

fn operand<'a>(predicate: &Predicate, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::unsupported(format!("{predicate:?} needs a string operand, got {value:?}")))
}

pub(crate) fn evaluate(column: &StringColumn, predicate: &Predicate) -> Result<Selection> {
    Ok(match predicate {
        Predicate::Compare(op, value) => column.compare_to(*op, operand(predicate, value)?),
        Predicate::BetweenInclusive(low, high) => {
            let (low, high) = (operand(predicate, low)?, operand(predicate, high)?);
            column.scan_values(|v| v >= low && v <= high)
        }
        Predicate::BetweenExclusive(low, high) => {
            let (low, high) = (operand(predicate, low)?, operand(predicate, high)?);
            column.scan_values(|v| v > low && v < high)
        }
        Predicate::In(values) => {
            let values = values.iter().map(|v| operand(predicate, v)).collect::<Result<Vec<_>>>()?;
            column.is_in(&values)
        }
        Predicate::NotIn(values) => {
            let values = values.iter().map(|v| operand(predicate, v)).collect::<Result<Vec<_>>>()?;
            column.is_not_in(&values)
        }
        Predicate::StartsWith(prefix) => column.starts_with(prefix),
        Predicate::EndsWith(suffix) => column.ends_with(suffix),
        Predicate::ContainsString(needle) => column.contains_string(needle),
        Predicate::MatchesRegex(pattern) => column.matches_regex(pattern)?,
        Predicate::EqualsIgnoreCase(value) => column.equals_ignore_case(value),
        Predicate::IsLongerThan(n) => column.is_longer_than(*n),
        Predicate::IsShorterThan(n) => column.is_shorter_than(*n),
        Predicate::LengthEquals(n) => column.length_equals(*n),
        Predicate::IsUpperCase => column.is_upper_case(),
        Predicate::IsLowerCase => column.is_lower_case(),
        Predicate::IsAlpha => column.is_alpha(),
        Predicate::IsNumeric => column.is_numeric(),
        Predicate::IsAlphaNumeric => column.is_alpha_numeric(),
        other => return Err(unsupported(other, column.column_type())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(values: &[&str]) -> [StringColumn; 2] {
        [
            StringColumn::from_strs("s", values),
            StringColumn::plain_from_strs("s", values),
        ]
    }

    #[test]
    fn test_equality_and_membership() {
        for column in both(&["apple", "Banana", "", "apple", "cherry"]) {
            assert_eq!(column.is_equal_to("apple").to_vec(), vec![0, 3]);
            assert_eq!(column.is_not_equal_to("apple").to_vec(), vec![1, 4]);
            assert_eq!(column.is_in(&["cherry", "Banana"]).to_vec(), vec![1, 4]);
            assert_eq!(column.is_not_in(&["cherry"]).to_vec(), vec![0, 1, 3]);
            assert_eq!(column.equals_ignore_case("BANANA").to_vec(), vec![1]);
        }
    }

    #[test]
    fn test_substring_predicates() {
        for column in both(&["apple", "Banana", "", "pineapple"]) {
            assert_eq!(column.starts_with("app").to_vec(), vec![0]);
            assert_eq!(column.ends_with("apple").to_vec(), vec![0, 3]);
            assert_eq!(column.contains_string("an").to_vec(), vec![1]);
            assert_eq!(column.matches_regex("^[A-Z]").unwrap().to_vec(), vec![1]);
        }
    }

    #[test]
    fn test_invalid_regex() {
        let column = StringColumn::from_strs("s", &["a"]);
        assert!(matches!(column.matches_regex("("), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_length_predicates_count_chars() {
        let column = StringColumn::from_strs("s", &["héllo", "hi", ""]);
        assert_eq!(column.length_equals(5).to_vec(), vec![0]);
        assert_eq!(column.is_longer_than(2).to_vec(), vec![0]);
        assert_eq!(column.is_shorter_than(3).to_vec(), vec![1]);
    }

    #[test]
    fn test_character_classes() {
        let column = StringColumn::from_strs("s", &["ABC", "abc", "a1", "123", "A b", ""]);
        assert_eq!(column.is_upper_case().to_vec(), vec![0]);
        assert_eq!(column.is_lower_case().to_vec(), vec![1]);
        assert_eq!(column.is_alpha().to_vec(), vec![0, 1]);
        assert_eq!(column.is_numeric().to_vec(), vec![3]);
        assert_eq!(column.is_alpha_numeric().to_vec(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_evaluate_ordering_compare() {
        let column = StringColumn::from_strs("s", &["b", "a", "c", ""]);
        let after_a = evaluate(&column, &Predicate::greater_than("a")).unwrap();
        assert_eq!(after_a.to_vec(), vec![0, 2]);
        assert!(matches!(
            evaluate(&column, &Predicate::greater_than(3)),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            evaluate(&column, &Predicate::IsTrue),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_equal_to_column() {
        let a = StringColumn::from_strs("a", &["x", "", "z"]);
        let b = StringColumn::plain_from_strs("b", &["x", "", "y"]);
        assert_eq!(a.is_equal_to_column(&b).unwrap().to_vec(), vec![0]);
        assert!(a.is_equal_to_column(&StringColumn::plain("e")).is_err());
    }
}
