//! Byte-backed boolean column.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::selection::Selection;

const TRUE: i8 = 1;
const FALSE: i8 = 0;
const MISSING: i8 = i8::MIN;

/// Booleans stored one byte per row: `1`, `0`, or `i8::MIN` for missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanColumn {
    name: String,
    values: Vec<i8>,
}

fn encode(value: Option<bool>) -> i8 {
    match value {
        Some(true) => TRUE,
        Some(false) => FALSE,
        None => MISSING,
    }
}

fn decode(byte: i8) -> Option<bool> {
    match byte {
        MISSING => None,
        FALSE => Some(false),
        _ => Some(true),
    }
}

/// Parse the usual spellings of a boolean, case-insensitively.
pub(crate) fn parse_bool(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(Error::invalid(format!("'{text}' is not a boolean"))),
    }
}

impl BooleanColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn from_options(name: impl Into<String>, values: &[Option<bool>]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| encode(*v)).collect(),
        }
    }

    pub fn from_bools(name: impl Into<String>, values: &[bool]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| encode(Some(*v))).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append(&mut self, value: bool) -> &mut Self {
        self.values.push(encode(Some(value)));
        self
    }

    pub fn append_missing(&mut self) -> &mut Self {
        self.values.push(MISSING);
        self
    }

    /// `None` when the row is missing.
    pub fn get(&self, row: usize) -> Result<Option<bool>> {
        self.values
            .get(row)
            .map(|b| decode(*b))
            .ok_or_else(|| Error::out_of_range(row, self.values.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<bool>> + '_ {
        self.values.iter().map(|b| decode(*b))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        self.values.get(row) == Some(&MISSING)
    }

    pub fn set(&mut self, row: usize, value: Option<bool>) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(row)
            .ok_or_else(|| Error::out_of_range(row, len))?;
        *slot = encode(value);
        Ok(())
    }

    pub fn set_missing(&mut self, row: usize) -> Result<()> {
        self.set(row, None)
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|b| **b == MISSING).count()
    }

    pub fn count_true(&self) -> usize {
        self.values.iter().filter(|b| **b == TRUE).count()
    }

    pub fn count_false(&self) -> usize {
        self.values.iter().filter(|b| **b == FALSE).count()
    }

    pub fn remove(&mut self, row: usize) -> Result<Option<bool>> {
        if row >= self.values.len() {
            return Err(Error::out_of_range(row, self.values.len()));
        }
        Ok(decode(self.values.remove(row)))
    }

    pub fn subset(&self, selection: &Selection) -> Result<Self> {
        let mut values = Vec::with_capacity(selection.len());
        for row in selection {
            let row = row as usize;
            let byte = self
                .values
                .get(row)
                .ok_or_else(|| Error::out_of_range(row, self.values.len()))?;
            values.push(*byte);
        }
        Ok(Self {
            name: self.name.clone(),
            values,
        })
    }

    pub fn take(&self, rows: &[usize]) -> Result<Self> {
        let mut values = Vec::with_capacity(rows.len());
        for &row in rows {
            let byte = self
                .values
                .get(row)
                .ok_or_else(|| Error::out_of_range(row, self.values.len()))?;
            values.push(*byte);
        }
        Ok(Self {
            name: self.name.clone(),
            values,
        })
    }

    pub fn empty_copy(&self) -> Self {
        Self::new(self.name.clone())
    }

    pub fn unique_count(&self) -> usize {
        usize::from(self.count_true() > 0) + usize::from(self.count_false() > 0)
    }

    pub fn get_string(&self, row: usize) -> Result<String> {
        Ok(match self.get(row)? {
            Some(value) => value.to_string(),
            None => String::new(),
        })
    }

    /// `1.0`, `0.0`, or NaN for missing.
    pub fn as_f64_vec(&self) -> Vec<f64> {
        self.iter()
            .map(|v| match v {
                Some(true) => 1.0,
                Some(false) => 0.0,
                None => f64::NAN,
            })
            .collect()
    }

    pub(crate) fn key_bits(&self, row: usize) -> u64 {
        self.values.get(row).map_or(u64::MAX, |b| *b as u8 as u64)
    }

    /// Missing sorts first, then `false`, then `true`.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match (self.values.get(a), self.values.get(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}
