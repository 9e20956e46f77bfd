//! In-memory tabular dataset with named string columns.
use std::collections::HashMap;

use crate::error::{CatfoldError, Result};

/// An ordered collection of records sharing one header.
///
/// Values are kept as strings; an empty CSV field is stored as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Create a dataset, checking that every record matches the header width.
    pub fn new(columns: Vec<String>, records: Vec<Vec<Option<String>>>) -> Result<Self> {
        for record in &records {
            if record.len() != columns.len() {
                return Err(CatfoldError::LengthMismatch {
                    expected: columns.len(),
                    found: record.len(),
                });
            }
        }
        Ok(Self { columns, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<Option<String>>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Index of `name` in the header, or a schema error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CatfoldError::Schema {
                column: name.to_string(),
            })
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.records
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|v| v.as_deref())
    }

    /// All values of a column, failing on the first missing one.
    pub fn required_column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record[idx]
                    .as_deref()
                    .ok_or_else(|| CatfoldError::MissingValue {
                        column: name.to_string(),
                        row,
                    })
            })
            .collect()
    }

    /// Parse the target column into 0/1 labels.
    ///
    /// Accepts integral spellings such as `1` or `1.0`.
    pub fn binary_labels(&self, target_column: &str) -> Result<Vec<u8>> {
        let values = self.required_column(target_column)?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match parse_integral(value) {
                Some(0) => Ok(0),
                Some(1) => Ok(1),
                _ => Err(CatfoldError::InvalidLabel {
                    row,
                    value: value.to_string(),
                }),
            })
            .collect()
    }

    /// Parse the fold column into fold ids.
    pub fn fold_ids(&self, fold_column: &str) -> Result<Vec<usize>> {
        let values = self.required_column(fold_column)?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                parse_integral(value).ok_or_else(|| CatfoldError::InvalidValue {
                    column: fold_column.to_string(),
                    row,
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Count records per distinct value of a column, in order of first appearance.
    pub fn value_counts(&self, name: &str) -> Result<Vec<(String, usize)>> {
        let values = self.required_column(name)?;
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut lookup: HashMap<&str, usize> = HashMap::new();
        for value in values {
            match lookup.get(value) {
                Some(&i) => order[i].1 += 1,
                None => {
                    lookup.insert(value, order.len());
                    order.push((value.to_string(), 1));
                }
            }
        }
        Ok(order)
    }

    /// Return a new dataset whose records follow `order`.
    pub fn reorder(&self, order: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: order.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// Replace the values of `name`, appending the column if it does not exist.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.records.len() {
            return Err(CatfoldError::LengthMismatch {
                expected: self.records.len(),
                found: values.len(),
            });
        }

        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (record, value) in self.records.iter_mut().zip(values) {
                    record[idx] = Some(value);
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (record, value) in self.records.iter_mut().zip(values) {
                    record.push(Some(value));
                }
            }
        }
        Ok(())
    }
}

/// Parse `"3"` or `"3.0"` into `3`. Rejects negatives and fractions.
fn parse_integral(value: &str) -> Option<usize> {
    let value = value.trim();
    if let Ok(v) = value.parse::<usize>() {
        return Some(v);
    }
    let v = value.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
        Some(v as usize)
    } else {
        None
    }
}
