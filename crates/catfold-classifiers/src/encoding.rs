//! One-hot encoding of categorical columns into a sparse indicator matrix.
use std::collections::BTreeSet;

use ndarray::Array2;

use crate::error::{CatfoldError, Result};

/// Binary matrix stored row-wise as sorted lists of active columns (CSR without values).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMatrix {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    ncols: usize,
}

impl IndicatorMatrix {
    /// Build from per-row active column lists. Rows are sorted and deduplicated.
    pub fn from_rows(rows: Vec<Vec<usize>>, ncols: usize) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        indptr.push(0);
        for mut row in rows {
            row.sort_unstable();
            row.dedup();
            if let Some(&last) = row.last() {
                if last >= ncols {
                    return Err(CatfoldError::LengthMismatch {
                        expected: ncols,
                        found: last + 1,
                    });
                }
            }
            indices.extend(row);
            indptr.push(indices.len());
        }
        Ok(Self {
            indptr,
            indices,
            ncols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored ones.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Active columns of `row`, ascending.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.row(row).binary_search(&col).is_ok()
    }

    pub fn dense_row(&self, row: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; self.ncols];
        for &c in self.row(row) {
            out[c] = 1.0;
        }
        out
    }

    /// Dense `f64` copy, as taken by the linfa learners.
    ///
    /// Allocates `nrows * ncols` cells.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.nrows(), self.ncols));
        for r in 0..self.nrows() {
            for &c in self.row(r) {
                out[[r, c]] = 1.0;
            }
        }
        out
    }
}

/// One-hot encoder with per-column sorted category vocabularies.
///
/// Unknown categories at transform time are an error.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    offsets: Vec<usize>,
}

impl OneHotEncoder {
    /// Learn the vocabulary of each column from `rows`.
    ///
    /// Every row must have one value per entry of `columns`.
    pub fn fit<'a, I>(columns: &[String], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut seen: Vec<BTreeSet<&'a str>> = vec![BTreeSet::new(); columns.len()];
        for row in rows {
            if row.len() != columns.len() {
                return Err(CatfoldError::LengthMismatch {
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            for (set, value) in seen.iter_mut().zip(row) {
                set.insert(value.as_str());
            }
        }

        let categories: Vec<Vec<String>> = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();

        let mut offsets = Vec::with_capacity(columns.len());
        let mut total = 0;
        for cats in &categories {
            offsets.push(total);
            total += cats.len();
        }

        Ok(Self {
            columns: columns.to_vec(),
            categories,
            offsets,
        })
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Width of the encoded matrix.
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output column names as `<column>_<category>`.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }

    pub fn transform<R: AsRef<[String]>>(&self, rows: &[R]) -> Result<IndicatorMatrix> {
        let mut encoded = Vec::with_capacity(rows.len());
        for row in rows {
            let row = row.as_ref();
            if row.len() != self.columns.len() {
                return Err(CatfoldError::LengthMismatch {
                    expected: self.columns.len(),
                    found: row.len(),
                });
            }
            let mut active = Vec::with_capacity(row.len());
            for (col, value) in row.iter().enumerate() {
                let idx = self.categories[col]
                    .binary_search_by(|c| c.as_str().cmp(value.as_str()))
                    .map_err(|_| CatfoldError::UnknownCategory {
                        column: self.columns[col].clone(),
                        value: value.clone(),
                    })?;
                active.push(self.offsets[col] + idx);
            }
            encoded.push(active);
        }
        IndicatorMatrix::from_rows(encoded, self.n_features_out())
    }
}
