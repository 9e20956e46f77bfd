//! Stratified k-fold assignment.
//!
//! Records are shuffled once, then dealt into folds so that every fold keeps
//! the global class proportions. The partition matches scikit-learn's
//! `StratifiedKFold` without shuffling, applied to the shuffled rows.
use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data_handling::Dataset;
use crate::error::{CatfoldError, Result};
use crate::io::{read_dataset, write_dataset};

/// Name of the fold id column added to the dataset.
pub const FOLD_COLUMN: &str = "kfold";

/// Default number of folds.
pub const DEFAULT_N_FOLDS: usize = 5;

/// Stratified k-fold splitter.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: Option<u64>,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(CatfoldError::InvalidFoldCount(n_splits));
        }
        Ok(Self {
            n_splits,
            seed: None,
        })
    }

    /// Fix the shuffle seed. `None` draws a fresh seed from the OS on every call.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Assign a fold id to each label without reordering.
    ///
    /// Classes are indexed by first appearance. The sorted class sequence is
    /// dealt round-robin across folds to obtain per-fold class allocations, and
    /// each class's records are then given to folds in contiguous blocks of
    /// those sizes.
    pub fn split_labels<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        if labels.len() < self.n_splits {
            return Err(CatfoldError::InsufficientRecords {
                count: labels.len(),
                n_folds: self.n_splits,
            });
        }

        let mut class_names: Vec<&str> = Vec::new();
        let mut class_lookup: HashMap<&str, usize> = HashMap::new();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                *class_lookup.entry(label).or_insert_with(|| {
                    class_names.push(label);
                    class_names.len() - 1
                })
            })
            .collect();

        let n_classes = class_names.len();
        let mut class_counts = vec![0usize; n_classes];
        for &c in &encoded {
            class_counts[c] += 1;
        }

        for (class, &count) in class_counts.iter().enumerate() {
            if count < self.n_splits {
                return Err(CatfoldError::InsufficientData {
                    class: class_names[class].to_string(),
                    count,
                    n_folds: self.n_splits,
                });
            }
        }

        // allocation[fold][class]: how many records of `class` land in `fold`.
        let mut allocation = vec![vec![0usize; n_classes]; self.n_splits];
        let mut position = 0usize;
        for (class, &count) in class_counts.iter().enumerate() {
            for _ in 0..count {
                allocation[position % self.n_splits][class] += 1;
                position += 1;
            }
        }

        let mut class_queues: Vec<Vec<usize>> = (0..n_classes)
            .map(|class| {
                let mut queue = Vec::with_capacity(class_counts[class]);
                for (fold, per_class) in allocation.iter().enumerate() {
                    queue.extend(std::iter::repeat(fold).take(per_class[class]));
                }
                queue.reverse();
                queue
            })
            .collect();

        // Each queue holds exactly class_counts[class] entries, so pop never fails.
        Ok(encoded
            .iter()
            .map(|&class| class_queues[class].pop().unwrap_or(0))
            .collect())
    }

    /// Shuffle `dataset` and write a fold id column on every record.
    ///
    /// The returned dataset is in shuffled order. An existing `fold_column`
    /// is overwritten.
    pub fn assign(
        &self,
        dataset: &Dataset,
        target_column: &str,
        fold_column: &str,
    ) -> Result<Dataset> {
        let labels = dataset.required_column(target_column)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(&mut rng);

        let shuffled_labels: Vec<&str> = order.iter().map(|&i| labels[i]).collect();
        let folds = self.split_labels(&shuffled_labels)?;

        let mut shuffled = dataset.reorder(&order);
        shuffled.set_column(fold_column, folds.iter().map(|f| f.to_string()).collect())?;

        let mut fold_sizes = vec![0usize; self.n_splits];
        for &f in &folds {
            fold_sizes[f] += 1;
        }
        log::debug!("Fold sizes: {:?}", fold_sizes);

        Ok(shuffled)
    }
}

/// Shuffle `dataset` and add a stratified `kfold` column with `k` folds.
pub fn assign_folds(
    dataset: &Dataset,
    target_column: &str,
    k: usize,
    seed: Option<u64>,
) -> Result<Dataset> {
    StratifiedKFold::new(k)?
        .with_seed(seed)
        .assign(dataset, target_column, FOLD_COLUMN)
}

/// Read `input`, assign stratified folds and write the augmented dataset to `output`.
///
/// Nothing is written when reading or fold assignment fails.
pub fn assign_folds_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    target_column: &str,
    k: usize,
    seed: Option<u64>,
) -> anyhow::Result<Dataset> {
    let dataset = read_dataset(&input)?;
    log::info!(
        "Loaded {} records from {}",
        dataset.len(),
        input.as_ref().display()
    );
    if let Ok(counts) = dataset.value_counts(target_column) {
        log::info!("Class counts for '{}': {:?}", target_column, counts);
    }

    let augmented = assign_folds(&dataset, target_column, k, seed)?;
    write_dataset(&augmented, &output)
        .with_context(|| format!("Failed to write folds to {}", output.as_ref().display()))?;
    log::info!(
        "Wrote {} records with {} folds to {}",
        augmented.len(),
        k,
        output.as_ref().display()
    );
    Ok(augmented)
}
