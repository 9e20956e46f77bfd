//! Ranking metrics for binary classifiers.
use std::cmp::Ordering;

use crate::error::{CatfoldError, Result};

/// Points of a ROC curve, ordered by decreasing threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Score threshold of each point; the first is `+inf` (nothing predicted positive).
    pub thresholds: Vec<f64>,
}

fn check_inputs(y_true: &[u8], y_score: &[f64]) -> Result<(usize, usize)> {
    if y_true.len() != y_score.len() {
        return Err(CatfoldError::LengthMismatch {
            expected: y_true.len(),
            found: y_score.len(),
        });
    }
    if y_score.iter().any(|s| s.is_nan()) {
        return Err(CatfoldError::UndefinedMetric {
            reason: "scores contain NaN".to_string(),
        });
    }
    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(CatfoldError::UndefinedMetric {
            reason: "only one class present in y_true".to_string(),
        });
    }
    Ok((n_pos, n_neg))
}

/// Area under the ROC curve.
///
/// Computed from the rank-sum (Mann-Whitney U) statistic with tied scores
/// sharing their average rank, so ties count as half a correct ordering.
/// Labels other than `1` are treated as negatives.
pub fn roc_auc_score(y_true: &[u8], y_score: &[f64]) -> Result<f64> {
    let (n_pos, n_neg) = check_inputs(y_true, y_score)?;

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut pos_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && y_score[order[end]] == y_score[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1 ..= end.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let group_pos = order[start..end].iter().filter(|&&i| y_true[i] == 1).count();
        pos_rank_sum += avg_rank * group_pos as f64;
        start = end;
    }

    let n_pos_f = n_pos as f64;
    let u = pos_rank_sum - n_pos_f * (n_pos_f + 1.0) / 2.0;
    Ok(u / (n_pos_f * n_neg as f64))
}

/// ROC curve with one point per distinct score.
pub fn roc_curve(y_true: &[u8], y_score: &[f64]) -> Result<RocCurve> {
    let (n_pos, n_neg) = check_inputs(y_true, y_score)?;

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[b]
            .partial_cmp(&y_score[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    let (mut tp, mut fp) = (0usize, 0usize);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_group = k + 1 == order.len() || y_score[order[k + 1]] != y_score[i];
        if last_of_group {
            fpr.push(fp as f64 / n_neg as f64);
            tpr.push(tp as f64 / n_pos as f64);
            thresholds.push(y_score[i]);
        }
    }

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}

impl RocCurve {
    /// Trapezoidal area under the curve.
    pub fn area(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum()
    }
}
