use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::evaluate::FoldScore;

/// Overlay the ROC curve of every scored fold.
pub fn plot_roc_curves(scores: &[FoldScore], title: &str) -> Plot {
    let mut plot = Plot::new();
    for score in scores {
        let trace = Scatter::new(score.roc.fpr.clone(), score.roc.tpr.clone())
            .mode(Mode::Lines)
            .name(&format!("Fold {} (AUC = {:.4})", score.fold, score.auc));
        plot.add_trace(trace);
    }

    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("grey").dash(DashType::Dash));
    plot.add_trace(chance);

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate"))
            .y_axis(Axis::new().title("True positive rate")),
    );
    plot
}

/// Bar chart of AUC per fold.
pub fn plot_fold_auc(scores: &[FoldScore], title: &str) -> Plot {
    let folds: Vec<String> = scores.iter().map(|s| format!("Fold {}", s.fold)).collect();
    let aucs: Vec<f64> = scores.iter().map(|s| s.auc).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(folds, aucs).name("AUC"));
    plot.set_layout(
        Layout::new()
            .title(title)
            .y_axis(Axis::new().title("ROC AUC")),
    );
    plot
}
