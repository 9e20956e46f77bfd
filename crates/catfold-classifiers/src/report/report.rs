use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, PreEscaped, DOCTYPE};

use crate::evaluate::{CrossValidationSummary, FoldOutcome, FoldScore};
use crate::report::plots::{plot_fold_auc, plot_roc_curves};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Render the cross-validation results for one model as an HTML page.
pub fn render_cv_report(model: &str, outcomes: &[FoldOutcome]) -> String {
    let summary = CrossValidationSummary::from_outcomes(model, outcomes);
    let scores: Vec<FoldScore> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().cloned())
        .collect();

    let rows: Vec<(usize, String, String)> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(s) => (
                o.fold,
                format!("{:.6}", s.auc),
                format!("{} train / {} valid, {} features", s.n_train, s.n_valid, s.n_features),
            ),
            Err(e) => (o.fold, e.kind().to_string(), e.to_string()),
        })
        .collect();

    let roc_html = plot_roc_curves(&scores, "ROC curve per fold").to_inline_html(Some("roc-curves"));
    let auc_html = plot_fold_auc(&scores, "AUC per fold").to_inline_html(Some("fold-auc"));
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "catfold report: " (model) }
                script src=(PLOTLY_CDN) {}
            }
            body {
                h1 { "Cross-validation report: " (model) }
                p { "Generated " (generated) }
                p {
                    "Scored folds: " (summary.n_scored)
                    ", failed folds: " (summary.n_failed)
                    ", mean AUC: " (format!("{:.4}", summary.mean_auc))
                    ", std: " (format!("{:.4}", summary.std_auc))
                }
                table {
                    tr { th { "Fold" } th { "AUC" } th { "Details" } }
                    @for (fold, auc, details) in &rows {
                        tr { td { (fold) } td { (auc) } td { (details) } }
                    }
                }
                (PreEscaped(roc_html))
                (PreEscaped(auc_html))
            }
        }
    };
    markup.into_string()
}

/// Write the HTML cross-validation report to `path`.
pub fn write_cv_report<P: AsRef<Path>>(model: &str, outcomes: &[FoldOutcome], path: P) -> Result<()> {
    let html = render_cv_report(model, outcomes);
    std::fs::write(&path, html)
        .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))?;
    log::info!("Report written to {}", path.as_ref().display());
    Ok(())
}
