//! Comma-separated dataset reader and writer.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data_handling::Dataset;

/// Read a CSV file with a header row into a [`Dataset`].
///
/// Empty fields become missing values.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open dataset: {}", path.as_ref().display()))?;

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read dataset header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        records.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }

    log::debug!(
        "Read {} records with {} columns from {}",
        records.len(),
        columns.len(),
        path.as_ref().display()
    );

    Ok(Dataset::new(columns, records)?)
}

/// Write a [`Dataset`] as CSV.
///
/// The file is written next to the destination first and renamed into place,
/// so a failed write never leaves a truncated file at `path`. The staging
/// file is removed again when writing or renaming fails.
pub fn write_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = staging_path(path);

    let result = write_records(dataset, &tmp_path).and_then(|_| {
        std::fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                path.display()
            )
        })
    });
    if result.is_err() && tmp_path.exists() {
        if let Err(e) = std::fs::remove_file(&tmp_path) {
            log::warn!("Could not remove {}: {}", tmp_path.display(), e);
        }
    }
    result
}

fn write_records(dataset: &Dataset, tmp_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(tmp_path)
        .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
    writer
        .write_record(dataset.columns())
        .context("Failed to write header row")?;
    for (row_idx, record) in dataset.records().iter().enumerate() {
        writer
            .write_record(record.iter().map(|v| v.as_deref().unwrap_or("")))
            .with_context(|| format!("Failed to write row {}", row_idx + 1))?;
    }
    writer.flush().context("Failed to flush dataset writer")?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset.csv".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "id,target,nom_0\n0,1,Red\n1,0,\n").unwrap();

        let ds = read_dataset(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(1, 2), None);

        let out = dir.path().join("out.csv");
        write_dataset(&ds, &out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "id,target,nom_0\n0,1,Red\n1,0,\n");
        assert!(!staging_path(&out).exists());
    }

    #[test]
    fn test_failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the destination makes the final rename fail.
        let out = dir.path().join("out.csv");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("keep.txt"), "x").unwrap();

        let ds = Dataset::new(vec!["id".into()], vec![vec![Some("1".into())]]).unwrap();
        let err = write_dataset(&ds, &out).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to move"));
        assert!(!staging_path(&out).exists());
        assert!(out.join("keep.txt").exists());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_dataset("/nonexistent/train.csv").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open dataset"));
    }
}
