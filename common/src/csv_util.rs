//! CSV import/export for candidate record rows.

use crate::CandidateRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Read one CSV file of candidate rows. A header row is required.
pub fn read_candidates(path: &Path) -> Result<Vec<CandidateRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CandidateRecord =
            result.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read every `.csv` file directly inside `dir`, sorted by file name so the
/// combined row order is stable.
pub fn read_candidates_in_dir(dir: &Path) -> Result<Vec<CandidateRecord>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut rows = Vec::new();
    for path in paths {
        rows.extend(read_candidates(&path)?);
    }
    Ok(rows)
}

/// Write candidate rows with a header row, creating or truncating `path`.
pub fn write_candidates(path: &Path, rows: &[CandidateRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
