//! Split a CSV into overlapping reviewer shards.
//!
//! The input is ceiling-divided into `n` chunks; each shard then carries a
//! copy of the head of the next chunk in ring order, so adjacent reviewers
//! judge some of the same rows and their agreement can be measured later.

use anyhow::{Context, Result, ensure};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Start/end bounds of `n` ceiling-sized chunks over `total` rows. Later
/// chunks may run short or empty when `n` does not divide `total`.
pub fn chunk_bounds(total: usize, n: usize) -> Vec<(usize, usize)> {
    let chunk_size = total.div_ceil(n);
    (0..n)
        .map(|i| {
            let start = (i * chunk_size).min(total);
            let end = ((i + 1) * chunk_size).min(total);
            (start, end)
        })
        .collect()
}

/// How many rows of the next chunk are copied into a shard as overlap.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn overlap_len(next_len: usize, gap: f64) -> usize {
    (next_len as f64 * gap).ceil() as usize
}

/// Split `input` into `n` shards named `part_<i>.csv` under a sibling
/// `<stem>_split` directory, returning that directory.
///
/// # Errors
/// Returns an error for a zero shard count, an unreadable input, or any
/// write failure.
pub fn split_csv(input: &Path, n: usize, gap: f64) -> Result<PathBuf> {
    ensure!(n > 0, "shard count must be positive");

    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let header = reader
        .headers()
        .with_context(|| format!("missing header row in {}", input.display()))?
        .clone();
    let rows: Vec<StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .with_context(|| format!("malformed row in {}", input.display()))?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    let output_dir = input.with_file_name(format!("{stem}_split"));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let bounds = chunk_bounds(rows.len(), n);
    for i in 0..n {
        let (start, end) = bounds[i];
        let (next_start, next_end) = bounds[(i + 1) % n];
        let overlap = overlap_len(next_end - next_start, gap);

        let path = output_dir.join(format!("part_{}.csv", i + 1));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        writer.write_record(&header)?;
        for row in &rows[start..end] {
            writer.write_record(row)?;
        }
        for row in rows[next_start..next_end].iter().take(overlap) {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;
    }

    Ok(output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_chunk_bounds_even_division() {
        assert_eq!(chunk_bounds(10, 5), vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 10)]);
    }

    #[test_log::test]
    fn test_chunk_bounds_trailing_short_chunks() {
        // chunk size ceil(7/3) = 3: the last chunk runs short.
        assert_eq!(chunk_bounds(7, 3), vec![(0, 3), (3, 6), (6, 7)]);
        // 5 rows in 4 chunks of size 2 leaves the last chunk empty.
        assert_eq!(chunk_bounds(5, 4), vec![(0, 2), (2, 4), (4, 5), (5, 5)]);
    }

    #[test_log::test]
    fn test_overlap_len_rounds_up() {
        assert_eq!(overlap_len(10, 0.2), 2);
        assert_eq!(overlap_len(3, 0.2), 1);
        assert_eq!(overlap_len(0, 0.2), 0);
    }

    fn write_input(path: &Path, rows: usize) {
        let mut writer = csv::Writer::from_path(path).unwrap();
        writer.write_record(["id", "name"]).unwrap();
        for i in 0..rows {
            writer
                .write_record([i.to_string(), format!("name{i}")])
                .unwrap();
        }
        writer.flush().unwrap();
    }

    fn read_column(path: &Path, col: usize) -> Vec<String> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap()[col].to_string())
            .collect()
    }

    #[test_log::test]
    fn test_split_appends_ring_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.csv");
        write_input(&input, 10);

        let out = split_csv(&input, 5, 0.2).unwrap();
        assert_eq!(out, dir.path().join("records_split"));

        // Each shard holds its 2 rows plus ceil(2 * 0.2) = 1 overlap row
        // from the next chunk.
        let part1 = read_column(&out.join("part_1.csv"), 0);
        assert_eq!(part1, vec!["0", "1", "2"]);

        // The last shard wraps around to the first chunk's head.
        let part5 = read_column(&out.join("part_5.csv"), 0);
        assert_eq!(part5, vec!["8", "9", "0"]);
    }

    #[test_log::test]
    fn test_split_rejects_zero_shards() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.csv");
        write_input(&input, 4);
        assert!(split_csv(&input, 0, 0.2).is_err());
    }

    #[test_log::test]
    fn test_split_missing_input_is_an_error() {
        assert!(split_csv(Path::new("does-not-exist.csv"), 2, 0.2).is_err());
    }
}
