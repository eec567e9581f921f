//! Agreement statistics across reviewer shards.
//!
//! Shards are per-reviewer CSV exports arranged as a logical ring: each
//! shard carries a slice of overlap rows copied from the head of the next
//! shard, so adjacent reviewers judge some of the same names. Two rates are
//! computed per shard: how many of its publication numbers exist in the
//! authoritative table, and how often its verdicts agree with the next
//! reviewer's on the overlapping names.

use crate::{CandidateRecord, LOW_CONSISTENCY_RATE, LOW_EXISTENCE_RATE, csv_util};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// JSON field holding the authorization number in the authoritative table.
pub const AUTHORIZATION_NUMBER_KEY: &str = "authorization_number";

/// The trusted patent-authorization lookup, keyed by authorization number.
#[derive(Debug, Default)]
pub struct AuthorityTable {
    entries: HashMap<String, Value>,
}

impl AuthorityTable {
    /// Load the table from a JSON array of objects. Entries without an
    /// authorization number are skipped.
    ///
    /// # Errors
    /// Returns an error if the file is unreadable or not a JSON array.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read authority table {}", path.display()))?;
        let items: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("authority table {} is not a JSON array", path.display()))?;

        let mut entries = HashMap::new();
        for item in items {
            match item.get(AUTHORIZATION_NUMBER_KEY).and_then(Value::as_str) {
                Some(number) => {
                    entries.insert(number.to_string(), item);
                }
                None => debug!("authority entry without {AUTHORIZATION_NUMBER_KEY} skipped"),
            }
        }
        info!("authority table loaded: {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Build a table from bare authorization numbers.
    pub fn from_numbers<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = numbers
            .into_iter()
            .map(|n| (n.into(), Value::Null))
            .collect();
        Self { entries }
    }

    pub fn contains(&self, number: &str) -> bool {
        self.entries.contains_key(number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fraction of rows whose publication number appears in the authority
/// table, plus the numbers that did not.
#[allow(clippy::cast_precision_loss)]
pub fn existence_rate<'a>(
    rows: &'a [CandidateRecord],
    authority: &AuthorityTable,
) -> (f64, Vec<&'a str>) {
    let mut exist = 0usize;
    let mut missing = Vec::new();
    for row in rows {
        if row.patent_publication_number.is_empty() {
            debug!("record {} has no publication number", row.record_id);
            continue;
        }
        if authority.contains(&row.patent_publication_number) {
            exist += 1;
        } else {
            missing.push(row.patent_publication_number.as_str());
        }
    }
    if rows.is_empty() {
        (0.0, missing)
    } else {
        (exist as f64 / rows.len() as f64, missing)
    }
}

/// The name -> verdict sample drawn from the head of the next shard.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn sample_verdicts(next_rows: &[CandidateRecord], gap: f64) -> HashMap<String, String> {
    let take = (next_rows.len() as f64 * gap).ceil() as usize;
    next_rows
        .iter()
        .take(take)
        .map(|row| (row.name.clone(), row.have_patent_fixed.clone()))
        .collect()
}

/// Agreement of this shard's verdicts with the sampled verdicts from the
/// next shard. `None` when no names overlap.
#[allow(clippy::cast_precision_loss)]
pub fn consistency_rate(
    rows: &[CandidateRecord],
    sample: &HashMap<String, String>,
) -> Option<f64> {
    let mut matched = 0usize;
    let mut agreed = 0usize;
    for row in rows {
        if let Some(verdict) = sample.get(&row.name) {
            matched += 1;
            if *verdict == row.have_patent_fixed {
                agreed += 1;
            }
        }
    }
    (matched > 0).then(|| agreed as f64 / matched as f64)
}

/// Statistics for one processed shard.
#[derive(Debug, Clone)]
pub struct ShardReport {
    pub path: PathBuf,
    pub rows: usize,
    pub existence_rate: f64,
    pub consistency_rate: f64,
}

/// Per-shard reports plus the averages over every processed shard.
#[derive(Debug, Clone)]
pub struct CheckSummary {
    pub reports: Vec<ShardReport>,
    pub avg_existence_rate: f64,
    pub avg_consistency_rate: f64,
}

/// Run the ring check across `shards`.
///
/// Missing, unreadable and empty shard files are logged and skipped; the
/// run continues with the rest. The consistency sample always comes from
/// the next remaining shard in ring order, wrapping around at the end.
///
/// # Errors
/// Returns an error if the authority table is empty or no shard could be
/// processed at all.
#[allow(clippy::cast_precision_loss)]
pub fn check_shards(
    shards: &[PathBuf],
    gap: f64,
    authority: &AuthorityTable,
) -> Result<CheckSummary> {
    if authority.is_empty() {
        bail!("cannot check shards against an empty authority table");
    }

    let present: Vec<&PathBuf> = shards
        .iter()
        .filter(|path| {
            let found = path.exists();
            if !found {
                warn!("shard file missing, skipped: {}", path.display());
            }
            found
        })
        .collect();
    if present.is_empty() {
        bail!("none of the shard files exist");
    }

    let mut reports = Vec::new();
    let mut total_existence = 0.0;
    let mut total_consistency = 0.0;

    for (i, path) in present.iter().enumerate() {
        info!(
            "checking shard [{}/{}]: {}",
            i + 1,
            present.len(),
            path.display()
        );

        let rows = match csv_util::read_candidates(path) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("unreadable shard skipped: {e:#}");
                continue;
            }
        };
        if rows.is_empty() {
            warn!("empty shard skipped: {}", path.display());
            continue;
        }

        let (existence, missing) = existence_rate(&rows, authority);
        if existence < LOW_EXISTENCE_RATE {
            warn!(
                "low patent existence rate in {}: {:.2}%",
                path.display(),
                existence * 100.0
            );
            if !missing.is_empty() {
                debug!("first missing numbers: {}", missing[..missing.len().min(3)].join(", "));
            }
        }

        // Cross-check against the head of the next shard in the ring.
        let next_path = present[(i + 1) % present.len()];
        let consistency = match csv_util::read_candidates(next_path) {
            Ok(next_rows) if next_rows.is_empty() => {
                warn!("cross-check source is empty: {}", next_path.display());
                0.0
            }
            Ok(next_rows) => {
                let sample = sample_verdicts(&next_rows, gap);
                match consistency_rate(&rows, &sample) {
                    Some(rate) => rate,
                    None => {
                        warn!(
                            "no overlapping names between {} and {}",
                            path.display(),
                            next_path.display()
                        );
                        0.0
                    }
                }
            }
            Err(e) => {
                warn!("cross-check source unreadable: {e:#}");
                0.0
            }
        };
        if consistency < LOW_CONSISTENCY_RATE {
            warn!(
                "low cross-review consistency in {}: {:.2}%",
                path.display(),
                consistency * 100.0
            );
        }

        total_existence += existence;
        total_consistency += consistency;
        reports.push(ShardReport {
            path: (*path).clone(),
            rows: rows.len(),
            existence_rate: existence,
            consistency_rate: consistency,
        });
    }

    if reports.is_empty() {
        bail!("no shard file could be processed");
    }

    let processed = reports.len() as f64;
    Ok(CheckSummary {
        avg_existence_rate: total_existence / processed,
        avg_consistency_rate: total_consistency / processed,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NAME_UNKNOWN, PATENT_ABSENT, PATENT_PRESENT};

    fn rec(id: u32, name: &str, verdict: &str, number: &str) -> CandidateRecord {
        CandidateRecord {
            record_id: id,
            name: name.to_string(),
            count: 1,
            preprocessed_name: String::new(),
            key_name: String::new(),
            have_patent: String::new(),
            now_name: NAME_UNKNOWN.to_string(),
            have_patent_fixed: verdict.to_string(),
            patent_publication_number: number.to_string(),
        }
    }

    #[test_log::test]
    fn test_existence_rate_counts_known_numbers() {
        let authority = AuthorityTable::from_numbers(["CN1B", "CN2B"]);
        let rows = vec![
            rec(1, "a", PATENT_PRESENT, "CN1B"),
            rec(2, "b", PATENT_PRESENT, "CN2B"),
            rec(3, "c", PATENT_PRESENT, "CN9B"),
            rec(4, "d", PATENT_ABSENT, "CN8B"),
        ];
        let (rate, missing) = existence_rate(&rows, &authority);
        assert!((rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(missing, vec!["CN9B", "CN8B"]);
    }

    #[test_log::test]
    fn test_sample_takes_ceiling_of_gap() {
        let rows: Vec<_> = (0..5)
            .map(|i| rec(i, &format!("n{i}"), PATENT_PRESENT, "CN1B"))
            .collect();
        // ceil(5 * 0.2) = 1
        assert_eq!(sample_verdicts(&rows, 0.2).len(), 1);
        // ceil(5 * 0.5) = 3
        assert_eq!(sample_verdicts(&rows, 0.5).len(), 3);
    }

    #[test_log::test]
    fn test_consistency_rate_over_overlap() {
        let rows = vec![
            rec(1, "alpha", PATENT_PRESENT, "CN1B"),
            rec(2, "beta", PATENT_ABSENT, "CN2B"),
            rec(3, "gamma", PATENT_PRESENT, "CN3B"),
        ];
        let mut sample = HashMap::new();
        sample.insert("alpha".to_string(), PATENT_PRESENT.to_string());
        sample.insert("beta".to_string(), PATENT_PRESENT.to_string());

        // Two overlapping names, one agreeing verdict.
        let rate = consistency_rate(&rows, &sample).unwrap();
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_consistency_rate_none_without_overlap() {
        let rows = vec![rec(1, "alpha", PATENT_PRESENT, "CN1B")];
        assert_eq!(consistency_rate(&rows, &HashMap::new()), None);
    }

    #[test_log::test]
    fn test_check_shards_ring_wraps_around() {
        let dir = tempfile::tempdir().unwrap();
        let authority = AuthorityTable::from_numbers(["CN1B", "CN2B"]);

        // Shard one carries an overlap row judged the same way in shard two;
        // shard two's overlap row disagrees with shard one's head.
        let shard1 = dir.path().join("part_1.csv");
        crate::csv_util::write_candidates(
            &shard1,
            &[
                rec(1, "alpha", PATENT_PRESENT, "CN1B"),
                rec(2, "beta", PATENT_PRESENT, "CN2B"),
            ],
        )
        .unwrap();
        let shard2 = dir.path().join("part_2.csv");
        crate::csv_util::write_candidates(
            &shard2,
            &[
                rec(3, "beta", PATENT_PRESENT, "CN2B"),
                rec(4, "alpha", PATENT_ABSENT, "CN9B"),
            ],
        )
        .unwrap();

        // gap 0.5 samples the first row of the next shard.
        let summary =
            check_shards(&[shard1, shard2], 0.5, &authority).unwrap();

        assert_eq!(summary.reports.len(), 2);
        // Shard 1 vs head of shard 2: "beta" agrees.
        assert!((summary.reports[0].consistency_rate - 1.0).abs() < f64::EPSILON);
        // Shard 2 wraps to head of shard 1: "alpha" disagrees.
        assert!(summary.reports[1].consistency_rate.abs() < f64::EPSILON);
        // Existence: shard 1 full, shard 2 half.
        assert!((summary.avg_existence_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_check_shards_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let authority = AuthorityTable::from_numbers(["CN1B"]);

        let shard = dir.path().join("part_1.csv");
        crate::csv_util::write_candidates(&shard, &[rec(1, "alpha", PATENT_PRESENT, "CN1B")])
            .unwrap();
        let missing = dir.path().join("gone.csv");

        let summary = check_shards(&[shard, missing], 0.2, &authority).unwrap();
        // Only the existing shard is processed; it cross-checks itself.
        assert_eq!(summary.reports.len(), 1);
        assert!((summary.reports[0].existence_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_check_shards_rejects_empty_authority() {
        assert!(check_shards(&[PathBuf::from("x.csv")], 0.2, &AuthorityTable::default()).is_err());
    }

    #[test_log::test]
    fn test_authority_table_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authorizations.json");
        std::fs::write(
            &path,
            r#"[
                {"authorization_number": "CN1B", "holder": "alpha"},
                {"authorization_number": "CN2B", "holder": "beta"},
                {"holder": "keyless, skipped"}
            ]"#,
        )
        .unwrap();

        let table = AuthorityTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("CN1B"));
        assert!(!table.contains("CN3B"));

        std::fs::write(&path, "not json").unwrap();
        assert!(AuthorityTable::load(&path).is_err());
    }
}
