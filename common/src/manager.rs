//! The stateful task manager behind the allocator CLI.
//!
//! Every operation runs against one SQLite connection and uses a single
//! transaction for its mutations, so a failure rolls the whole command back.

use anyhow::{Context, Result, bail, ensure};
use chrono::Local;
use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use itertools::Itertools;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db_util::{self, ReviewQueue};
use crate::review_routing::{self, Destination};
use crate::{CandidateRecord, RecordStatus, TeamRoster, allocation, csv_util};

/// Outcome of one allocation run.
#[derive(Debug)]
pub struct AssignmentOutcome {
    pub requested: usize,
    pub assigned: usize,
    /// File identifiers of the export batches, in assignment order.
    pub batches: Vec<String>,
}

pub struct TaskManager {
    conn: SqliteConnection,
    export_dir: PathBuf,
}

impl TaskManager {
    /// Open the store (creating the schema on first use) and seed the
    /// roster if the store has none yet.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or seeded.
    pub fn open(
        db_path: Option<&str>,
        roster: &TeamRoster,
        export_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mut conn = db_util::get_database_connection(db_path)?;
        db_util::seed_roster_if_empty(&mut conn, roster)?;
        Ok(Self {
            conn,
            export_dir: export_dir.into(),
        })
    }

    /// Assign up to `daily_goal` unassigned records to `group_name` by the
    /// fixed role ratios, exporting one CSV per receiving member.
    ///
    /// # Errors
    /// Returns an error for an unknown group or any store/export failure;
    /// failures roll back the whole allocation.
    pub fn assign_tasks(&mut self, daily_goal: usize, group_name: &str) -> Result<AssignmentOutcome> {
        ensure!(daily_goal > 0, "daily goal must be positive");

        let roster = db_util::get_roster(&mut self.conn)?;
        let Some(group) = roster.group(group_name) else {
            bail!("unknown team group: {group_name}");
        };

        let selection = db_util::get_unassigned_records(&mut self.conn, daily_goal)?;
        if selection.is_empty() {
            info!("no unassigned records available");
            return Ok(AssignmentOutcome {
                requested: daily_goal,
                assigned: 0,
                batches: Vec::new(),
            });
        }
        if selection.len() < daily_goal {
            warn!(
                "only {} unassigned records available, {} requested",
                selection.len(),
                daily_goal
            );
        }

        let stamp = Local::now().format("%m%d").to_string();
        let plan = allocation::plan_assignments(&group, selection.len(), &stamp);

        fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("failed to create {}", self.export_dir.display()))?;
        let export_dir = &self.export_dir;

        self.conn.transaction::<_, anyhow::Error, _>(|conn| {
            for assignment in &plan {
                let slice = &selection[assignment.range.clone()];
                let record_ids: Vec<u32> = slice.iter().map(|r| r.record_id).collect();

                db_util::insert_file_group(conn, &assignment.file_id, &record_ids)?;
                let moved = db_util::advance_records(conn, &record_ids, RecordStatus::Assigned)?;
                ensure!(
                    moved == record_ids.len(),
                    "record batch changed while assigning {}",
                    assignment.file_id
                );
                db_util::insert_task(conn, &assignment.file_id, &assignment.executor)?;

                let export_path = export_dir.join(format!("{}.csv", assignment.file_id));
                csv_util::write_candidates(&export_path, slice)?;
            }
            Ok(())
        })?;

        let assigned: usize = plan.iter().map(|p| p.range.len()).sum();
        info!(
            "assigned {assigned} records to {group_name} across {} batches",
            plan.len()
        );
        Ok(AssignmentOutcome {
            requested: daily_goal,
            assigned,
            batches: plan.into_iter().map(|p| p.file_id).collect(),
        })
    }

    /// Mark the given export batches complete and their records completed.
    /// Returns the number of affected records.
    ///
    /// # Errors
    /// Returns an error, before mutating anything, if the list is empty or
    /// any identifier is unknown.
    pub fn mark_tasks_completed(&mut self, file_ids: &[String]) -> Result<usize> {
        ensure!(!file_ids.is_empty(), "file id list must not be empty");
        let unique: Vec<String> = file_ids.iter().unique().cloned().collect();

        let known = db_util::count_known_file_ids(&mut self.conn, &unique)?;
        if known != unique.len() {
            bail!("unknown file id(s) among: {}", unique.join(", "));
        }

        self.conn.transaction::<_, anyhow::Error, _>(|conn| {
            db_util::complete_tasks(conn, &unique)?;
            let record_ids = db_util::record_ids_for_files(conn, &unique)?;
            db_util::advance_records(conn, &record_ids, RecordStatus::Completed)
        })
    }

    /// Route submitted batches into the leader/deputy review queues, export
    /// both queues as CSV and drop the staging tables. Returns the pooled
    /// member row count.
    ///
    /// # Errors
    /// Returns an error if the submission folder is missing, the group is
    /// unknown, or any store/export step fails.
    pub fn validate_records(
        &mut self,
        folder: &Path,
        output_dir: &Path,
        group_name: &str,
    ) -> Result<usize> {
        ensure!(
            folder.is_dir(),
            "submission folder not found: {}",
            folder.display()
        );
        let roster = db_util::get_roster(&mut self.conn)?;
        let Some(group) = roster.group(group_name) else {
            bail!("unknown team group: {group_name}");
        };

        db_util::create_staging_tables(&mut self.conn)?;

        let mut leader_rows: Vec<CandidateRecord> = Vec::new();
        let mut deputy_rows: Vec<CandidateRecord> = Vec::new();
        let mut member_pool: Vec<CandidateRecord> = Vec::new();

        let entries = fs::read_dir(folder)
            .with_context(|| format!("failed to list {}", folder.display()))?;
        let mut batch_dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        batch_dirs.sort();

        for batch_dir in batch_dirs {
            let file_id = batch_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(executor) = db_util::get_executor(&mut self.conn, &file_id)? else {
                warn!("no task on record for {file_id}, skipped");
                continue;
            };
            let rows = csv_util::read_candidates_in_dir(&batch_dir)?;

            match review_routing::route_executor(&group, &executor) {
                Destination::DeputyQueue => deputy_rows.extend(rows),
                Destination::LeaderQueue => leader_rows.extend(rows),
                Destination::MemberPool => member_pool.extend(rows),
                Destination::Unknown => {
                    warn!("executor {executor} is not part of {group_name}, {file_id} skipped");
                }
            }
        }

        let pooled = member_pool.len();
        let (to_leader, to_deputy) = review_routing::split_member_pool(member_pool);
        leader_rows.extend(to_leader);
        deputy_rows.extend(to_deputy);

        self.conn.transaction::<_, anyhow::Error, _>(|conn| {
            db_util::stage_rows(conn, ReviewQueue::Leader, &leader_rows)?;
            db_util::stage_rows(conn, ReviewQueue::Deputy, &deputy_rows)?;
            Ok(())
        })?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;
        for queue in [ReviewQueue::Leader, ReviewQueue::Deputy] {
            let rows = db_util::staged_rows(&mut self.conn, queue)?;
            csv_util::write_candidates(&output_dir.join(queue.export_file_name()), &rows)?;
            db_util::drop_staging_table(&mut self.conn, queue)?;
        }

        info!("review allocation done: {pooled} pooled member rows");
        Ok(pooled)
    }

    /// Merge the two reviewed CSVs back into the record table, marking the
    /// matched records validated. Returns the applied row count.
    ///
    /// # Errors
    /// Returns an error for unreadable CSVs or store failures; store
    /// failures roll the merge back.
    pub fn merge_review(&mut self, leader_csv: &Path, deputy_csv: &Path) -> Result<usize> {
        let mut rows = csv_util::read_candidates(leader_csv)?;
        rows.extend(csv_util::read_candidates(deputy_csv)?);

        self.conn.transaction::<_, anyhow::Error, _>(|conn| {
            let mut applied = 0;
            for row in &rows {
                applied += db_util::apply_reviewed_row(conn, row)?;
            }
            Ok(applied)
        })
    }

    /// Load candidate rows from a CSV as new unassigned work. Returns the
    /// inserted row count.
    ///
    /// # Errors
    /// Returns an error for an unreadable CSV or a store failure.
    pub fn ingest_records(&mut self, csv_path: &Path) -> Result<usize> {
        let rows = csv_util::read_candidates(csv_path)?;
        self.conn
            .transaction::<_, anyhow::Error, _>(|conn| db_util::insert_candidates(conn, &rows))
    }

    /// The stored roster.
    ///
    /// # Errors
    /// Returns an error on a store failure.
    pub fn team_config(&mut self) -> Result<TeamRoster> {
        db_util::get_roster(&mut self.conn)
    }

    /// Current status of one record, for reporting.
    ///
    /// # Errors
    /// Returns an error for an unknown record id.
    pub fn record_status(&mut self, record_id: u32) -> Result<RecordStatus> {
        db_util::record_status(&mut self.conn, record_id)
    }
}
