//! Interfaces between the application code and the task store.
//!
//! One module per table, each with its own `table!` block and private row
//! structs; the public surface speaks the crate's own types. The store is a
//! single SQLite file, created and schema-initialized on first use.

pub(crate) use anyhow::{Context, Result, anyhow};
pub(crate) use diesel::connection::SimpleConnection;
pub(crate) use diesel::prelude::*;
pub(crate) use diesel::sqlite::SqliteConnection;
pub(crate) use diesel::table;
pub(crate) use log::debug;

pub(crate) use crate::{CandidateRecord, RecordStatus, Role, RosterEntry, TeamRoster};

pub mod conversions;
mod file_groups;
mod records;
mod review_queues;
mod tasks;
mod teams;

pub use file_groups::{count_known_file_ids, insert_file_group, record_ids_for_files};
pub use records::{
    advance_records, apply_reviewed_row, get_records_by_ids, get_unassigned_records,
    insert_candidates, record_status,
};
pub use review_queues::{
    ReviewQueue, create_staging_tables, drop_staging_table, stage_rows, staged_rows,
};
pub use tasks::{complete_tasks, get_executor, insert_task};
pub use teams::{get_roster, seed_roster_if_empty};

/// Default store path when neither the CLI nor the environment supplies one.
pub const DEFAULT_DB_PATH: &str = "tasks.db";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    preprocessed_name TEXT NOT NULL DEFAULT '',
    key_name TEXT NOT NULL DEFAULT '',
    have_patent TEXT NOT NULL DEFAULT '',
    now_name TEXT NOT NULL DEFAULT 'unknown',
    have_patent_fixed TEXT NOT NULL DEFAULT 'no' CHECK (have_patent_fixed IN ('yes', 'no')),
    patent_publication_number TEXT NOT NULL DEFAULT 'none',
    status INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS file_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id TEXT NOT NULL,
    record_id INTEGER NOT NULL REFERENCES records (id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id TEXT NOT NULL,
    executor TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name TEXT NOT NULL,
    role TEXT NOT NULL,
    member_name TEXT NOT NULL
);
";

/// Open the store, creating the schema if needed. Resolution order for the
/// location: explicit path, then `DATABASE_URL` (a `.env` file is honored),
/// then `tasks.db` in the working directory.
///
/// # Errors
/// Returns an error if the file cannot be opened or the schema cannot be
/// created.
pub fn get_database_connection(db_path: Option<&str>) -> Result<SqliteConnection> {
    dotenvy::dotenv().ok();
    let url = match db_path {
        Some(path) => path.to_string(),
        None => std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
    };

    let mut conn = SqliteConnection::establish(&url)
        .with_context(|| format!("failed to open task store at {url}"))?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")
        .context("failed to enable foreign key enforcement")?;
    conn.batch_execute(SCHEMA_SQL)
        .context("failed to initialize the task store schema")?;
    debug!("task store ready at {url}");
    Ok(conn)
}
