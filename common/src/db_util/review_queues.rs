use super::*;

table! {
    review_leader (id) {
        id -> Integer,
        record_id -> Integer,
        name -> Text,
        count -> Integer,
        preprocessed_name -> Text,
        key_name -> Text,
        have_patent -> Text,
        now_name -> Text,
        have_patent_fixed -> Text,
        patent_publication_number -> Text,
    }
}

table! {
    review_deputy (id) {
        id -> Integer,
        record_id -> Integer,
        name -> Text,
        count -> Integer,
        preprocessed_name -> Text,
        key_name -> Text,
        have_patent -> Text,
        now_name -> Text,
        have_patent_fixed -> Text,
        patent_publication_number -> Text,
    }
}

/// The two staging queues for second-pass review. They only live between
/// routing and export; the export drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewQueue {
    Leader,
    Deputy,
}

impl ReviewQueue {
    fn table_name(self) -> &'static str {
        match self {
            Self::Leader => "review_leader",
            Self::Deputy => "review_deputy",
        }
    }

    /// File name of this queue's CSV export.
    pub fn export_file_name(self) -> &'static str {
        match self {
            Self::Leader => "leader_review.csv",
            Self::Deputy => "deputy_review.csv",
        }
    }
}

const STAGING_COLUMNS_SQL: &str = "(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    preprocessed_name TEXT NOT NULL DEFAULT '',
    key_name TEXT NOT NULL DEFAULT '',
    have_patent TEXT NOT NULL DEFAULT '',
    now_name TEXT NOT NULL DEFAULT 'unknown',
    have_patent_fixed TEXT NOT NULL DEFAULT 'no',
    patent_publication_number TEXT NOT NULL DEFAULT 'none'
)";

/// (Re)create both staging tables, discarding any leftovers from an
/// interrupted run.
pub fn create_staging_tables(conn: &mut SqliteConnection) -> Result<()> {
    for queue in [ReviewQueue::Leader, ReviewQueue::Deputy] {
        let table_name = queue.table_name();
        conn.batch_execute(&format!(
            "DROP TABLE IF EXISTS {table_name}; CREATE TABLE {table_name} {STAGING_COLUMNS_SQL};"
        ))
        .with_context(|| format!("failed to create staging table {table_name}"))?;
    }
    Ok(())
}

/// Drop one staging queue after its export.
pub fn drop_staging_table(conn: &mut SqliteConnection, queue: ReviewQueue) -> Result<()> {
    let table_name = queue.table_name();
    conn.batch_execute(&format!("DROP TABLE IF EXISTS {table_name};"))
        .with_context(|| format!("failed to drop staging table {table_name}"))?;
    debug!("staging table {table_name} dropped");
    Ok(())
}

#[derive(Insertable)]
#[diesel(table_name = review_leader)]
struct LeaderRowNew {
    record_id: i32,
    name: String,
    count: i32,
    preprocessed_name: String,
    key_name: String,
    have_patent: String,
    now_name: String,
    have_patent_fixed: String,
    patent_publication_number: String,
}

#[derive(Insertable)]
#[diesel(table_name = review_deputy)]
struct DeputyRowNew {
    record_id: i32,
    name: String,
    count: i32,
    preprocessed_name: String,
    key_name: String,
    have_patent: String,
    now_name: String,
    have_patent_fixed: String,
    patent_publication_number: String,
}

// Both staging tables share this column layout, so one queryable row type
// serves either select.
#[derive(Queryable)]
struct StagedPrivate {
    #[allow(dead_code)]
    id: i32,
    record_id: i32,
    name: String,
    count: i32,
    preprocessed_name: String,
    key_name: String,
    have_patent: String,
    now_name: String,
    have_patent_fixed: String,
    patent_publication_number: String,
}

fn private_to_public(p: StagedPrivate) -> Result<CandidateRecord> {
    use conversions::*;
    Ok(CandidateRecord {
        record_id: i32_to_u32(p.record_id)?,
        name: p.name,
        count: i32_to_u32(p.count)?,
        preprocessed_name: p.preprocessed_name,
        key_name: p.key_name,
        have_patent: p.have_patent,
        now_name: p.now_name,
        have_patent_fixed: p.have_patent_fixed,
        patent_publication_number: p.patent_publication_number,
    })
}

/// Stage rows into a review queue. Returns the staged row count.
pub fn stage_rows(
    conn: &mut SqliteConnection,
    queue: ReviewQueue,
    rows: &[CandidateRecord],
) -> Result<usize> {
    use conversions::u32_to_i32;

    let mut staged = 0;
    match queue {
        ReviewQueue::Leader => {
            let insert_rows = rows
                .iter()
                .map(|row| {
                    Ok(LeaderRowNew {
                        record_id: u32_to_i32(row.record_id)?,
                        name: row.name.clone(),
                        count: u32_to_i32(row.count)?,
                        preprocessed_name: row.preprocessed_name.clone(),
                        key_name: row.key_name.clone(),
                        have_patent: row.have_patent.clone(),
                        now_name: row.now_name.clone(),
                        have_patent_fixed: row.have_patent_fixed.clone(),
                        patent_publication_number: row.patent_publication_number.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            for chunk in insert_rows.chunks(500) {
                staged += diesel::insert_into(review_leader::table)
                    .values(chunk)
                    .execute(conn)
                    .map_err(|e| anyhow!("{e}"))?;
            }
        }
        ReviewQueue::Deputy => {
            let insert_rows = rows
                .iter()
                .map(|row| {
                    Ok(DeputyRowNew {
                        record_id: u32_to_i32(row.record_id)?,
                        name: row.name.clone(),
                        count: u32_to_i32(row.count)?,
                        preprocessed_name: row.preprocessed_name.clone(),
                        key_name: row.key_name.clone(),
                        have_patent: row.have_patent.clone(),
                        now_name: row.now_name.clone(),
                        have_patent_fixed: row.have_patent_fixed.clone(),
                        patent_publication_number: row.patent_publication_number.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            for chunk in insert_rows.chunks(500) {
                staged += diesel::insert_into(review_deputy::table)
                    .values(chunk)
                    .execute(conn)
                    .map_err(|e| anyhow!("{e}"))?;
            }
        }
    }
    Ok(staged)
}

/// Read a queue back out in insertion order.
pub fn staged_rows(
    conn: &mut SqliteConnection,
    queue: ReviewQueue,
) -> Result<Vec<CandidateRecord>> {
    let items: Vec<StagedPrivate> = match queue {
        ReviewQueue::Leader => {
            use self::review_leader::dsl::*;
            review_leader
                .order(id.asc())
                .load(conn)
                .map_err(|e| anyhow!("{e}"))?
        }
        ReviewQueue::Deputy => {
            use self::review_deputy::dsl::*;
            review_deputy
                .order(id.asc())
                .load(conn)
                .map_err(|e| anyhow!("{e}"))?
        }
    };
    items.into_iter().map(private_to_public).collect()
}
