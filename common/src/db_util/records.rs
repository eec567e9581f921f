use super::*;

table! {
    records (id) {
        id -> Integer,
        name -> Text,
        count -> Integer,
        preprocessed_name -> Text,
        key_name -> Text,
        have_patent -> Text,
        now_name -> Text,
        have_patent_fixed -> Text,
        patent_publication_number -> Text,
        status -> Integer,
    }
}

#[derive(Queryable)]
#[diesel(table_name = records)]
struct RecordPrivate {
    id: i32,
    name: String,
    count: i32,
    preprocessed_name: String,
    key_name: String,
    have_patent: String,
    now_name: String,
    have_patent_fixed: String,
    patent_publication_number: String,
    #[allow(dead_code)]
    status: i32,
}

#[derive(Insertable)]
#[diesel(table_name = records)]
struct RecordPrivateNew {
    name: String,
    count: i32,
    preprocessed_name: String,
    key_name: String,
    have_patent: String,
    now_name: String,
    have_patent_fixed: String,
    patent_publication_number: String,
    status: i32,
}

fn private_to_public(p: RecordPrivate) -> Result<CandidateRecord> {
    use conversions::*;
    Ok(CandidateRecord {
        record_id: i32_to_u32(p.id)?,
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

fn build_new_row(row: &CandidateRecord, row_status: RecordStatus) -> Result<RecordPrivateNew> {
    use conversions::*;
    Ok(RecordPrivateNew {
        name: row.name.clone(),
        count: u32_to_i32(row.count)?,
        preprocessed_name: row.preprocessed_name.clone(),
        key_name: row.key_name.clone(),
        have_patent: row.have_patent.clone(),
        now_name: row.now_name.clone(),
        have_patent_fixed: row.have_patent_fixed.clone(),
        patent_publication_number: row.patent_publication_number.clone(),
        status: row_status.code(),
    })
}

/// Insert candidate rows as unassigned work, ignoring any ids they carry.
/// Returns the inserted count.
pub fn insert_candidates(conn: &mut SqliteConnection, rows: &[CandidateRecord]) -> Result<usize> {
    use self::records::dsl::*;

    let insert_rows = rows
        .iter()
        .map(|row| build_new_row(row, RecordStatus::Unassigned))
        .collect::<Result<Vec<_>>>()?;

    // chunk it out to stay under the sqlite bind limit
    let mut inserted = 0;
    for chunk in insert_rows.chunks(500) {
        inserted += diesel::insert_into(records)
            .values(chunk)
            .execute(conn)
            .map_err(|e| anyhow!("{e}"))?;
    }
    Ok(inserted)
}

/// The oldest unassigned records, up to `limit`.
pub fn get_unassigned_records(
    conn: &mut SqliteConnection,
    limit: usize,
) -> Result<Vec<CandidateRecord>> {
    use self::records::dsl::*;

    let limit = conversions::usize_to_i64(limit)?;
    let items: Vec<RecordPrivate> = records
        .filter(status.eq(RecordStatus::Unassigned.code()))
        .order(id.asc())
        .limit(limit)
        .load(conn)
        .map_err(|e| anyhow!("{e}"))?;

    items.into_iter().map(private_to_public).collect()
}

/// The listed records in id order.
pub fn get_records_by_ids(
    conn: &mut SqliteConnection,
    record_ids: &[u32],
) -> Result<Vec<CandidateRecord>> {
    use self::records::dsl::*;

    let ids = record_ids
        .iter()
        .map(|&v| conversions::u32_to_i32(v))
        .collect::<Result<Vec<_>>>()?;
    let items: Vec<RecordPrivate> = records
        .filter(id.eq_any(ids))
        .order(id.asc())
        .load(conn)
        .map_err(|e| anyhow!("{e}"))?;

    items.into_iter().map(private_to_public).collect()
}

/// Move every listed record to `next`, touching only rows for which that is
/// a forward transition. Returns the number of rows moved.
pub fn advance_records(
    conn: &mut SqliteConnection,
    record_ids: &[u32],
    next: RecordStatus,
) -> Result<usize> {
    use self::records::dsl::*;

    let ids = record_ids
        .iter()
        .map(|&v| conversions::u32_to_i32(v))
        .collect::<Result<Vec<_>>>()?;
    diesel::update(records.filter(id.eq_any(ids)).filter(status.lt(next.code())))
        .set(status.eq(next.code()))
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))
}

/// The stored status of one record.
pub fn record_status(conn: &mut SqliteConnection, rec_id: u32) -> Result<RecordStatus> {
    use self::records::dsl::*;

    let row_id = conversions::u32_to_i32(rec_id)?;
    let code: i32 = records
        .filter(id.eq(row_id))
        .select(status)
        .first(conn)
        .map_err(|e| anyhow!("{e}"))?;
    RecordStatus::from_code(code)
}

/// Apply one reviewed row: overwrite the review fields and mark the record
/// validated. Matches on both id and name. Returns the affected row count.
pub fn apply_reviewed_row(conn: &mut SqliteConnection, row: &CandidateRecord) -> Result<usize> {
    use self::records::dsl::*;

    let row_id = conversions::u32_to_i32(row.record_id)?;
    diesel::update(records.filter(id.eq(row_id)).filter(name.eq(&row.name)))
        .set((
            now_name.eq(&row.now_name),
            have_patent_fixed.eq(&row.have_patent_fixed),
            patent_publication_number.eq(&row.patent_publication_number),
            status.eq(RecordStatus::Validated.code()),
        ))
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))
}
