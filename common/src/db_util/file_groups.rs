use super::*;

table! {
    file_groups (id) {
        id -> Integer,
        file_id -> Text,
        record_id -> Integer,
    }
}

#[derive(Insertable)]
#[diesel(table_name = file_groups)]
struct FileGroupNew<'a> {
    file_id: &'a str,
    record_id: i32,
}

/// Associate the records of one export batch with its file identifier.
/// Returns the inserted row count.
pub fn insert_file_group(
    conn: &mut SqliteConnection,
    batch_file_id: &str,
    record_ids: &[u32],
) -> Result<usize> {
    use self::file_groups::dsl::*;

    let rows = record_ids
        .iter()
        .map(|&rec_id| {
            Ok(FileGroupNew {
                file_id: batch_file_id,
                record_id: conversions::u32_to_i32(rec_id)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    diesel::insert_into(file_groups)
        .values(&rows)
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))
}

/// How many of the given identifiers actually name a file group.
pub fn count_known_file_ids(conn: &mut SqliteConnection, ids: &[String]) -> Result<usize> {
    use self::file_groups::dsl::*;

    let known: Vec<String> = file_groups
        .filter(file_id.eq_any(ids))
        .select(file_id)
        .distinct()
        .load(conn)
        .map_err(|e| anyhow!("{e}"))?;
    Ok(known.len())
}

/// Record ids belonging to any of the given file identifiers, in id order.
pub fn record_ids_for_files(conn: &mut SqliteConnection, ids: &[String]) -> Result<Vec<u32>> {
    use self::file_groups::dsl::*;

    let rows: Vec<i32> = file_groups
        .filter(file_id.eq_any(ids))
        .select(record_id)
        .order(record_id.asc())
        .load(conn)
        .map_err(|e| anyhow!("{e}"))?;

    rows.into_iter().map(conversions::i32_to_u32).collect()
}
