use super::*;

table! {
    tasks (id) {
        id -> Integer,
        file_id -> Text,
        executor -> Text,
        completed -> Bool,
    }
}

#[derive(Insertable)]
#[diesel(table_name = tasks)]
struct TaskNew<'a> {
    file_id: &'a str,
    executor: &'a str,
    completed: bool,
}

/// Record the task backing one export batch.
pub fn insert_task(
    conn: &mut SqliteConnection,
    batch_file_id: &str,
    batch_executor: &str,
) -> Result<()> {
    use self::tasks::dsl::*;

    diesel::insert_into(tasks)
        .values(&TaskNew {
            file_id: batch_file_id,
            executor: batch_executor,
            completed: false,
        })
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

/// Flag the listed tasks complete. Returns the affected task count.
pub fn complete_tasks(conn: &mut SqliteConnection, ids: &[String]) -> Result<usize> {
    use self::tasks::dsl::*;

    diesel::update(tasks.filter(file_id.eq_any(ids)))
        .set(completed.eq(true))
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))
}

/// The executor assigned to a file identifier, if any.
pub fn get_executor(
    conn: &mut SqliteConnection,
    batch_file_id: &str,
) -> Result<Option<String>> {
    use self::tasks::dsl::*;

    tasks
        .filter(file_id.eq(batch_file_id))
        .select(executor)
        .first::<String>(conn)
        .optional()
        .map_err(|e| anyhow!("{e}"))
}
