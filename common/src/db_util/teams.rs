use super::*;

table! {
    teams (id) {
        id -> Integer,
        group_name -> Text,
        role -> Text,
        member_name -> Text,
    }
}

#[derive(Insertable)]
#[diesel(table_name = teams)]
struct TeamNew<'a> {
    group_name: &'a str,
    role: &'a str,
    member_name: &'a str,
}

/// Seed the roster on first use; later runs leave the stored roster
/// untouched. Returns whether a seed happened.
pub fn seed_roster_if_empty(conn: &mut SqliteConnection, roster: &TeamRoster) -> Result<bool> {
    use self::teams::dsl::*;

    let existing: i64 = teams
        .count()
        .get_result(conn)
        .map_err(|e| anyhow!("{e}"))?;
    if existing > 0 {
        return Ok(false);
    }

    let rows: Vec<TeamNew<'_>> = roster
        .entries()
        .iter()
        .map(|entry| TeamNew {
            group_name: &entry.group,
            role: entry.role.as_str(),
            member_name: &entry.member,
        })
        .collect();
    diesel::insert_into(teams)
        .values(&rows)
        .execute(conn)
        .map_err(|e| anyhow!("{e}"))?;
    debug!("seeded roster with {} entries", rows.len());
    Ok(true)
}

/// The stored roster, in seeding order.
pub fn get_roster(conn: &mut SqliteConnection) -> Result<TeamRoster> {
    use self::teams::dsl::*;

    let rows: Vec<(String, String, String)> = teams
        .select((group_name, role, member_name))
        .order(id.asc())
        .load(conn)
        .map_err(|e| anyhow!("{e}"))?;

    let entries = rows
        .into_iter()
        .map(|(group, role_label, member)| {
            Ok(RosterEntry {
                group,
                role: Role::parse(&role_label)?,
                member,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TeamRoster::new(entries))
}
