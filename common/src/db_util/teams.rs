#![allow(dead_code)]

use super::*;

table! {
    teams (id) {
        id -> Integer,
        name -> Varchar,
        founder_id -> Integer,
        members -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = teams)]
struct TeamPrivate {
    id: i32,
    name: String,
    founder_id: i32,
    members: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = teams)]
struct TeamPrivateNew {
    name: String,
    founder_id: i32,
    members: Value,
}

fn private_to_public(p: TeamPrivate) -> Result<TeamRecord, String> {
    use conversions::*;
    Ok(TeamRecord {
        team_id: i32_to_u32(p.id)?,
        name: p.name,
        founder_id: i32_to_u32(p.founder_id)?,
        members: deserialize_members(p.members)?,
        created_at: p.created_at,
    })
}

fn build_new_row(
    founder: u32,
    team_name: String,
    team_members: Vec<TeamMember>,
) -> Result<TeamPrivateNew, String> {
    use conversions::*;
    Ok(TeamPrivateNew {
        name: team_name,
        founder_id: u32_to_i32(founder)?,
        members: serialize_members(team_members)?,
    })
}

pub fn insert_team(
    conn: &mut PgConnection,
    input_founder_id: u32,
    input_name: String,
    input_members: Vec<TeamMember>,
) -> Result<TeamRecord, String> {
    use self::teams::dsl::*;

    let insert_row = build_new_row(input_founder_id, input_name, input_members)?;

    diesel::insert_into(teams)
        .values(&insert_row)
        .get_result(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

pub fn get_team_by_id(conn: &mut PgConnection, row_id: u32) -> Result<Option<TeamRecord>, String> {
    use self::teams::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    teams
        .filter(id.eq(row_id))
        .first::<TeamPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}

pub fn get_teams_by_founder(
    conn: &mut PgConnection,
    input_founder_id: u32,
) -> Result<Vec<TeamRecord>, String> {
    use self::teams::dsl::*;

    let input_founder_id = conversions::u32_to_i32(input_founder_id)?;

    let items_private: Vec<TeamPrivate> = teams
        .filter(founder_id.eq(input_founder_id))
        .order(id.asc())
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<TeamRecord>, String>>()
}

pub fn get_teams_by_ids(conn: &mut PgConnection, row_ids: &[u32]) -> Result<Vec<TeamRecord>, String> {
    use self::teams::dsl::*;

    let row_ids = conversions::u32s_to_i32s(row_ids)?;

    let items_private: Vec<TeamPrivate> = teams
        .filter(id.eq_any(row_ids))
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<TeamRecord>, String>>()
}
