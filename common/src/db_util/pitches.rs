#![allow(dead_code)]

use super::*;

table! {
    pitches (id) {
        id -> Integer,
        team_id -> Integer,
        title -> Varchar,
        demo_link -> Varchar,
        deck_url -> Varchar,
        category -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = pitches)]
struct PitchPrivate {
    id: i32,
    team_id: i32,
    title: String,
    demo_link: String,
    deck_url: String,
    category: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = pitches)]
struct PitchPrivateNew {
    team_id: i32,
    title: String,
    demo_link: String,
    deck_url: String,
    category: String,
    status: String,
}

fn private_to_public(p: PitchPrivate) -> Result<PitchRecord, String> {
    use conversions::*;
    Ok(PitchRecord {
        pitch_id: i32_to_u32(p.id)?,
        team_id: i32_to_u32(p.team_id)?,
        title: p.title,
        demo_link: p.demo_link,
        deck_url: p.deck_url,
        category: deserialize_category(p.category)?,
        status: deserialize_status(p.status)?,
        created_at: p.created_at,
        updated_at: p.updated_at,
    })
}

fn build_new_row(pitch: NewPitch) -> Result<PitchPrivateNew, String> {
    use conversions::*;
    Ok(PitchPrivateNew {
        team_id: u32_to_i32(pitch.team_id)?,
        title: pitch.title,
        demo_link: pitch.demo_link,
        deck_url: pitch.deck_url,
        category: serialize_category(pitch.category),
        status: serialize_status(pitch.status),
    })
}

/// Insert a pitch. Returns Ok(None) if the team already has one.
pub fn insert_pitch(conn: &mut PgConnection, pitch: NewPitch) -> Result<Option<PitchRecord>, String> {
    use self::pitches::dsl::*;

    let insert_row = build_new_row(pitch)?;

    diesel::insert_into(pitches)
        .values(&insert_row)
        .on_conflict(team_id)
        .do_nothing()
        .get_result::<PitchPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}

pub fn get_pitch_by_id(conn: &mut PgConnection, row_id: u32) -> Result<Option<PitchRecord>, String> {
    use self::pitches::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    pitches
        .filter(id.eq(row_id))
        .first::<PitchPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}

pub fn get_pitch_by_team(
    conn: &mut PgConnection,
    input_team_id: u32,
) -> Result<Option<PitchRecord>, String> {
    use self::pitches::dsl::*;

    let input_team_id = conversions::u32_to_i32(input_team_id)?;

    pitches
        .filter(team_id.eq(input_team_id))
        .first::<PitchPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}

/// Submitted pitches matching the filter, newest first.
pub fn get_submitted_pitches(
    conn: &mut PgConnection,
    filter: &PitchFilter,
) -> Result<Vec<PitchRecord>, String> {
    use self::pitches::dsl::*;

    let submitted = conversions::serialize_status(PitchStatus::Submitted);
    let mut query = pitches.filter(status.eq(submitted)).into_boxed();

    if let Some(input_category) = filter.category {
        query = query.filter(category.eq(conversions::serialize_category(input_category)));
    }
    if let Some(search) = filter.title_search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", conversions::escape_like(search));
        query = query.filter(title.ilike(pattern));
    }

    let items_private: Vec<PitchPrivate> = query
        .order((created_at.desc(), id.desc()))
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<PitchRecord>, String>>()
}
