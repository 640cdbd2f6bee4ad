#![allow(dead_code)]

use super::*;
use diesel::upsert::excluded;
use itertools::Itertools;
use std::collections::HashMap;

table! {
    votes (id) {
        id -> Integer,
        pitch_id -> Integer,
        reviewer_id -> Integer,
        rating -> Integer,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = votes)]
struct VotePrivate {
    id: i32,
    pitch_id: i32,
    reviewer_id: i32,
    rating: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = votes)]
struct VotePrivateNew {
    pitch_id: i32,
    reviewer_id: i32,
    rating: i32,
    updated_at: DateTime<Utc>,
}

fn private_to_public(p: VotePrivate) -> Result<VoteRecord, String> {
    use conversions::*;
    Ok(VoteRecord {
        vote_id: i32_to_u32(p.id)?,
        pitch_id: i32_to_u32(p.pitch_id)?,
        reviewer_id: i32_to_u32(p.reviewer_id)?,
        rating: i32_to_rating(p.rating)?,
        created_at: p.created_at,
        updated_at: p.updated_at,
    })
}

fn build_new_row(pitch: u32, reviewer: u32, stars: u8) -> Result<VotePrivateNew, String> {
    use conversions::*;
    Ok(VotePrivateNew {
        pitch_id: u32_to_i32(pitch)?,
        reviewer_id: u32_to_i32(reviewer)?,
        rating: rating_to_i32(stars)?,
        updated_at: Utc::now(),
    })
}

/// Record a reviewer's rating for a pitch.
/// The unique index on (pitch_id, reviewer_id) turns a repeat vote into an in-place update.
pub fn upsert_vote(
    conn: &mut PgConnection,
    input_pitch_id: u32,
    input_reviewer_id: u32,
    input_rating: u8,
) -> Result<VoteRecord, String> {
    use self::votes::dsl::*;

    let insert_row = build_new_row(input_pitch_id, input_reviewer_id, input_rating)?;

    diesel::insert_into(votes)
        .values(&insert_row)
        .on_conflict((pitch_id, reviewer_id))
        .do_update()
        .set((
            rating.eq(excluded(rating)),
            updated_at.eq(excluded(updated_at)),
        ))
        .get_result::<VotePrivate>(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

pub fn get_votes_for_pitch(
    conn: &mut PgConnection,
    input_pitch_id: u32,
) -> Result<Vec<VoteRecord>, String> {
    use self::votes::dsl::*;

    let input_pitch_id = conversions::u32_to_i32(input_pitch_id)?;

    let items_private: Vec<VotePrivate> = votes
        .filter(pitch_id.eq(input_pitch_id))
        .order(id.asc())
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<VoteRecord>, String>>()
}

/// Get the votes for many pitches in a single query, grouped by pitch.
pub fn get_votes_for_pitches(
    conn: &mut PgConnection,
    input_pitch_ids: &[u32],
) -> Result<HashMap<u32, Vec<VoteRecord>>, String> {
    use self::votes::dsl::*;

    if input_pitch_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let input_pitch_ids = conversions::u32s_to_i32s(input_pitch_ids)?;

    let items_private: Vec<VotePrivate> = votes
        .filter(pitch_id.eq_any(input_pitch_ids))
        .order((pitch_id.asc(), id.asc()))
        .load(conn)
        .map_err(|err| err.to_string())?;

    let items = items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<VoteRecord>, String>>()?;

    Ok(items.into_iter().into_group_map_by(|v| v.pitch_id))
}
