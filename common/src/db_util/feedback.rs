#![allow(dead_code)]

use super::*;

table! {
    feedback (id) {
        id -> Integer,
        pitch_id -> Integer,
        reviewer_id -> Integer,
        content -> Varchar,
        created_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = feedback)]
struct FeedbackPrivate {
    id: i32,
    pitch_id: i32,
    reviewer_id: i32,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = feedback)]
struct FeedbackPrivateNew {
    pitch_id: i32,
    reviewer_id: i32,
    content: String,
}

/// Feedback joined with the reviewer's display name.
#[derive(Debug, QueryableByName)]
struct FeedbackWithReviewer {
    #[diesel(sql_type = diesel::sql_types::Text)]
    content: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    reviewer_name: String,
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    created_at: DateTime<Utc>,
}

fn private_to_public(p: FeedbackPrivate) -> Result<FeedbackRecord, String> {
    use conversions::*;
    Ok(FeedbackRecord {
        feedback_id: i32_to_u32(p.id)?,
        pitch_id: i32_to_u32(p.pitch_id)?,
        reviewer_id: i32_to_u32(p.reviewer_id)?,
        content: p.content,
        created_at: p.created_at,
    })
}

fn build_new_row(pitch: u32, reviewer: u32, text: String) -> Result<FeedbackPrivateNew, String> {
    use conversions::*;
    Ok(FeedbackPrivateNew {
        pitch_id: u32_to_i32(pitch)?,
        reviewer_id: u32_to_i32(reviewer)?,
        content: text,
    })
}

pub fn insert_feedback(
    conn: &mut PgConnection,
    input_pitch_id: u32,
    input_reviewer_id: u32,
    input_content: String,
) -> Result<FeedbackRecord, String> {
    use self::feedback::dsl::*;

    let insert_row = build_new_row(input_pitch_id, input_reviewer_id, input_content)?;

    diesel::insert_into(feedback)
        .values(&insert_row)
        .get_result(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

/// The most recent feedback on a pitch, newest first, with reviewer names.
pub fn get_recent_feedback_for_pitch(
    conn: &mut PgConnection,
    input_pitch_id: u32,
    limit: usize,
) -> Result<Vec<FeedbackView>, String> {
    use diesel::sql_query;
    use diesel::sql_types::{BigInt, Integer};

    let input_pitch_id = conversions::u32_to_i32(input_pitch_id)?;
    let limit = i64::try_from(limit).map_err(|err| err.to_string())?;

    let query = "SELECT f.content, u.name AS reviewer_name, f.created_at
        FROM feedback f
        JOIN users u ON f.reviewer_id = u.id
        WHERE f.pitch_id = $1
        ORDER BY f.created_at DESC, f.id DESC
        LIMIT $2;";

    let items: Vec<FeedbackWithReviewer> = sql_query(query)
        .bind::<Integer, _>(input_pitch_id)
        .bind::<BigInt, _>(limit)
        .load(conn)
        .map_err(|err| err.to_string())?;

    Ok(items
        .into_iter()
        .map(|item| FeedbackView {
            content: item.content,
            reviewer_name: item.reviewer_name,
            created_at: item.created_at,
        })
        .collect())
}
