#![allow(dead_code)]

use super::*;

table! {
    sessions (token) {
        token -> Varchar,
        user_id -> Integer,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = sessions)]
struct SessionPrivate {
    token: String,
    user_id: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
struct SessionPrivateNew {
    token: String,
    user_id: i32,
    expires_at: DateTime<Utc>,
}

fn private_to_public(p: SessionPrivate) -> Result<SessionRecord, String> {
    use conversions::*;
    Ok(SessionRecord {
        token: p.token,
        user_id: i32_to_u32(p.user_id)?,
        expires_at: p.expires_at,
    })
}

fn build_new_row(session: SessionRecord) -> Result<SessionPrivateNew, String> {
    use conversions::*;
    Ok(SessionPrivateNew {
        token: session.token,
        user_id: u32_to_i32(session.user_id)?,
        expires_at: session.expires_at,
    })
}

pub fn insert_session(conn: &mut PgConnection, session: SessionRecord) -> Result<(), String> {
    use self::sessions::dsl::*;

    let insert_row = build_new_row(session)?;

    diesel::insert_into(sessions)
        .values(&insert_row)
        .execute(conn)
        .map_err(|err| err.to_string())?;

    Ok(())
}

pub fn get_session_by_token(
    conn: &mut PgConnection,
    input_token: &str,
) -> Result<Option<SessionRecord>, String> {
    use self::sessions::dsl::*;

    sessions
        .filter(token.eq(input_token))
        .first::<SessionPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}

pub fn delete_sessions_expired_before(
    conn: &mut PgConnection,
    cutoff: DateTime<Utc>,
) -> Result<usize, String> {
    use self::sessions::dsl::*;

    diesel::delete(sessions.filter(expires_at.le(cutoff)))
        .execute(conn)
        .map_err(|err| err.to_string())
}
