//! Interfaces between the application code and database.

use super::*;

pub use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use serde_json::Value;
use std::env;

mod conversions;
mod feedback;
mod pitches;
mod sessions;
mod teams;
mod users;
mod votes;

pub use feedback::{get_recent_feedback_for_pitch, insert_feedback};
pub use pitches::{get_pitch_by_id, get_pitch_by_team, get_submitted_pitches, insert_pitch};
pub use sessions::{delete_sessions_expired_before, get_session_by_token, insert_session};
pub use teams::{get_team_by_id, get_teams_by_founder, get_teams_by_ids, insert_team};
pub use users::{get_user_by_id, get_user_credentials_by_email, insert_user};
pub use votes::{get_votes_for_pitch, get_votes_for_pitches, upsert_vote};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// The full schema, applied by the seeding tool on a fresh database.
pub const SCHEMA_SQL: &str = include_str!("../../schema.sql");

/// Read `DATABASE_URL`, loading a `.env` file first if one exists.
pub fn get_database_url() -> Result<String, String> {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())
}

/// Open a single connection. Used by scripts and one-off tools.
pub fn get_database_connection() -> Result<PgConnection, String> {
    let database_url = get_database_url()?;
    PgConnection::establish(&database_url)
        .map_err(|err| format!("Error connecting to {database_url}: {err}"))
}

/// Build a connection pool. Used by the API.
pub fn get_database_pool(max_size: u32) -> Result<PgPool, String> {
    let database_url = get_database_url()?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|err| err.to_string())
}

pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConnection, String> {
    pool.get().map_err(|err| err.to_string())
}

/// Create every table and index if they do not exist yet.
pub fn apply_schema(conn: &mut PgConnection) -> Result<(), String> {
    use diesel::connection::SimpleConnection;
    conn.batch_execute(SCHEMA_SQL)
        .map_err(|err| err.to_string())
}

/// Remove every row from every table. Only called by the seeding tool.
pub fn truncate_all(conn: &mut PgConnection) -> Result<(), String> {
    use diesel::connection::SimpleConnection;
    conn.batch_execute(
        "TRUNCATE TABLE feedback, votes, pitches, teams, sessions, users RESTART IDENTITY CASCADE;",
    )
    .map_err(|err| err.to_string())
}
