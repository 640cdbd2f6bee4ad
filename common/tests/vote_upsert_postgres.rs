//! Runs against a live PostgreSQL database. Needs the `database` feature and `DATABASE_URL`:
//! `cargo test -p pitch_common --features database -- --ignored`

#![cfg(feature = "database")]

use pitch_common::db_util::{self, PgConnection};
use pitch_common::store::{PgStore, VoteStore};
use pitch_common::{Category, NewPitch, NewUser, PitchStatus, UserRole};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn connect() -> PgConnection {
    let mut conn = db_util::get_database_connection().unwrap();
    db_util::apply_schema(&mut conn).unwrap();
    conn
}

/// Insert a founder, a reviewer, a team and one submitted pitch. Returns (pitch, reviewer).
fn create_pitch_and_reviewer(conn: &mut PgConnection) -> (u32, u32) {
    let suffix = unique_suffix();
    let founder = db_util::insert_user(
        conn,
        NewUser {
            email: format!("founder-{suffix}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::Founder,
            name: "Founder".to_string(),
        },
    )
    .unwrap()
    .unwrap();
    let reviewer = db_util::insert_user(
        conn,
        NewUser {
            email: format!("reviewer-{suffix}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::Reviewer,
            name: "Reviewer".to_string(),
        },
    )
    .unwrap()
    .unwrap();
    let team =
        db_util::insert_team(conn, founder.user_id, format!("Team {suffix}"), vec![]).unwrap();
    let pitch = db_util::insert_pitch(
        conn,
        NewPitch {
            team_id: team.team_id,
            title: format!("Pitch {suffix}"),
            demo_link: "https://demo.example.com".to_string(),
            deck_url: "https://deck.example.com".to_string(),
            category: Category::Ai,
            status: PitchStatus::Submitted,
        },
    )
    .unwrap()
    .unwrap();
    (pitch.pitch_id, reviewer.user_id)
}

#[test_log::test]
#[ignore = "needs DATABASE_URL"]
fn test_repeat_vote_updates_single_row() {
    let mut conn = connect();
    let (pitch_id, reviewer_id) = create_pitch_and_reviewer(&mut conn);

    let first = db_util::upsert_vote(&mut conn, pitch_id, reviewer_id, 2).unwrap();
    let second = db_util::upsert_vote(&mut conn, pitch_id, reviewer_id, 5).unwrap();
    assert_eq!(first.vote_id, second.vote_id);

    let votes = db_util::get_votes_for_pitch(&mut conn, pitch_id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].rating, 5);
    assert_eq!(votes[0].created_at, first.created_at);
    assert!(votes[0].updated_at > first.updated_at);
}

#[test_log::test]
#[ignore = "needs DATABASE_URL"]
fn test_store_repeat_vote_updates_single_row() {
    let (pitch_id, reviewer_id) = create_pitch_and_reviewer(&mut connect());
    let store = PgStore::from_env(2).unwrap();

    let first = store.upsert_vote(pitch_id, reviewer_id, 1).unwrap();
    let second = store.upsert_vote(pitch_id, reviewer_id, 4).unwrap();
    assert_eq!(first.vote_id, second.vote_id);

    let votes = store.list_votes(pitch_id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].rating, 4);
    assert!(votes[0].updated_at > first.updated_at);

    let grouped = store.list_votes_for_pitches(&[pitch_id]).unwrap();
    assert_eq!(grouped[&pitch_id].len(), 1);
}
