//! Storage seams between the application and its data.
//!
//! The API only ever talks to a `ShowcaseStore`. Production uses `PgStore`
//! (behind the `database` feature), tests and demos use `MemoryStore`. Both
//! enforce one vote per (pitch, reviewer) at the storage layer.

mod memory;
#[cfg(feature = "database")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use postgres::PgStore;

use crate::leaderboard::{self, LeaderboardPage, PitchVotes};
use crate::pagination::Pagination;
use crate::{
    FeedbackRecord, FeedbackView, NewPitch, NewUser, PitchFilter, PitchRecord, PitchWithTeam,
    SessionRecord, ShowcaseError, TeamMember, TeamRecord, TeamSummary, UserRecord, VoteRecord,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, ShowcaseError>;

pub trait UserStore {
    /// Fails with `DuplicateUser` if the email is taken.
    fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;
    fn get_user_by_id(&self, user_id: u32) -> StoreResult<Option<UserRecord>>;
    /// Returns the user together with their password hash.
    fn get_credentials_by_email(&self, email: &str) -> StoreResult<Option<(UserRecord, String)>>;
    fn insert_session(&self, session: SessionRecord) -> StoreResult<()>;
    /// Returns the session whether or not it has expired.
    fn get_session(&self, token: &str) -> StoreResult<Option<SessionRecord>>;
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}

pub trait TeamStore {
    fn insert_team(
        &self,
        founder_id: u32,
        name: String,
        members: Vec<TeamMember>,
    ) -> StoreResult<TeamRecord>;
    fn get_team_by_id(&self, team_id: u32) -> StoreResult<Option<TeamRecord>>;
    fn get_teams_by_founder(&self, founder_id: u32) -> StoreResult<Vec<TeamRecord>>;
    fn get_teams_by_ids(&self, team_ids: &[u32]) -> StoreResult<Vec<TeamRecord>>;
}

pub trait PitchStore {
    /// Fails with `DuplicateTeamPitch` if the team already owns a pitch.
    fn insert_pitch(&self, pitch: NewPitch) -> StoreResult<PitchRecord>;
    fn get_pitch_by_id(&self, pitch_id: u32) -> StoreResult<Option<PitchRecord>>;
    fn get_pitch_by_team(&self, team_id: u32) -> StoreResult<Option<PitchRecord>>;
    /// Submitted pitches matching the filter, newest first (ties by id descending).
    fn list_submitted_pitches(&self, filter: &PitchFilter) -> StoreResult<Vec<PitchRecord>>;
}

pub trait VoteStore {
    /// Insert the reviewer's vote, or overwrite the rating and update time of their existing one.
    fn upsert_vote(&self, pitch_id: u32, reviewer_id: u32, rating: u8) -> StoreResult<VoteRecord>;
    fn list_votes(&self, pitch_id: u32) -> StoreResult<Vec<VoteRecord>>;
    /// Votes for many pitches in one go. Pitches without votes may be absent from the map.
    fn list_votes_for_pitches(&self, pitch_ids: &[u32])
    -> StoreResult<HashMap<u32, Vec<VoteRecord>>>;
}

pub trait FeedbackStore {
    fn insert_feedback(
        &self,
        pitch_id: u32,
        reviewer_id: u32,
        content: String,
    ) -> StoreResult<FeedbackRecord>;
    /// Newest first, at most `limit` items.
    fn list_recent_feedback(&self, pitch_id: u32, limit: usize) -> StoreResult<Vec<FeedbackView>>;
}

/// Everything the API needs from storage.
pub trait ShowcaseStore:
    UserStore + TeamStore + PitchStore + VoteStore + FeedbackStore + Send + Sync
{
}

impl<T> ShowcaseStore for T where
    T: UserStore + TeamStore + PitchStore + VoteStore + FeedbackStore + Send + Sync
{
}

pub type SharedStore = Arc<dyn ShowcaseStore>;

/// Pair each pitch with its owning team. Pitches whose team is gone are skipped.
pub fn attach_teams<S>(store: &S, pitches: Vec<PitchRecord>) -> StoreResult<Vec<PitchWithTeam>>
where
    S: TeamStore + ?Sized,
{
    let mut team_ids: Vec<u32> = pitches.iter().map(|p| p.team_id).collect();
    team_ids.sort_unstable();
    team_ids.dedup();

    let teams: HashMap<u32, TeamSummary> = store
        .get_teams_by_ids(&team_ids)?
        .iter()
        .map(|t| (t.team_id, TeamSummary::from(t)))
        .collect();

    Ok(pitches
        .into_iter()
        .filter_map(|pitch| match teams.get(&pitch.team_id) {
            Some(team) => Some(PitchWithTeam {
                team: team.clone(),
                pitch,
            }),
            None => {
                log::warn!(
                    "Pitch #{} references missing team #{}, skipping",
                    pitch.pitch_id,
                    pitch.team_id
                );
                None
            }
        })
        .collect())
}

/// Attach votes to each pitch with a single batched fetch.
pub fn attach_votes<S>(store: &S, pitches: Vec<PitchWithTeam>) -> StoreResult<Vec<PitchVotes>>
where
    S: VoteStore + ?Sized,
{
    let pitch_ids: Vec<u32> = pitches.iter().map(|p| p.pitch.pitch_id).collect();
    let mut votes = store.list_votes_for_pitches(&pitch_ids)?;

    Ok(pitches
        .into_iter()
        .map(|p| {
            let pitch_votes = votes.remove(&p.pitch.pitch_id).unwrap_or_default();
            PitchVotes::new(p, pitch_votes)
        })
        .collect())
}

/// Load every submitted pitch matching the filter, with its team and votes.
pub fn gather_pitch_votes<S>(store: &S, filter: &PitchFilter) -> StoreResult<Vec<PitchVotes>>
where
    S: PitchStore + TeamStore + VoteStore + ?Sized,
{
    let pitches = store.list_submitted_pitches(filter)?;
    let pitches = attach_teams(store, pitches)?;
    attach_votes(store, pitches)
}

/// Fetch, rank and paginate in one call.
pub fn build_leaderboard<S>(
    store: &S,
    filter: &PitchFilter,
    pagination: Pagination,
) -> StoreResult<LeaderboardPage>
where
    S: PitchStore + TeamStore + VoteStore + ?Sized,
{
    let pitches = gather_pitch_votes(store, filter)?;
    Ok(leaderboard::compute_leaderboard(pitches, pagination))
}
