//! The production store: each call checks a connection out of the pool and runs one `db_util` helper.

use super::*;
use crate::db_util::{self, PgPool, PgPooledConnection};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `DATABASE_URL`.
    pub fn from_env(max_pool_size: u32) -> StoreResult<Self> {
        db_util::get_database_pool(max_pool_size)
            .map(Self::new)
            .map_err(ShowcaseError::Database)
    }

    fn conn(&self) -> StoreResult<PgPooledConnection> {
        db_util::get_pooled_database_connection(&self.pool).map_err(ShowcaseError::Database)
    }
}

impl UserStore for PgStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        db_util::insert_user(&mut *self.conn()?, user)
            .map_err(ShowcaseError::Database)?
            .ok_or(ShowcaseError::DuplicateUser)
    }

    fn get_user_by_id(&self, user_id: u32) -> StoreResult<Option<UserRecord>> {
        db_util::get_user_by_id(&mut *self.conn()?, user_id).map_err(ShowcaseError::Database)
    }

    fn get_credentials_by_email(&self, email: &str) -> StoreResult<Option<(UserRecord, String)>> {
        db_util::get_user_credentials_by_email(&mut *self.conn()?, email)
            .map_err(ShowcaseError::Database)
    }

    fn insert_session(&self, session: SessionRecord) -> StoreResult<()> {
        db_util::insert_session(&mut *self.conn()?, session).map_err(ShowcaseError::Database)
    }

    fn get_session(&self, token: &str) -> StoreResult<Option<SessionRecord>> {
        db_util::get_session_by_token(&mut *self.conn()?, token).map_err(ShowcaseError::Database)
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        db_util::delete_sessions_expired_before(&mut *self.conn()?, now)
            .map_err(ShowcaseError::Database)
    }
}

impl TeamStore for PgStore {
    fn insert_team(
        &self,
        founder_id: u32,
        name: String,
        members: Vec<TeamMember>,
    ) -> StoreResult<TeamRecord> {
        db_util::insert_team(&mut *self.conn()?, founder_id, name, members)
            .map_err(ShowcaseError::Database)
    }

    fn get_team_by_id(&self, team_id: u32) -> StoreResult<Option<TeamRecord>> {
        db_util::get_team_by_id(&mut *self.conn()?, team_id).map_err(ShowcaseError::Database)
    }

    fn get_teams_by_founder(&self, founder_id: u32) -> StoreResult<Vec<TeamRecord>> {
        db_util::get_teams_by_founder(&mut *self.conn()?, founder_id)
            .map_err(ShowcaseError::Database)
    }

    fn get_teams_by_ids(&self, team_ids: &[u32]) -> StoreResult<Vec<TeamRecord>> {
        db_util::get_teams_by_ids(&mut *self.conn()?, team_ids).map_err(ShowcaseError::Database)
    }
}

impl PitchStore for PgStore {
    fn insert_pitch(&self, pitch: NewPitch) -> StoreResult<PitchRecord> {
        db_util::insert_pitch(&mut *self.conn()?, pitch)
            .map_err(ShowcaseError::Database)?
            .ok_or(ShowcaseError::DuplicateTeamPitch)
    }

    fn get_pitch_by_id(&self, pitch_id: u32) -> StoreResult<Option<PitchRecord>> {
        db_util::get_pitch_by_id(&mut *self.conn()?, pitch_id).map_err(ShowcaseError::Database)
    }

    fn get_pitch_by_team(&self, team_id: u32) -> StoreResult<Option<PitchRecord>> {
        db_util::get_pitch_by_team(&mut *self.conn()?, team_id).map_err(ShowcaseError::Database)
    }

    fn list_submitted_pitches(&self, filter: &PitchFilter) -> StoreResult<Vec<PitchRecord>> {
        db_util::get_submitted_pitches(&mut *self.conn()?, filter).map_err(ShowcaseError::Database)
    }
}

impl VoteStore for PgStore {
    fn upsert_vote(&self, pitch_id: u32, reviewer_id: u32, rating: u8) -> StoreResult<VoteRecord> {
        db_util::upsert_vote(&mut *self.conn()?, pitch_id, reviewer_id, rating)
            .map_err(ShowcaseError::Database)
    }

    fn list_votes(&self, pitch_id: u32) -> StoreResult<Vec<VoteRecord>> {
        db_util::get_votes_for_pitch(&mut *self.conn()?, pitch_id).map_err(ShowcaseError::Database)
    }

    fn list_votes_for_pitches(
        &self,
        pitch_ids: &[u32],
    ) -> StoreResult<HashMap<u32, Vec<VoteRecord>>> {
        db_util::get_votes_for_pitches(&mut *self.conn()?, pitch_ids)
            .map_err(ShowcaseError::Database)
    }
}

impl FeedbackStore for PgStore {
    fn insert_feedback(
        &self,
        pitch_id: u32,
        reviewer_id: u32,
        content: String,
    ) -> StoreResult<FeedbackRecord> {
        db_util::insert_feedback(&mut *self.conn()?, pitch_id, reviewer_id, content)
            .map_err(ShowcaseError::Database)
    }

    fn list_recent_feedback(&self, pitch_id: u32, limit: usize) -> StoreResult<Vec<FeedbackView>> {
        db_util::get_recent_feedback_for_pitch(&mut *self.conn()?, pitch_id, limit)
            .map_err(ShowcaseError::Database)
    }
}
