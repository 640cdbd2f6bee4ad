//! A process-local store. Every table lives behind one mutex, so each trait call is atomic.

use super::*;
use crate::PitchStatus;
use chrono::TimeDelta;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    next_id: u32,
    last_tick: DateTime<Utc>,
    users: Vec<(UserRecord, String)>,
    sessions: HashMap<String, SessionRecord>,
    teams: Vec<TeamRecord>,
    pitches: Vec<PitchRecord>,
    /// Keyed by (pitch, reviewer): one live vote per pair.
    votes: HashMap<(u32, u32), VoteRecord>,
    feedback: Vec<FeedbackRecord>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps, so ordering by time is never ambiguous.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now().max(self.last_tick + TimeDelta::microseconds(1));
        self.last_tick = now;
        now
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ShowcaseError::Database("memory store lock poisoned".to_string()))
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut state = self.state()?;
        if state.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(ShowcaseError::DuplicateUser);
        }
        let record = UserRecord {
            user_id: state.allocate_id(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: state.tick(),
        };
        state.users.push((record.clone(), user.password_hash));
        Ok(record)
    }

    fn get_user_by_id(&self, user_id: u32) -> StoreResult<Option<UserRecord>> {
        let state = self.state()?;
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.user_id == user_id)
            .map(|(u, _)| u.clone()))
    }

    fn get_credentials_by_email(&self, email: &str) -> StoreResult<Option<(UserRecord, String)>> {
        let state = self.state()?;
        Ok(state.users.iter().find(|(u, _)| u.email == email).cloned())
    }

    fn insert_session(&self, session: SessionRecord) -> StoreResult<()> {
        let mut state = self.state()?;
        state.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    fn get_session(&self, token: &str) -> StoreResult<Option<SessionRecord>> {
        let state = self.state()?;
        Ok(state.sessions.get(token).cloned())
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut state = self.state()?;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at > now);
        Ok(before - state.sessions.len())
    }
}

impl TeamStore for MemoryStore {
    fn insert_team(
        &self,
        founder_id: u32,
        name: String,
        members: Vec<TeamMember>,
    ) -> StoreResult<TeamRecord> {
        let mut state = self.state()?;
        let record = TeamRecord {
            team_id: state.allocate_id(),
            name,
            founder_id,
            members,
            created_at: state.tick(),
        };
        state.teams.push(record.clone());
        Ok(record)
    }

    fn get_team_by_id(&self, team_id: u32) -> StoreResult<Option<TeamRecord>> {
        let state = self.state()?;
        Ok(state.teams.iter().find(|t| t.team_id == team_id).cloned())
    }

    fn get_teams_by_founder(&self, founder_id: u32) -> StoreResult<Vec<TeamRecord>> {
        let state = self.state()?;
        Ok(state
            .teams
            .iter()
            .filter(|t| t.founder_id == founder_id)
            .cloned()
            .collect())
    }

    fn get_teams_by_ids(&self, team_ids: &[u32]) -> StoreResult<Vec<TeamRecord>> {
        let wanted: HashSet<u32> = team_ids.iter().copied().collect();
        let state = self.state()?;
        Ok(state
            .teams
            .iter()
            .filter(|t| wanted.contains(&t.team_id))
            .cloned()
            .collect())
    }
}

impl PitchStore for MemoryStore {
    fn insert_pitch(&self, pitch: NewPitch) -> StoreResult<PitchRecord> {
        let mut state = self.state()?;
        if state.pitches.iter().any(|p| p.team_id == pitch.team_id) {
            return Err(ShowcaseError::DuplicateTeamPitch);
        }
        let now = state.tick();
        let record = PitchRecord {
            pitch_id: state.allocate_id(),
            team_id: pitch.team_id,
            title: pitch.title,
            demo_link: pitch.demo_link,
            deck_url: pitch.deck_url,
            category: pitch.category,
            status: pitch.status,
            created_at: now,
            updated_at: now,
        };
        state.pitches.push(record.clone());
        Ok(record)
    }

    fn get_pitch_by_id(&self, pitch_id: u32) -> StoreResult<Option<PitchRecord>> {
        let state = self.state()?;
        Ok(state.pitches.iter().find(|p| p.pitch_id == pitch_id).cloned())
    }

    fn get_pitch_by_team(&self, team_id: u32) -> StoreResult<Option<PitchRecord>> {
        let state = self.state()?;
        Ok(state.pitches.iter().find(|p| p.team_id == team_id).cloned())
    }

    fn list_submitted_pitches(&self, filter: &PitchFilter) -> StoreResult<Vec<PitchRecord>> {
        let state = self.state()?;
        let mut pitches: Vec<PitchRecord> = state
            .pitches
            .iter()
            .filter(|p| p.status == PitchStatus::Submitted && filter.matches(p))
            .cloned()
            .collect();
        pitches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.pitch_id.cmp(&a.pitch_id))
        });
        Ok(pitches)
    }
}

impl VoteStore for MemoryStore {
    fn upsert_vote(&self, pitch_id: u32, reviewer_id: u32, rating: u8) -> StoreResult<VoteRecord> {
        let mut state = self.state()?;
        let now = state.tick();
        if let Some(existing) = state.votes.get_mut(&(pitch_id, reviewer_id)) {
            existing.rating = rating;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let record = VoteRecord {
            vote_id: state.allocate_id(),
            pitch_id,
            reviewer_id,
            rating,
            created_at: now,
            updated_at: now,
        };
        state.votes.insert((pitch_id, reviewer_id), record.clone());
        Ok(record)
    }

    fn list_votes(&self, pitch_id: u32) -> StoreResult<Vec<VoteRecord>> {
        let state = self.state()?;
        let mut votes: Vec<VoteRecord> = state
            .votes
            .values()
            .filter(|v| v.pitch_id == pitch_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| v.vote_id);
        Ok(votes)
    }

    fn list_votes_for_pitches(
        &self,
        pitch_ids: &[u32],
    ) -> StoreResult<HashMap<u32, Vec<VoteRecord>>> {
        let wanted: HashSet<u32> = pitch_ids.iter().copied().collect();
        let state = self.state()?;
        let mut grouped: HashMap<u32, Vec<VoteRecord>> = HashMap::new();
        for vote in state.votes.values().filter(|v| wanted.contains(&v.pitch_id)) {
            grouped.entry(vote.pitch_id).or_default().push(vote.clone());
        }
        for votes in grouped.values_mut() {
            votes.sort_by_key(|v| v.vote_id);
        }
        Ok(grouped)
    }
}

impl FeedbackStore for MemoryStore {
    fn insert_feedback(
        &self,
        pitch_id: u32,
        reviewer_id: u32,
        content: String,
    ) -> StoreResult<FeedbackRecord> {
        let mut state = self.state()?;
        let record = FeedbackRecord {
            feedback_id: state.allocate_id(),
            pitch_id,
            reviewer_id,
            content,
            created_at: state.tick(),
        };
        state.feedback.push(record.clone());
        Ok(record)
    }

    fn list_recent_feedback(&self, pitch_id: u32, limit: usize) -> StoreResult<Vec<FeedbackView>> {
        let state = self.state()?;
        let mut items: Vec<&FeedbackRecord> = state
            .feedback
            .iter()
            .filter(|f| f.pitch_id == pitch_id)
            .collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.feedback_id.cmp(&a.feedback_id))
        });
        Ok(items
            .into_iter()
            .take(limit)
            .map(|f| FeedbackView {
                content: f.content.clone(),
                reviewer_name: state
                    .users
                    .iter()
                    .find(|(u, _)| u.user_id == f.reviewer_id)
                    .map(|(u, _)| u.name.clone())
                    .unwrap_or_default(),
                created_at: f.created_at,
            })
            .collect())
    }
}
