//! Pitch submission, browsing, voting and feedback.

use crate::auth::{Founder, Reviewer};
use crate::helpers::{
    ApiCreatedResult, ApiError, ApiResult, created, parse_category, showcase_error,
};
use crate::rate_limit::VoteRateLimit;
use chrono::{DateTime, Utc};
use pitch_common::leaderboard::{round_to, summarize_votes};
use pitch_common::pagination::Pagination;
use pitch_common::store::{
    FeedbackStore, PitchStore, SharedStore, ShowcaseStore, TeamStore, VoteStore, attach_teams,
    attach_votes,
};
use pitch_common::validation::{validate_feedback, validate_rating, validate_title, validate_url};
use pitch_common::{
    Category, DEFAULT_PITCHES_PAGE_LIMIT, FeedbackView, NewPitch, PitchFilter, PitchRecord,
    PitchStatus, RECENT_FEEDBACK_COUNT, ShowcaseError, TeamMember, TeamSummary, VoteRecord,
};
use rocket::State;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct NewPitchRequest {
    pub team_id: u32,
    pub title: String,
    pub demo_link: String,
    pub deck_url: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct PitchView {
    pub id: u32,
    pub team_id: u32,
    pub title: String,
    pub demo_link: String,
    pub deck_url: String,
    pub category: Category,
    pub status: PitchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PitchRecord> for PitchView {
    fn from(pitch: PitchRecord) -> Self {
        Self {
            id: pitch.pitch_id,
            team_id: pitch.team_id,
            title: pitch.title,
            demo_link: pitch.demo_link,
            deck_url: pitch.deck_url,
            category: pitch.category,
            status: pitch.status,
            created_at: pitch.created_at,
            updated_at: pitch.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PitchResponse {
    pub message: String,
    pub pitch: PitchView,
}

/// A row of the public pitch list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct PitchListing {
    #[serde(flatten)]
    pub pitch: PitchView,
    pub team: TeamSummary,
    pub total_votes: usize,
    pub average_rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct PitchListPage {
    pub pitches: Vec<PitchListing>,
    pub total_pages: usize,
    pub current_page: u32,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TeamDetail {
    pub id: u32,
    pub name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct PitchDetail {
    #[serde(flatten)]
    pub pitch: PitchView,
    pub team: TeamDetail,
    pub total_votes: usize,
    pub average_rating: f64,
    pub weighted_score: f64,
    pub recent_feedback: Vec<FeedbackView>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct VoteRequest {
    pub rating: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    pub id: u32,
    pub pitch_id: u32,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VoteRecord> for VoteView {
    fn from(vote: VoteRecord) -> Self {
        Self {
            id: vote.vote_id,
            pitch_id: vote.pitch_id,
            rating: vote.rating,
            created_at: vote.created_at,
            updated_at: vote.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct VoteResponse {
    pub message: String,
    pub vote: VoteView,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct FeedbackRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: u32,
    pub pitch_id: u32,
    pub content: String,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct FeedbackResponse {
    pub message: String,
    pub feedback: FeedbackItem,
}

/// Votes and feedback only go to pitches that have been submitted.
fn submitted_pitch(store: &SharedStore, pitch_id: u32) -> Result<PitchRecord, ApiError> {
    store
        .get_pitch_by_id(pitch_id)
        .map_err(showcase_error)?
        .filter(|pitch| pitch.status == PitchStatus::Submitted)
        .ok_or_else(|| showcase_error(ShowcaseError::PitchNotFound(pitch_id)))
}

#[post("/pitches", data = "<request>")]
pub fn create_pitch(
    founder: Founder,
    request: Json<NewPitchRequest>,
    store: &State<SharedStore>,
) -> ApiCreatedResult<PitchResponse> {
    let Founder(user) = founder;
    let request = request.into_inner();

    let team = store
        .get_team_by_id(request.team_id)
        .map_err(showcase_error)?
        .filter(|team| team.founder_id == user.user_id)
        .ok_or_else(|| showcase_error(ShowcaseError::TeamNotFound))?;

    let title = validate_title(&request.title).map_err(showcase_error)?;
    let demo_link = validate_url("demoLink", &request.demo_link).map_err(showcase_error)?;
    let deck_url = validate_url("deckUrl", &request.deck_url).map_err(showcase_error)?;
    let category: Category = request
        .category
        .trim()
        .to_lowercase()
        .parse()
        .map_err(showcase_error)?;

    if store
        .get_pitch_by_team(team.team_id)
        .map_err(showcase_error)?
        .is_some()
    {
        return Err(showcase_error(ShowcaseError::DuplicateTeamPitch));
    }

    // the store rejects a concurrent second insert for the same team as well
    let pitch = store
        .insert_pitch(NewPitch {
            team_id: team.team_id,
            title,
            demo_link,
            deck_url,
            category,
            status: PitchStatus::Submitted,
        })
        .map_err(showcase_error)?;
    tracing::info!(
        pitch_id = pitch.pitch_id,
        team_id = team.team_id,
        category = category.as_str(),
        "Pitch submitted"
    );

    Ok(created(PitchResponse {
        message: "Pitch submitted successfully".to_string(),
        pitch: PitchView::from(pitch),
    }))
}

#[get("/pitches?<category>&<search>&<page>&<limit>")]
pub fn list_pitches(
    category: Option<&str>,
    search: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
    store: &State<SharedStore>,
) -> ApiResult<PitchListPage> {
    let filter = PitchFilter {
        category: parse_category(category)?,
        title_search: search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };
    let pagination = Pagination::from_query(page, limit, DEFAULT_PITCHES_PAGE_LIMIT);

    let pitches = store
        .list_submitted_pitches(&filter)
        .map_err(showcase_error)?;
    let page = pagination.paginate(pitches);

    let store: &dyn ShowcaseStore = store.inner().as_ref();
    let with_teams = attach_teams(store, page.items).map_err(showcase_error)?;
    let with_votes = attach_votes(store, with_teams).map_err(showcase_error)?;

    let pitches = with_votes
        .into_iter()
        .map(|p| {
            let summary = summarize_votes(&p.votes);
            PitchListing {
                pitch: PitchView::from(p.pitch),
                team: p.team,
                total_votes: summary.total_votes,
                average_rating: round_to(summary.average_rating, 1),
            }
        })
        .collect();

    Ok(Json(PitchListPage {
        pitches,
        total_pages: page.total_pages,
        current_page: page.current_page,
        total: page.total,
    }))
}

#[get("/pitches/<id>")]
pub fn pitch_detail(id: u32, store: &State<SharedStore>) -> ApiResult<PitchDetail> {
    let pitch = store
        .get_pitch_by_id(id)
        .map_err(showcase_error)?
        .ok_or_else(|| showcase_error(ShowcaseError::PitchNotFound(id)))?;
    let team = store
        .get_team_by_id(pitch.team_id)
        .map_err(showcase_error)?
        .ok_or_else(|| showcase_error(ShowcaseError::TeamNotFound))?;

    let votes = store.list_votes(id).map_err(showcase_error)?;
    let summary = summarize_votes(&votes);
    let recent_feedback = store
        .list_recent_feedback(id, RECENT_FEEDBACK_COUNT)
        .map_err(showcase_error)?;

    Ok(Json(PitchDetail {
        pitch: PitchView::from(pitch),
        team: TeamDetail {
            id: team.team_id,
            name: team.name,
            members: team.members,
        },
        total_votes: summary.total_votes,
        average_rating: round_to(summary.average_rating, 1),
        weighted_score: round_to(summary.weighted_score, 2),
        recent_feedback,
    }))
}

#[post("/pitches/<id>/vote", data = "<request>")]
pub fn vote(
    id: u32,
    reviewer: Reviewer,
    _rate_limit: VoteRateLimit,
    request: Json<VoteRequest>,
    store: &State<SharedStore>,
) -> ApiResult<VoteResponse> {
    let Reviewer(user) = reviewer;
    let rating = validate_rating(request.rating).map_err(showcase_error)?;
    let pitch = submitted_pitch(store, id)?;

    let vote = store
        .upsert_vote(pitch.pitch_id, user.user_id, rating)
        .map_err(showcase_error)?;
    tracing::info!(
        pitch_id = pitch.pitch_id,
        reviewer_id = user.user_id,
        rating,
        "Vote recorded"
    );

    Ok(Json(VoteResponse {
        message: "Vote recorded successfully".to_string(),
        vote: VoteView::from(vote),
    }))
}

#[post("/pitches/<id>/feedback", data = "<request>")]
pub fn add_feedback(
    id: u32,
    reviewer: Reviewer,
    request: Json<FeedbackRequest>,
    store: &State<SharedStore>,
) -> ApiCreatedResult<FeedbackResponse> {
    let Reviewer(user) = reviewer;
    let content = validate_feedback(&request.content).map_err(showcase_error)?;
    let pitch = submitted_pitch(store, id)?;

    let feedback = store
        .insert_feedback(pitch.pitch_id, user.user_id, content)
        .map_err(showcase_error)?;
    tracing::info!(
        pitch_id = pitch.pitch_id,
        reviewer_id = user.user_id,
        "Feedback added"
    );

    Ok(created(FeedbackResponse {
        message: "Feedback added successfully".to_string(),
        feedback: FeedbackItem {
            id: feedback.feedback_id,
            pitch_id: feedback.pitch_id,
            content: feedback.content,
            reviewer_name: user.name,
            created_at: feedback.created_at,
        },
    }))
}
