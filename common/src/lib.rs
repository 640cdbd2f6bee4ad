//! A library with common types, ranking and storage for the pitch showcase.

pub mod error;
pub mod leaderboard;
pub mod pagination;
pub mod store;
pub mod validation;

#[cfg(feature = "database")]
pub mod db_util;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use error::ShowcaseError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_FEEDBACK_LENGTH: usize = 240;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// How many feedback items the pitch detail view shows.
pub const RECENT_FEEDBACK_COUNT: usize = 5;
pub const DEFAULT_PITCHES_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_LEADERBOARD_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Each category a pitch can be filed under.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fintech,
    Health,
    Ai,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Fintech,
        Category::Health,
        Category::Ai,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fintech => "fintech",
            Category::Health => "health",
            Category::Ai => "ai",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fintech" => Ok(Category::Fintech),
            "health" => Ok(Category::Health),
            "ai" => Ok(Category::Ai),
            "other" => Ok(Category::Other),
            _ => Err(ShowcaseError::Validation(format!(
                "category must be one of fintech, health, ai, other (got {s:?})"
            ))),
        }
    }
}

/// Whether a pitch is visible to reviewers yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchStatus {
    Draft,
    Submitted,
}

impl PitchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PitchStatus::Draft => "draft",
            PitchStatus::Submitted => "submitted",
        }
    }
}

impl FromStr for PitchStatus {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PitchStatus::Draft),
            "submitted" => Ok(PitchStatus::Submitted),
            _ => Err(ShowcaseError::Validation(format!(
                "unknown pitch status {s:?}"
            ))),
        }
    }
}

/// The two kinds of account. Founders own teams and pitches, reviewers rate them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Founder,
    Reviewer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Founder => "founder",
            UserRole::Reviewer => "reviewer",
        }
    }
}

impl FromStr for UserRole {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "founder" => Ok(UserRole::Founder),
            "reviewer" => Ok(UserRole::Reviewer),
            _ => Err(ShowcaseError::Validation(format!(
                "role must be founder or reviewer (got {s:?})"
            ))),
        }
    }
}

/// A user account. The password hash never leaves the store through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: u32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: u32,
    pub name: String,
    pub founder_id: u32,
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
}

/// The slice of a team shown next to its pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: u32,
    pub name: String,
}

impl From<&TeamRecord> for TeamSummary {
    fn from(team: &TeamRecord) -> Self {
        TeamSummary {
            id: team.team_id,
            name: team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub pitch_id: u32,
    pub team_id: u32,
    pub title: String,
    pub demo_link: String,
    pub deck_url: String,
    pub category: Category,
    pub status: PitchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPitch {
    pub team_id: u32,
    pub title: String,
    pub demo_link: String,
    pub deck_url: String,
    pub category: Category,
    pub status: PitchStatus,
}

/// Narrows the set of submitted pitches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitchFilter {
    pub category: Option<Category>,
    /// Case-insensitive substring of the title.
    pub title_search: Option<String>,
}

impl PitchFilter {
    /// Check a pitch against the filter. Status is not considered here.
    pub fn matches(&self, pitch: &PitchRecord) -> bool {
        if let Some(category) = self.category
            && pitch.category != category
        {
            return false;
        }
        match &self.title_search {
            Some(needle) if !needle.is_empty() => pitch
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

/// A submitted pitch together with the team that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchWithTeam {
    pub pitch: PitchRecord,
    pub team: TeamSummary,
}

/// A reviewer's current rating for a pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub vote_id: u32,
    pub pitch_id: u32,
    pub reviewer_id: u32,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub feedback_id: u32,
    pub pitch_id: u32,
    pub reviewer_id: u32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Feedback as shown on a pitch page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub content: String,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}
