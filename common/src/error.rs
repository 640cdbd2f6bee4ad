//! Failure categories surfaced to callers of the stores and the API.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShowcaseError {
    #[error("pitch #{0} not found")]
    PitchNotFound(u32),

    #[error("team not found or access denied")]
    TeamNotFound,

    #[error("team already has a pitch")]
    DuplicateTeamPitch,

    #[error("rating must be an integer between 1 and 5 (got {0})")]
    InvalidRating(i64),

    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("access token required")]
    Unauthenticated,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("database error: {0}")]
    Database(String),
}
