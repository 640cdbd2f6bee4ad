//! Input checks applied before anything reaches a store.

use crate::{
    MAX_FEEDBACK_LENGTH, MAX_RATING, MAX_TITLE_LENGTH, MIN_PASSWORD_LENGTH, MIN_RATING,
    ShowcaseError, TeamMember,
};

/// Accept an integer rating in `[1, 5]`.
pub fn validate_rating(rating: i64) -> Result<u8, ShowcaseError> {
    match u8::try_from(rating) {
        Ok(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(r),
        _ => Err(ShowcaseError::InvalidRating(rating)),
    }
}

/// Trim and lowercase an email address, rejecting anything without a plausible shape.
pub fn normalize_email(email: &str) -> Result<String, ShowcaseError> {
    let email = email.trim().to_lowercase();
    let invalid = || ShowcaseError::Validation("a valid email is required".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), ShowcaseError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ShowcaseError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Trim a required free-text field such as a user or team name.
pub fn require_non_empty(field: &str, value: &str) -> Result<String, ShowcaseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShowcaseError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub fn validate_title(title: &str) -> Result<String, ShowcaseError> {
    let title = require_non_empty("title", title)?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ShowcaseError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title)
}

/// Accept an absolute http(s) URL with a host.
pub fn validate_url(field: &str, url: &str) -> Result<String, ShowcaseError> {
    let url = url.trim();
    let invalid = || ShowcaseError::Validation(format!("{field} must be a valid http(s) URL"));

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(invalid)?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let hostname = host.split(':').next().unwrap_or_default();

    if hostname.is_empty()
        || url.chars().any(char::is_whitespace)
        || !hostname
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(invalid());
    }
    Ok(url.to_string())
}

pub fn validate_feedback(content: &str) -> Result<String, ShowcaseError> {
    let content = require_non_empty("content", content)?;
    if content.chars().count() > MAX_FEEDBACK_LENGTH {
        return Err(ShowcaseError::Validation(format!(
            "feedback must be at most {MAX_FEEDBACK_LENGTH} characters"
        )));
    }
    Ok(content)
}

/// Trim member fields. Members with no name at all are dropped.
pub fn clean_members(members: Vec<TeamMember>) -> Vec<TeamMember> {
    members
        .into_iter()
        .filter(|m| !m.name.trim().is_empty())
        .map(|m| TeamMember {
            name: m.name.trim().to_string(),
            role: m.role.trim().to_string(),
            email: m.email.trim().to_lowercase(),
        })
        .collect()
}
