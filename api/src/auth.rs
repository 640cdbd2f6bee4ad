//! Bearer-token sessions, password checks and the request guards built on them.

use crate::helpers::{GuardFailure, status_for};
use chrono::{DateTime, TimeDelta, Utc};
use pitch_common::store::{SharedStore, ShowcaseStore};
use pitch_common::{SessionRecord, ShowcaseError, UserRecord, UserRole};
use rand::distr::{Alphanumeric, SampleString};
use rocket::http::Status;
use rocket::outcome::{Outcome, try_outcome};
use rocket::request::{self, FromRequest, Request};

const SESSION_TOKEN_LENGTH: usize = 48;

pub fn hash_password(password: &str, cost: u32) -> Result<String, ShowcaseError> {
    bcrypt::hash(password, cost).map_err(|err| ShowcaseError::Database(err.to_string()))
}

/// Check a password against a stored hash. A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Create and store a new session token for a user.
pub fn issue_session(
    store: &dyn ShowcaseStore,
    user_id: u32,
    ttl_hours: i64,
    now: DateTime<Utc>,
) -> Result<SessionRecord, ShowcaseError> {
    let session = SessionRecord {
        token: Alphanumeric.sample_string(&mut rand::rng(), SESSION_TOKEN_LENGTH),
        user_id,
        expires_at: now + TimeDelta::hours(ttl_hours),
    };
    store.insert_session(session.clone())?;
    Ok(session)
}

/// Find the live user behind a token.
pub fn resolve_session(
    store: &dyn ShowcaseStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<UserRecord, ShowcaseError> {
    let session = store
        .get_session(token)?
        .ok_or(ShowcaseError::InvalidToken)?;
    if session.expires_at <= now {
        return Err(ShowcaseError::InvalidToken);
    }
    store
        .get_user_by_id(session.user_id)?
        .ok_or(ShowcaseError::InvalidToken)
}

fn bearer_token<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    request
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn guard_error<T>(request: &Request<'_>, err: ShowcaseError) -> request::Outcome<T, ShowcaseError> {
    GuardFailure::record(request, &err);
    Outcome::Error((status_for(&err), err))
}

/// Any signed-in user.
pub struct AuthenticatedUser(pub UserRecord);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ShowcaseError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(store) = request.rocket().state::<SharedStore>() else {
            return guard_error(
                request,
                ShowcaseError::Database("no store is configured".to_string()),
            );
        };
        let Some(token) = bearer_token(request) else {
            return guard_error(request, ShowcaseError::Unauthenticated);
        };
        match resolve_session(store.as_ref(), token, Utc::now()) {
            Ok(user) => Outcome::Success(AuthenticatedUser(user)),
            Err(err) => {
                if let ShowcaseError::Database(detail) = &err {
                    tracing::error!(error = %detail, "Session lookup failed");
                }
                guard_error(request, err)
            }
        }
    }
}

async fn require_role<'r>(
    request: &'r Request<'_>,
    role: UserRole,
) -> request::Outcome<UserRecord, ShowcaseError> {
    let AuthenticatedUser(user) = try_outcome!(request.guard::<AuthenticatedUser>().await);
    if user.role != role {
        return guard_error(request, ShowcaseError::Forbidden);
    }
    Outcome::Success(user)
}

/// A signed-in founder.
pub struct Founder(pub UserRecord);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Founder {
    type Error = ShowcaseError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        require_role(request, UserRole::Founder).await.map(Founder)
    }
}

/// A signed-in reviewer.
pub struct Reviewer(pub UserRecord);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Reviewer {
    type Error = ShowcaseError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        require_role(request, UserRole::Reviewer).await.map(Reviewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_common::NewUser;
    use pitch_common::store::{MemoryStore, UserStore};

    fn store_with_user() -> (MemoryStore, UserRecord) {
        let store = MemoryStore::new();
        let user = store
            .insert_user(NewUser {
                email: "reviewer1@example.com".to_string(),
                password_hash: hash_password("password123", 4).unwrap(),
                role: UserRole::Reviewer,
                name: "Reviewer 1".to_string(),
            })
            .unwrap();
        (store, user)
    }

    #[test_log::test]
    fn test_password_round_trip() {
        let hash = hash_password("password123", 4).unwrap();
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-hash"));
    }

    #[test_log::test]
    fn test_session_resolves_until_expiry() {
        let (store, user) = store_with_user();
        let now = Utc::now();
        let session = issue_session(&store, user.user_id, 24, now).unwrap();

        assert_eq!(session.token.len(), SESSION_TOKEN_LENGTH);
        assert_eq!(resolve_session(&store, &session.token, now).unwrap(), user);
        assert_eq!(
            resolve_session(&store, &session.token, now + TimeDelta::hours(25)),
            Err(ShowcaseError::InvalidToken)
        );
        assert_eq!(
            resolve_session(&store, "unknown", now),
            Err(ShowcaseError::InvalidToken)
        );
    }
}
