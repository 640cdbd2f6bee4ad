//! Fixed-window rate limiting for vote submissions, keyed by client IP.

use crate::helpers::{ApiErrorKind, GuardFailure};
use pitch_common::ShowcaseError;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Past this many tracked clients, stale windows are dropped on the next check.
const PRUNE_THRESHOLD: usize = 10_000;

pub struct VoteRateLimiter {
    limit: u32,
    window: Duration,
    /// Window start and hit count per client.
    hits: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl VoteRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Count a hit for `client`. Returns false once the client is over the limit for this window.
    pub fn check(&self, client: IpAddr, now: Instant) -> bool {
        let Ok(mut hits) = self.hits.lock() else {
            tracing::error!("Rate limiter lock poisoned, allowing request");
            return true;
        };

        if hits.len() > PRUNE_THRESHOLD {
            let window = self.window;
            hits.retain(|_, (started, _)| now.duration_since(*started) < window);
        }

        let entry = hits.entry(client).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        if entry.1 >= self.limit {
            return false;
        }
        entry.1 += 1;
        true
    }
}

/// Passes while the caller is under the vote limit.
pub struct VoteRateLimit;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoteRateLimit {
    type Error = ShowcaseError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(limiter) = request.rocket().state::<VoteRateLimiter>() else {
            return Outcome::Success(VoteRateLimit);
        };
        let client = request
            .client_ip()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        if limiter.check(client, Instant::now()) {
            Outcome::Success(VoteRateLimit)
        } else {
            tracing::warn!(client = %client, kind = ?ApiErrorKind::TooManyRequests, "Vote rate limit hit");
            let err = ShowcaseError::Validation("Too many votes, please try again later".to_string());
            GuardFailure::record(request, &err);
            Outcome::Error((Status::TooManyRequests, err))
        }
    }
}
