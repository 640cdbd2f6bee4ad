//! An api for submitting, rating and ranking startup pitches.

#[macro_use]
extern crate rocket;

mod accounts;
mod auth;
mod config;
mod helpers;
mod leaderboard;
mod pitches;
mod rate_limit;
mod teams;

use config::AppConfig;
use helpers::{ApiError, ApiErrorBody, ApiErrorKind, CorsFairing, GuardFailure, RequestTimingFairing};
use pitch_common::store::{PgStore, SharedStore};
use rate_limit::VoteRateLimiter;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::status as rocket_status;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};
use rocket_prometheus::PrometheusMetrics;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[get("/")]
fn index() -> Value {
    json!({ "message": "Pitch showcase API is running" })
}

#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> ApiError {
    let message = GuardFailure::message(request)
        .unwrap_or_else(|| "The requested resource could not be found.".to_string());
    rocket_status::Custom(
        Status::NotFound,
        Json(ApiErrorBody::new(ApiErrorKind::NotFound, message)),
    )
}

#[catch(default)]
fn default_catcher(status: Status, request: &Request<'_>) -> ApiError {
    let message = match GuardFailure::message(request) {
        _ if status.code >= 500 => "Internal server error".to_string(),
        Some(message) => message,
        None => status.reason().unwrap_or("Request failed").to_string(),
    };
    rocket_status::Custom(
        status,
        Json(ApiErrorBody::new(ApiErrorKind::from_status(status), message)),
    )
}

/// Assemble the server around an already-built store.
pub fn build_rocket(store: SharedStore, config: AppConfig) -> Rocket<Build> {
    let prometheus = PrometheusMetrics::new();
    let limiter = VoteRateLimiter::new(
        config.vote_rate_limit,
        Duration::from_secs(config.vote_rate_window_secs),
    );

    rocket::build()
        .attach(RequestTimingFairing)
        .attach(CorsFairing)
        .attach(prometheus.clone())
        .manage(store)
        .manage(config)
        .manage(limiter)
        .mount(
            "/",
            routes![
                index,
                preflight,
                accounts::signup,
                accounts::login,
                teams::create_team,
                teams::list_teams,
                pitches::create_pitch,
                pitches::list_pitches,
                pitches::pitch_detail,
                pitches::vote,
                pitches::add_feedback,
                leaderboard::leaderboard,
            ],
        )
        .mount("/metrics", prometheus)
        .register("/", catchers![not_found, default_catcher])
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_figment(&rocket::Config::figment())?;
    tracing::info!(?config, "Starting pitch showcase API");

    let store: SharedStore = Arc::new(PgStore::from_env(config.database_pool_size)?);
    if let Err(err) = build_rocket(store, config).launch().await {
        anyhow::bail!("Rocket failed: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_common::store::MemoryStore;
    use rocket::http::{ContentType, Header};
    use rocket::local::blocking::{Client, LocalResponse};

    fn test_config() -> AppConfig {
        AppConfig {
            bcrypt_cost: 4,
            ..AppConfig::default()
        }
    }

    fn client_with(config: AppConfig) -> Client {
        let store: SharedStore = Arc::new(MemoryStore::new());
        Client::tracked(build_rocket(store, config)).unwrap()
    }

    fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {token}"))
    }

    fn body(response: LocalResponse<'_>) -> Value {
        response.into_json::<Value>().unwrap()
    }

    fn signup(client: &Client, email: &str, role: &str) -> String {
        let response = client
            .post("/auth/signup")
            .json(&json!({
                "email": email,
                "password": "password123",
                "role": role,
                "name": email.split('@').next().unwrap(),
            }))
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        body(response)["token"].as_str().unwrap().to_string()
    }

    fn create_team(client: &Client, token: &str, name: &str) -> u64 {
        let response = client
            .post("/teams")
            .header(bearer(token))
            .json(&json!({
                "name": name,
                "members": [{ "name": "Ada", "role": "CTO", "email": "ada@example.com" }],
            }))
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        body(response)["team"]["id"].as_u64().unwrap()
    }

    fn submit_pitch<'c>(
        client: &'c Client,
        token: &str,
        team_id: u64,
        title: &str,
    ) -> LocalResponse<'c> {
        client
            .post("/pitches")
            .header(bearer(token))
            .json(&json!({
                "teamId": team_id,
                "title": title,
                "demoLink": "https://demo.example.com",
                "deckUrl": "https://deck.example.com/deck.pdf",
                "category": "ai",
            }))
            .dispatch()
    }

    /// A founder with one submitted pitch. Returns the pitch id.
    fn founder_with_pitch(client: &Client, email: &str, title: &str) -> u64 {
        let token = signup(client, email, "founder");
        let team_id = create_team(client, &token, &format!("{title} Team"));
        let response = submit_pitch(client, &token, team_id, title);
        assert_eq!(response.status(), Status::Created);
        body(response)["pitch"]["id"].as_u64().unwrap()
    }

    fn cast_vote(client: &Client, token: &str, pitch_id: u64, rating: i64) -> Status {
        client
            .post(format!("/pitches/{pitch_id}/vote"))
            .header(bearer(token))
            .json(&json!({ "rating": rating }))
            .dispatch()
            .status()
    }

    #[test_log::test]
    fn test_health() {
        let client = client_with(test_config());
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(body(response)["message"].is_string());
    }

    #[test_log::test]
    fn test_signup_and_login() {
        let client = client_with(test_config());
        signup(&client, "Founder@Example.com ", "founder");

        let response = client
            .post("/auth/login")
            .json(&json!({ "email": "founder@example.com", "password": "password123" }))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let login = body(response);
        assert_eq!(login["user"]["email"], "founder@example.com");
        assert_eq!(login["user"]["role"], "founder");
        assert_eq!(login["token"].as_str().unwrap().len(), 48);

        let response = client
            .post("/auth/login")
            .json(&json!({ "email": "founder@example.com", "password": "wrong-password" }))
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(body(response)["error"], "unauthorized");

        let response = client
            .post("/auth/signup")
            .json(&json!({
                "email": "founder@example.com",
                "password": "password123",
                "role": "founder",
                "name": "Again",
            }))
            .dispatch();
        assert_eq!(response.status(), Status::Conflict);

        let response = client
            .post("/auth/signup")
            .json(&json!({
                "email": "short@example.com",
                "password": "abc",
                "role": "reviewer",
                "name": "Short",
            }))
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test_log::test]
    fn test_auth_guards() {
        let client = client_with(test_config());
        let reviewer = signup(&client, "reviewer@example.com", "reviewer");

        let response = client.get("/teams").dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(body(response)["message"], "access token required");

        let response = client.get("/teams").header(bearer("not-a-real-token")).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client.get("/teams").header(bearer(&reviewer)).dispatch();
        assert_eq!(response.status(), Status::Forbidden);
        assert_eq!(body(response)["error"], "forbidden");
    }

    #[test_log::test]
    fn test_one_pitch_per_team() {
        let client = client_with(test_config());
        let founder = signup(&client, "founder@example.com", "founder");
        let other = signup(&client, "other@example.com", "founder");
        let team_id = create_team(&client, &founder, "Rocketeers");

        let response = submit_pitch(&client, &other, team_id, "Not my team");
        assert_eq!(response.status(), Status::NotFound);

        let response = submit_pitch(&client, &founder, team_id, "Launch Pad");
        assert_eq!(response.status(), Status::Created);
        assert_eq!(body(response)["pitch"]["status"], "submitted");

        let response = submit_pitch(&client, &founder, team_id, "Second Try");
        assert_eq!(response.status(), Status::Conflict);

        let response = client.get("/teams").header(bearer(&founder)).dispatch();
        let teams = body(response);
        assert_eq!(teams.as_array().unwrap().len(), 1);
        assert_eq!(teams[0]["members"][0]["name"], "Ada");
    }

    #[test_log::test]
    fn test_repeat_vote_replaces_rating() {
        let client = client_with(test_config());
        let pitch_id = founder_with_pitch(&client, "founder@example.com", "Launch Pad");
        let reviewer = signup(&client, "reviewer@example.com", "reviewer");

        assert_eq!(cast_vote(&client, &reviewer, pitch_id, 5), Status::Ok);
        assert_eq!(cast_vote(&client, &reviewer, pitch_id, 3), Status::Ok);
        assert_eq!(cast_vote(&client, &reviewer, pitch_id, 6), Status::UnprocessableEntity);
        assert_eq!(cast_vote(&client, &reviewer, 9999, 4), Status::NotFound);

        let detail = body(client.get(format!("/pitches/{pitch_id}")).dispatch());
        assert_eq!(detail["totalVotes"], 1);
        assert_eq!(detail["averageRating"], 3.0);
        assert_eq!(detail["team"]["members"][0]["role"], "CTO");

        let listing = body(client.get("/pitches").dispatch());
        assert_eq!(listing["total"], 1);
        assert_eq!(listing["pitches"][0]["totalVotes"], 1);
    }

    #[test_log::test]
    fn test_feedback_shows_on_detail() {
        let client = client_with(test_config());
        let pitch_id = founder_with_pitch(&client, "founder@example.com", "Launch Pad");
        let reviewer = signup(&client, "reviewer@example.com", "reviewer");

        for content in ["Great demo", "Clear market", "Needs pricing"] {
            let response = client
                .post(format!("/pitches/{pitch_id}/feedback"))
                .header(bearer(&reviewer))
                .json(&json!({ "content": content }))
                .dispatch();
            assert_eq!(response.status(), Status::Created);
        }

        let detail = body(client.get(format!("/pitches/{pitch_id}")).dispatch());
        let feedback = detail["recentFeedback"].as_array().unwrap();
        assert_eq!(feedback.len(), 3);
        assert_eq!(feedback[0]["content"], "Needs pricing");
        assert_eq!(feedback[0]["reviewerName"], "reviewer");
    }

    #[test_log::test]
    fn test_vote_rate_limit() {
        let client = client_with(AppConfig {
            vote_rate_limit: 3,
            ..test_config()
        });
        let pitch_id = founder_with_pitch(&client, "founder@example.com", "Launch Pad");
        let reviewer = signup(&client, "reviewer@example.com", "reviewer");

        for rating in [1, 2, 3] {
            assert_eq!(cast_vote(&client, &reviewer, pitch_id, rating), Status::Ok);
        }
        let response = client
            .post(format!("/pitches/{pitch_id}/vote"))
            .header(bearer(&reviewer))
            .json(&json!({ "rating": 4 }))
            .dispatch();
        assert_eq!(response.status(), Status::TooManyRequests);
        assert_eq!(body(response)["error"], "too_many_requests");
    }

    #[test_log::test]
    fn test_leaderboard_ranking() {
        let client = client_with(test_config());
        let alpha = founder_with_pitch(&client, "alpha@example.com", "Alpha");
        let beta = founder_with_pitch(&client, "beta@example.com", "Beta");
        let gamma = founder_with_pitch(&client, "gamma@example.com", "Gamma");

        let reviewers: Vec<String> = (1..=3)
            .map(|i| signup(&client, &format!("reviewer{i}@example.com"), "reviewer"))
            .collect();
        for (reviewer, rating) in reviewers.iter().zip([5, 5, 4]) {
            assert_eq!(cast_vote(&client, reviewer, alpha, rating), Status::Ok);
        }
        assert_eq!(cast_vote(&client, &reviewers[0], beta, 5), Status::Ok);

        let response = client.get("/leaderboard").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let board = body(response);
        let entries = board["entries"].as_array().unwrap();
        let ids: Vec<u64> = entries
            .iter()
            .map(|e| e["pitch"]["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![alpha, beta, gamma]);
        assert_eq!(entries[0]["averageRating"], 4.7);
        assert_eq!(entries[0]["weightedScore"], 2.81);
        assert_eq!(entries[1]["weightedScore"], 1.51);
        assert_eq!(entries[2]["totalVotes"], 0);
        assert!(entries[2]["mostRecentVoteTimestamp"].is_null());
        assert_eq!(board["totalPages"], 1);
    }

    #[test_log::test]
    fn test_leaderboard_pagination_and_filters() {
        let client = client_with(test_config());
        for name in ["One", "Two", "Three"] {
            founder_with_pitch(&client, &format!("{}@example.com", name.to_lowercase()), name);
        }

        let board = body(client.get("/leaderboard?page=0&limit=0").dispatch());
        assert_eq!(board["currentPage"], 1);
        assert_eq!(board["totalPages"], 3);
        assert_eq!(board["entries"].as_array().unwrap().len(), 1);

        let board = body(client.get("/leaderboard?page=5&limit=500").dispatch());
        assert_eq!(board["totalPages"], 1);
        assert!(board["entries"].as_array().unwrap().is_empty());

        let board = body(client.get("/leaderboard?category=health").dispatch());
        assert_eq!(board["total"], 0);

        let response = client.get("/leaderboard?category=crypto").dispatch();
        assert_eq!(response.status(), Status::BadRequest);

        let listing = body(client.get("/pitches?search=tw").dispatch());
        assert_eq!(listing["total"], 1);
        assert_eq!(listing["pitches"][0]["title"], "Two");
    }

    #[test_log::test]
    fn test_unknown_route_is_json() {
        let client = client_with(test_config());
        let response = client.get("/nowhere").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        assert_eq!(body(response)["error"], "not_found");
    }
}
