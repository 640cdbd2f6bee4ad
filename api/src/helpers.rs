//! Some helper functions for the API.

use pitch_common::{Category, ShowcaseError};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let elapsed = started_at.elapsed();
        let status = response.status().code;

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request Completed"
        );
    }
}

#[derive(Clone, Copy)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type",
        ));
        response.set_header(Header::new("Access-Control-Max-Age", "86400"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    BadRequest,
    Unauthorized,
    Forbidden,
    Conflict,
    UnprocessableEntity,
    TooManyRequests,
    Internal,
}

impl ApiErrorKind {
    pub fn from_status(status: Status) -> Self {
        match status.code {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            422 => ApiErrorKind::UnprocessableEntity,
            429 => ApiErrorKind::TooManyRequests,
            _ => ApiErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    pub error: ApiErrorKind,
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(error: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

pub type ApiError = rocket_status::Custom<Json<ApiErrorBody>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;
pub type ApiCreatedResult<T> = Result<rocket_status::Custom<Json<T>>, ApiError>;

pub fn created<T>(body: T) -> rocket_status::Custom<Json<T>> {
    rocket_status::Custom(Status::Created, Json(body))
}

fn api_error(status: Status, kind: ApiErrorKind, message: impl Into<String>) -> ApiError {
    rocket_status::Custom(status, Json(ApiErrorBody::new(kind, message)))
}

pub fn internal_error(message: impl Into<String>) -> ApiError {
    api_error(Status::InternalServerError, ApiErrorKind::Internal, message)
}

/// The HTTP status a domain error is reported with.
pub fn status_for(err: &ShowcaseError) -> Status {
    match err {
        ShowcaseError::PitchNotFound(_) | ShowcaseError::TeamNotFound => Status::NotFound,
        ShowcaseError::DuplicateTeamPitch | ShowcaseError::DuplicateUser => Status::Conflict,
        ShowcaseError::InvalidRating(_) => Status::UnprocessableEntity,
        ShowcaseError::Validation(_) => Status::BadRequest,
        ShowcaseError::InvalidCredentials
        | ShowcaseError::Unauthenticated
        | ShowcaseError::InvalidToken => Status::Unauthorized,
        ShowcaseError::Forbidden => Status::Forbidden,
        ShowcaseError::Database(_) => Status::InternalServerError,
    }
}

/// Turn a domain error into a JSON error response. Database details are logged, not returned.
pub fn showcase_error(err: ShowcaseError) -> ApiError {
    let status = status_for(&err);
    if let ShowcaseError::Database(detail) = &err {
        tracing::error!(error = %detail, "Database operation failed");
        return internal_error("Internal server error");
    }
    api_error(status, ApiErrorKind::from_status(status), err.to_string())
}

/// Read an optional `category` query value. Empty and `all` mean no filter.
pub fn parse_category(category: Option<&str>) -> Result<Option<Category>, ApiError> {
    match category.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .to_lowercase()
            .parse::<Category>()
            .map(Some)
            .map_err(showcase_error),
    }
}

/// A guard failure remembered for the catcher that renders it.
pub struct GuardFailure(pub Option<ShowcaseError>);

impl GuardFailure {
    /// Record the first failure seen for this request.
    pub fn record(request: &Request<'_>, err: &ShowcaseError) {
        request.local_cache(|| GuardFailure(Some(err.clone())));
    }

    pub fn message(request: &Request<'_>) -> Option<String> {
        request
            .local_cache(|| GuardFailure(None))
            .0
            .as_ref()
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_database_errors_are_hidden() {
        let response = showcase_error(ShowcaseError::Database("relation missing".to_string()));
        assert_eq!(response.0, Status::InternalServerError);
        assert_eq!(response.1.message, "Internal server error");
        assert_eq!(response.1.error, ApiErrorKind::Internal);
    }

    #[test_log::test]
    fn test_parse_category() {
        assert_eq!(parse_category(None).unwrap(), None);
        assert_eq!(parse_category(Some("all")).unwrap(), None);
        assert_eq!(parse_category(Some("AI")).unwrap(), Some(Category::Ai));
        assert_eq!(parse_category(Some("crypto")).unwrap_err().0, Status::BadRequest);
    }

    #[test_log::test]
    fn test_error_statuses() {
        assert_eq!(status_for(&ShowcaseError::PitchNotFound(3)), Status::NotFound);
        assert_eq!(status_for(&ShowcaseError::DuplicateTeamPitch), Status::Conflict);
        assert_eq!(
            status_for(&ShowcaseError::InvalidRating(9)),
            Status::UnprocessableEntity
        );
        assert_eq!(status_for(&ShowcaseError::Forbidden), Status::Forbidden);
        assert_eq!(status_for(&ShowcaseError::InvalidToken), Status::Unauthorized);
    }
}
