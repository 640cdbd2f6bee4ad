//! Signup and login.

use crate::auth;
use crate::config::AppConfig;
use crate::helpers::{ApiCreatedResult, ApiResult, created, showcase_error};
use chrono::Utc;
use pitch_common::store::{SharedStore, UserStore};
use pitch_common::validation::{normalize_email, require_non_empty, validate_password};
use pitch_common::{NewUser, ShowcaseError, UserRecord, UserRole};
use rocket::State;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The public face of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct UserView {
    pub id: u32,
    pub email: String,
    pub role: UserRole,
    pub name: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.user_id,
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[post("/auth/signup", data = "<request>")]
pub fn signup(
    request: Json<SignupRequest>,
    store: &State<SharedStore>,
    config: &State<AppConfig>,
) -> ApiCreatedResult<AuthResponse> {
    let request = request.into_inner();
    let email = normalize_email(&request.email).map_err(showcase_error)?;
    validate_password(&request.password).map_err(showcase_error)?;
    let role: UserRole = request.role.trim().parse().map_err(showcase_error)?;
    let name = require_non_empty("name", &request.name).map_err(showcase_error)?;

    let password_hash =
        auth::hash_password(&request.password, config.bcrypt_cost).map_err(showcase_error)?;
    let user = store
        .insert_user(NewUser {
            email,
            password_hash,
            role,
            name,
        })
        .map_err(showcase_error)?;
    let session = auth::issue_session(
        store.inner().as_ref(),
        user.user_id,
        config.session_ttl_hours,
        Utc::now(),
    )
    .map_err(showcase_error)?;

    tracing::info!(user_id = user.user_id, role = role.as_str(), "User signed up");
    Ok(created(AuthResponse {
        message: "User created successfully".to_string(),
        token: session.token,
        user: UserView::from(&user),
    }))
}

#[post("/auth/login", data = "<request>")]
pub fn login(
    request: Json<LoginRequest>,
    store: &State<SharedStore>,
    config: &State<AppConfig>,
) -> ApiResult<AuthResponse> {
    let now = Utc::now();
    let email = normalize_email(&request.email)
        .map_err(|_| showcase_error(ShowcaseError::InvalidCredentials))?;

    let purged = store.delete_expired_sessions(now).map_err(showcase_error)?;
    if purged > 0 {
        tracing::debug!(purged, "Purged expired sessions");
    }

    let (user, password_hash) = store
        .get_credentials_by_email(&email)
        .map_err(showcase_error)?
        .ok_or_else(|| showcase_error(ShowcaseError::InvalidCredentials))?;
    if !auth::verify_password(&request.password, &password_hash) {
        tracing::debug!(user_id = user.user_id, "Rejected login with wrong password");
        return Err(showcase_error(ShowcaseError::InvalidCredentials));
    }

    let session = auth::issue_session(
        store.inner().as_ref(),
        user.user_id,
        config.session_ttl_hours,
        now,
    )
    .map_err(showcase_error)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token: session.token,
        user: UserView::from(&user),
    }))
}
