//! Runtime settings, read from the same figment as Rocket's own config (`Rocket.toml`, `ROCKET_*`).

use rocket::figment::Figment;
use rocket::serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(default)]
pub struct AppConfig {
    /// How long a login token stays valid.
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    /// Votes allowed per client IP in each window.
    pub vote_rate_limit: u32,
    pub vote_rate_window_secs: u64,
    pub database_pool_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24,
            bcrypt_cost: 10,
            vote_rate_limit: 10,
            vote_rate_window_secs: 60,
            database_pool_size: 8,
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        figment.extract()
    }
}
