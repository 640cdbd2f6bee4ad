//! Teams, owned by founders.

use crate::accounts::UserView;
use crate::auth::Founder;
use crate::helpers::{ApiCreatedResult, ApiResult, created, showcase_error};
use chrono::{DateTime, Utc};
use pitch_common::store::{SharedStore, TeamStore};
use pitch_common::validation::{clean_members, require_non_empty};
use pitch_common::{TeamMember, TeamRecord};
use rocket::State;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct NewTeamRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: u32,
    pub name: String,
    pub members: Vec<TeamMember>,
    pub founder: UserView,
    pub created_at: DateTime<Utc>,
}

impl TeamView {
    fn new(team: TeamRecord, founder: UserView) -> Self {
        Self {
            id: team.team_id,
            name: team.name,
            members: team.members,
            founder,
            created_at: team.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TeamResponse {
    pub message: String,
    pub team: TeamView,
}

#[post("/teams", data = "<request>")]
pub fn create_team(
    founder: Founder,
    request: Json<NewTeamRequest>,
    store: &State<SharedStore>,
) -> ApiCreatedResult<TeamResponse> {
    let Founder(user) = founder;
    let request = request.into_inner();
    let name = require_non_empty("name", &request.name).map_err(showcase_error)?;
    let members = clean_members(request.members);

    let team = store
        .insert_team(user.user_id, name, members)
        .map_err(showcase_error)?;
    tracing::info!(team_id = team.team_id, founder_id = user.user_id, "Team created");

    Ok(created(TeamResponse {
        message: "Team created successfully".to_string(),
        team: TeamView::new(team, UserView::from(&user)),
    }))
}

#[get("/teams")]
pub fn list_teams(founder: Founder, store: &State<SharedStore>) -> ApiResult<Vec<TeamView>> {
    let Founder(user) = founder;
    let founder_view = UserView::from(&user);
    let teams = store
        .get_teams_by_founder(user.user_id)
        .map_err(showcase_error)?;
    Ok(Json(
        teams
            .into_iter()
            .map(|team| TeamView::new(team, founder_view.clone()))
            .collect(),
    ))
}
