use crate::helpers::{ApiResult, parse_category, showcase_error};
use pitch_common::leaderboard::LeaderboardPage;
use pitch_common::pagination::Pagination;
use pitch_common::store::{SharedStore, ShowcaseStore, build_leaderboard};
use pitch_common::{DEFAULT_LEADERBOARD_PAGE_LIMIT, PitchFilter};
use rocket::State;
use rocket::serde::json::Json;

#[get("/leaderboard?<category>&<page>&<limit>")]
pub fn leaderboard(
    category: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
    store: &State<SharedStore>,
) -> ApiResult<LeaderboardPage> {
    let filter = PitchFilter {
        category: parse_category(category)?,
        title_search: None,
    };
    let pagination = Pagination::from_query(page, limit, DEFAULT_LEADERBOARD_PAGE_LIMIT);

    let store: &dyn ShowcaseStore = store.inner().as_ref();
    let board = build_leaderboard(store, &filter, pagination).map_err(showcase_error)?;
    tracing::debug!(
        total = board.total,
        page = board.current_page,
        "Leaderboard computed"
    );
    Ok(Json(board))
}
