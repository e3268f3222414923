use axum::{extract::State, http::HeaderMap, routing::get, Router};

use crate::cache::Cached;
use crate::controllers::StatsController;
use crate::models::SiteStats;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_stats_router() -> Router<AppState> {
    Router::new().route("/site", get(get_site_stats))
}

async fn get_site_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Cached<SiteStats>, AppError> {
    StatsController::new(&state).site(&headers).await
}
