use actix_web::{get, web, Responder, Result};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::LeaderboardType,
    model::RankedUserStats,
};

#[get("/leaderboard")]
async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<impl Responder, Error> {
    let metric: LeaderboardType = data
        .board_type
        .as_deref()
        .unwrap_or("transactions")
        .parse()?;

    let mut limit = data.limit.unwrap_or(50);
    if limit > 100 {
        limit = 100;
    }
    let offset = data.offset.unwrap_or(0);
    let search = data.search.as_deref();

    let table = &state.database.user_stats;
    let (rows, total) = tokio::try_join!(
        table.leaderboard_page(metric, limit, offset, search),
        table.count_for_page(metric, search),
    )?;

    Ok(web::Json(Response { data: rows, total }))
}

#[derive(Debug, Deserialize)]
pub struct Query {
    #[serde(rename = "type")]
    board_type: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub data: Vec<RankedUserStats>,
    pub total: i64,
}
