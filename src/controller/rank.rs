use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    address::normalize_for_db,
    configuration::{AppState, State},
    error::Error,
    model::UserStats,
};

#[get("/rank")]
async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<HttpResponse, Error> {
    let normalized = normalize_for_db(&data.address);

    let Some(stats) =
        state.database.user_stats.get_one(normalized).await?
    else {
        return Ok(HttpResponse::Ok().json(NotFound {
            success: false,
            error: "User not found in database",
        }));
    };

    // ranks are computed regardless of the user's own opt-in status
    let ranks = state.database.user_stats.ranks(&stats).await?;

    Ok(HttpResponse::Ok().json(Response {
        success: true,
        user_stats: stats,
        ranks: Ranks {
            transactions: ranks[0],
            volume: ranks[1],
            chains: ranks[2],
            tokens: ranks[3],
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct Query {
    address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    pub user_stats: UserStats,
    pub ranks: Ranks,
}

#[derive(Debug, Serialize)]
pub struct Ranks {
    pub transactions: i64,
    pub volume: i64,
    pub chains: i64,
    pub tokens: i64,
}

#[derive(Debug, Serialize)]
pub struct NotFound {
    pub success: bool,
    pub error: &'static str,
}
