use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    address::normalize_for_db,
    configuration::{AppState, State},
    error::Error,
    model::UserStats,
};

#[post("/leaderboard/opt-in")]
async fn index(
    state: web::Data<AppState<State>>,
    body: web::Json<Body>,
) -> Result<HttpResponse, Error> {
    let normalized = normalize_for_db(&body.address);
    let table = &state.database.user_stats;

    let updated = table
        .set_opt_in(normalized.clone(), body.opt_in, Utc::now())
        .await?;

    if updated == 0 {
        return Ok(HttpResponse::Ok().json(NotFound {
            success: false,
            error: "User not found. Please analyze the address first.",
        }));
    }

    let user_stats = table.get_one(normalized).await?;

    let message = if body.opt_in {
        "Successfully joined leaderboard"
    } else {
        "Successfully left leaderboard"
    };

    Ok(HttpResponse::Ok().json(Response {
        success: true,
        message,
        user_stats,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub address: String,
    pub opt_in: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    pub message: &'static str,
    pub user_stats: Option<UserStats>,
}

#[derive(Debug, Serialize)]
pub struct NotFound {
    pub success: bool,
    pub error: &'static str,
}
