use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    address::normalize_for_db,
    configuration::{AppState, State},
    error::Error,
    handler::analysis,
    model::UserStats,
};

#[post("/analyze")]
async fn index(
    state: web::Data<AppState<State>>,
    body: web::Json<Body>,
) -> Result<HttpResponse, Error> {
    let Some(address) = body.address.as_deref().map(str::trim) else {
        return Ok(bad_request());
    };
    if address.is_empty() {
        return Ok(bad_request());
    }

    let force_refresh = body.force_refresh.unwrap_or(false);
    let result = analysis::analyze_address(&state, address, force_refresh).await;

    // Best-effort leaderboard refresh; the analysis response stands on its
    // own even when the store write fails.
    if let Some(summary) = result.summary() {
        let stats = UserStats {
            address: normalize_for_db(address),
            transaction_count: summary.transaction_count,
            total_usd_value: summary.total_usd_value,
            unique_chains: summary.unique_chains,
            unique_tokens: summary.unique_tokens,
            first_transaction_date: Some(summary.first_date.clone()),
            last_updated: Utc::now(),
            opt_in_leaderboard: false,
        };

        if let Err(err) = state.database.user_stats.upsert(&stats).await {
            warn!("stats update failed for {}: {}", stats.address, err);
        }
    }

    Ok(HttpResponse::Ok().json(result))
}

fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Address is required",
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub address: Option<String>,
    pub force_refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}
