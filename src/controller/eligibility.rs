use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::analysis,
};

#[post("/verify-eligibility")]
async fn index(
    state: web::Data<AppState<State>>,
    body: web::Json<Body>,
) -> Result<HttpResponse, Error> {
    let Some(address) = body.address.as_deref().map(str::trim) else {
        return Ok(missing_address());
    };
    if address.is_empty() {
        return Ok(missing_address());
    }

    let result = analysis::analyze_address(&state, address, false).await;

    let Some(summary) = result.summary() else {
        return Ok(HttpResponse::Ok().json(Failure {
            eligible: false,
            error: "Failed to analyze transactions",
            transaction_count: 0,
        }));
    };

    let required_count = state.config.nft_eligibility_threshold;

    Ok(HttpResponse::Ok().json(Response {
        eligible: eligible(summary.transaction_count, required_count),
        transaction_count: summary.transaction_count,
        required_count,
    }))
}

fn eligible(transaction_count: i64, required_count: i64) -> bool {
    transaction_count >= required_count
}

fn missing_address() -> HttpResponse {
    HttpResponse::BadRequest().json(Failure {
        eligible: false,
        error: "Address is required",
        transaction_count: 0,
    })
}

#[derive(Debug, Deserialize)]
pub struct Body {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub eligible: bool,
    pub transaction_count: i64,
    pub required_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub eligible: bool,
    pub error: &'static str,
    pub transaction_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(!eligible(3, 4));
        assert!(eligible(4, 4));
        assert!(eligible(5, 4));
    }
}
