use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One leaderboard row, keyed by the normalized address. Stats are a
/// snapshot of the last analysis run; `opt_in_leaderboard` survives
/// stat refreshes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserStats {
    pub address: String,
    pub transaction_count: i64,
    pub total_usd_value: f64,
    pub unique_chains: i64,
    pub unique_tokens: i64,
    pub first_transaction_date: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub opt_in_leaderboard: bool,
}

#[derive(Debug, FromRow, Serialize)]
pub struct RankedUserStats {
    pub rank: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stats: UserStats,
}
