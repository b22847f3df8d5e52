use serde::{Deserialize, Serialize};

/// Outcome of one analysis run. An empty wallet is a defined, user-facing
/// failure shape with troubleshooting copy, not an error path.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(AnalysisSuccess),
    Failure(AnalysisFailure),
}

impl AnalysisResult {
    pub fn no_transactions() -> AnalysisResult {
        AnalysisResult::Failure(AnalysisFailure {
            success: false,
            error: String::from("No transactions found"),
            troubleshooting: vec![
                String::from("Verify the address is correct"),
                String::from("Check if this address has used the bridge"),
                String::from("Try again later"),
            ],
        })
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            AnalysisResult::Success(s) => Some(&s.summary),
            AnalysisResult::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisSuccess {
    pub success: bool,
    pub summary: Summary,
    pub tokens: Vec<TokenTotal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub success: bool,
    pub error: String,
    pub troubleshooting: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub first_date: String,
    pub transaction_count: i64,
    pub unique_chains: i64,
    pub unique_tokens: i64,
    #[serde(rename = "totalUSDValue")]
    pub total_usd_value: f64,
}

/// Aggregate flows for one token symbol. One entry per distinct symbol;
/// `address` and `chain_id` come from the first occurrence, so the same
/// symbol on two chains collapses into a single entry (observed provider
/// behavior, kept as-is).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTotal {
    pub symbol: String,
    pub address: String,
    pub chain_id: Option<i64>,
    pub inflow: f64,
    pub outflow: f64,
    pub price: Option<f64>,
    pub usd_value: Option<f64>,
}

impl TokenTotal {
    pub fn new(symbol: &str, address: String, chain_id: Option<i64>) -> TokenTotal {
        TokenTotal {
            symbol: symbol.to_owned(),
            address,
            chain_id,
            inflow: 0.0,
            outflow: 0.0,
            price: None,
            usd_value: None,
        }
    }
}
