use serde::{Deserialize, Serialize};

/// One page of the provider's `requests/v2` listing. A body without a
/// `requests` array deserializes with `requests: None`, which the fetcher
/// treats as end-of-data.
#[derive(Debug, Deserialize)]
pub struct RequestsPage {
    #[serde(default)]
    pub requests: Option<Vec<BridgeRequest>>,
    #[serde(default)]
    pub continuation: Option<String>,
}

/// A single bridge request as returned by the provider. Fetched read-only,
/// never mutated; `id` is the identity used for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RequestData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_txs: Option<Vec<ChainTx>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_txs: Option<Vec<ChainTx>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_in: Option<CurrencyAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_out: Option<CurrencyAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyAmount {
    pub currency: CurrencyInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_formatted: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<i64>,
}

/// Settlement leg of a request; only the chain id matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTx {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<i64>,
}

/// Payload of a transaction-cache entry: `{timestamp, transactions}` on disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsPayload {
    pub transactions: Vec<BridgeRequest>,
}
