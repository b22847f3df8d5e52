//! Analysis orchestration: classify, fetch, aggregate, price, summarize.
//!
//! This is the single entry point the web layer calls. It owns no state of
//! its own beyond threading the force-refresh flag through.

use std::time::Duration;

use tracing::info;

use crate::{
    cache::FileCache,
    configuration::{AppState, Config, State},
    handler::{aggregation, fetcher, fetcher::FetchSettings},
    provider::BridgeApi,
    types::{AnalysisResult, AnalysisSuccess, Summary},
};

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub fetch: FetchSettings,
    pub price_ttl: Duration,
    pub price_delay: Duration,
}

impl From<&Config> for AnalysisSettings {
    fn from(config: &Config) -> AnalysisSettings {
        AnalysisSettings {
            fetch: FetchSettings::from(config),
            price_ttl: config.price_cache_ttl,
            price_delay: config.price_delay,
        }
    }
}

pub async fn analyze_address(
    state: &AppState<State>,
    address: &str,
    force_refresh: bool,
) -> AnalysisResult {
    run_analysis(
        &state.http,
        &state.cache,
        &AnalysisSettings::from(&state.config),
        address,
        force_refresh,
    )
    .await
}

pub async fn run_analysis<A: BridgeApi>(
    api: &A,
    cache: &FileCache,
    settings: &AnalysisSettings,
    address: &str,
    force_refresh: bool,
) -> AnalysisResult {
    let transactions =
        fetcher::fetch_with(api, cache, &settings.fetch, address, force_refresh)
            .await;

    if transactions.is_empty() {
        return AnalysisResult::no_transactions();
    }

    let mut totals = aggregation::extract_raw_totals(&transactions);
    let scan = aggregation::scan_activity(&transactions);

    info!("fetching token prices...");
    aggregation::attach_prices(
        api,
        cache,
        settings.price_ttl,
        settings.price_delay,
        &mut totals,
    )
    .await;

    AnalysisResult::Success(AnalysisSuccess {
        success: true,
        summary: Summary {
            first_date: scan.first_date(),
            transaction_count: transactions.len() as i64,
            unique_chains: scan.chains.len() as i64,
            unique_tokens: scan.tokens.len() as i64,
            total_usd_value: aggregation::total_usd_value(&totals),
        },
        tokens: totals.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{
        AnalysisResult, BridgeRequest, CurrencyAmount, CurrencyInfo,
        RequestData, RequestMetadata, RequestsPage,
    };
    use tempfile::tempdir;

    struct OnePageApi {
        requests: Vec<BridgeRequest>,
        price: Option<f64>,
    }

    impl BridgeApi for OnePageApi {
        async fn requests_page(
            &self,
            _address: &str,
            _limit: u32,
            _continuation: Option<&str>,
        ) -> Result<RequestsPage, Error> {
            Ok(RequestsPage {
                requests: Some(self.requests.clone()),
                continuation: None,
            })
        }

        async fn token_price(
            &self,
            _token_address: &str,
            _chain_id: i64,
        ) -> Result<Option<f64>, Error> {
            Ok(self.price)
        }
    }

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            fetch: FetchSettings {
                page_limit: 20,
                max_pages: 10,
                max_retries: 3,
                page_delay: Duration::from_secs(1),
                backoff_base: Duration::from_secs(1),
                cache_ttl: Duration::from_secs(24 * 60 * 60),
            },
            price_ttl: Duration::from_secs(3600),
            price_delay: Duration::from_millis(300),
        }
    }

    fn bridge_tx(id: &str, amount: &str) -> BridgeRequest {
        BridgeRequest {
            id: id.to_owned(),
            status: Some(String::from("success")),
            created_at: Some(String::from("2024-03-01T10:00:00.000Z")),
            data: Some(RequestData {
                metadata: Some(RequestMetadata {
                    currency_in: Some(CurrencyAmount {
                        currency: CurrencyInfo {
                            symbol: String::from("USDC"),
                            address: Some(String::from(
                                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                            )),
                            chain_id: Some(1),
                        },
                        amount_formatted: Some(amount.to_owned()),
                    }),
                    currency_out: None,
                }),
                in_txs: None,
                out_txs: None,
            }),
        }
    }

    const ADDR: &str = "0x768f8ece2601a05c5d2bea98013dfd91ea6740b9";

    #[tokio::test(start_paused = true)]
    async fn empty_wallet_yields_the_failure_shape() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = OnePageApi {
            requests: vec![],
            price: None,
        };

        let result = run_analysis(&api, &cache, &settings(), ADDR, false).await;

        let AnalysisResult::Failure(failure) = result else {
            panic!("expected failure shape");
        };
        assert!(!failure.success);
        assert_eq!(failure.error, "No transactions found");
        assert_eq!(failure.troubleshooting.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn summarizes_a_priced_wallet() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = OnePageApi {
            requests: vec![bridge_tx("a", "2"), bridge_tx("b", "4")],
            price: Some(3.0),
        };

        let result = run_analysis(&api, &cache, &settings(), ADDR, false).await;

        let AnalysisResult::Success(success) = result else {
            panic!("expected success shape");
        };
        assert!(success.success);
        assert_eq!(success.summary.transaction_count, 2);
        assert_eq!(success.summary.first_date, "2024-03-01");
        assert_eq!(success.summary.unique_chains, 1);
        assert_eq!(success.summary.unique_tokens, 1);
        assert_eq!(success.summary.total_usd_value, 18.0);
        assert_eq!(success.tokens.len(), 1);
        assert_eq!(success.tokens[0].inflow, 6.0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_shape_serializes_like_the_contract() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = OnePageApi {
            requests: vec![],
            price: None,
        };

        let result = run_analysis(&api, &cache, &settings(), ADDR, false).await;
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("No transactions found"));
        assert!(value["troubleshooting"].is_array());
    }
}
