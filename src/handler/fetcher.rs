//! Paginated transaction fetch with caching, dedup and retry.
//!
//! Provider failures never propagate: each page gets a bounded retry
//! budget, and an exhausted budget abandons the query with whatever was
//! accumulated. Partial results beat total failure here.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time;
use tracing::{error, info, warn};

use crate::{
    address::{canonical_cache_key, classify},
    cache::FileCache,
    configuration::{AppState, Config, State},
    helpers::retry_with_backoff,
    provider::BridgeApi,
    types::{BridgeRequest, TransactionsPayload},
};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub page_limit: u32,
    pub max_pages: u32,
    pub max_retries: u32,
    pub page_delay: Duration,
    pub backoff_base: Duration,
    pub cache_ttl: Duration,
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> FetchSettings {
        FetchSettings {
            page_limit: config.page_limit,
            max_pages: config.max_pages,
            max_retries: config.max_retries,
            page_delay: config.page_delay,
            backoff_base: Duration::from_secs(1),
            cache_ttl: config.cache_ttl,
        }
    }
}

pub async fn fetch_transactions(
    state: &AppState<State>,
    address: &str,
    force_refresh: bool,
) -> Vec<BridgeRequest> {
    fetch_with(
        &state.http,
        &state.cache,
        &FetchSettings::from(&state.config),
        address,
        force_refresh,
    )
    .await
}

pub async fn fetch_with<A: BridgeApi>(
    api: &A,
    cache: &FileCache,
    settings: &FetchSettings,
    address: &str,
    force_refresh: bool,
) -> Vec<BridgeRequest> {
    let family = classify(address);
    info!("address family detected: {}", family);

    let key = canonical_cache_key(address);

    if force_refresh {
        info!("force refresh requested, fetching fresh data");
    } else if let Some(payload) =
        cache.read_fresh::<TransactionsPayload>(&key, settings.cache_ttl)
    {
        info!(
            "using cached data with {} transactions",
            payload.transactions.len()
        );
        return payload.transactions;
    }

    let mut transactions: Vec<BridgeRequest> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut continuation: Option<String> = None;

    for page in 1..=settings.max_pages {
        info!("fetching page {}...", page);

        let cursor = continuation.as_deref();
        let result = retry_with_backoff(
            settings.max_retries,
            settings.backoff_base,
            move |_| api.requests_page(address, settings.page_limit, cursor),
        )
        .await;

        match result {
            Ok(body) => {
                let Some(requests) = body.requests else {
                    warn!("unexpected provider response shape, stopping");
                    break;
                };

                let mut new_count = 0;
                for tx in requests {
                    if seen.insert(tx.id.clone()) {
                        transactions.push(tx);
                        new_count += 1;
                    }
                }
                info!("found {} new transactions", new_count);

                continuation = body.continuation;
            }
            Err(err) => {
                error!("max retries reached for page {}: {}", page, err);
                break;
            }
        }

        // stay under the provider's implicit rate limit
        time::sleep(settings.page_delay).await;

        if continuation.is_none() {
            break;
        }
    }

    info!("total unique transactions found: {}", transactions.len());

    // a transient "no data" response must not poison the cache
    if transactions.is_empty() {
        return transactions;
    }

    let payload = TransactionsPayload { transactions };
    if let Err(err) = cache.write(&key, &payload) {
        warn!("failed to persist transaction cache for {}: {}", key, err);
    }

    payload.transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::RequestsPage;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct ScriptedApi {
        pages: Mutex<Vec<Result<RequestsPage, Error>>>,
        calls: AtomicU32,
    }

    impl ScriptedApi {
        fn new(pages: Vec<Result<RequestsPage, Error>>) -> ScriptedApi {
            ScriptedApi {
                pages: Mutex::new(pages),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BridgeApi for ScriptedApi {
        async fn requests_page(
            &self,
            _address: &str,
            _limit: u32,
            _continuation: Option<&str>,
        ) -> Result<RequestsPage, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                return Ok(RequestsPage {
                    requests: Some(vec![]),
                    continuation: None,
                });
            }
            pages.remove(0)
        }

        async fn token_price(
            &self,
            _token_address: &str,
            _chain_id: i64,
        ) -> Result<Option<f64>, Error> {
            Ok(None)
        }
    }

    fn tx(id: &str) -> BridgeRequest {
        BridgeRequest {
            id: id.to_owned(),
            status: Some(String::from("success")),
            created_at: Some(String::from("2024-03-01T10:00:00.000Z")),
            data: None,
        }
    }

    fn page(
        ids: &[&str],
        continuation: Option<&str>,
    ) -> Result<RequestsPage, Error> {
        Ok(RequestsPage {
            requests: Some(ids.iter().map(|id| tx(id)).collect()),
            continuation: continuation.map(str::to_owned),
        })
    }

    fn settings() -> FetchSettings {
        FetchSettings {
            page_limit: 20,
            max_pages: 10,
            max_retries: 3,
            page_delay: Duration::from_secs(1),
            backoff_base: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }

    const ADDR: &str = "0x768f8ece2601a05c5d2bea98013dfd91ea6740b9";

    #[tokio::test(start_paused = true)]
    async fn deduplicates_resent_transactions() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![
            page(&["a"], Some("cursor-1")),
            page(&["a", "b"], None),
        ]);

        let txs = fetch_with(&api, &cache, &settings(), ADDR, false).await;

        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_within_ttl_hits_cache() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![page(&["a", "b"], None)]);

        let first = fetch_with(&api, &cache, &settings(), ADDR, false).await;
        assert_eq!(api.calls(), 1);

        let second = fetch_with(&api, &cache, &settings(), ADDR, false).await;
        assert_eq!(api.calls(), 1, "cache hit must not touch the network");
        assert_eq!(first.len(), second.len());
    }

    #[tokio::test(start_paused = true)]
    async fn force_refresh_bypasses_cache() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![
            page(&["a"], None),
            page(&["a", "b"], None),
        ]);

        fetch_with(&api, &cache, &settings(), ADDR, false).await;
        let refreshed = fetch_with(&api, &cache, &settings(), ADDR, true).await;

        assert_eq!(api.calls(), 2);
        assert_eq!(refreshed.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_with_backoff() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![
            Err(Error::ServerError(String::from("503"))),
            Err(Error::ServerError(String::from("timeout"))),
            page(&["a"], None),
        ]);

        let started = time::Instant::now();
        let txs = fetch_with(&api, &cache, &settings(), ADDR, false).await;

        // 1s + 2s of backoff plus the fixed 1s inter-page delay
        assert_eq!(txs.len(), 1);
        assert_eq!(api.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_return_partial_results() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![
            page(&["a"], Some("cursor-1")),
            Err(Error::ServerError(String::from("down"))),
            Err(Error::ServerError(String::from("down"))),
            Err(Error::ServerError(String::from("down"))),
        ]);

        let txs = fetch_with(&api, &cache, &settings(), ADDR, false).await;

        assert_eq!(txs.len(), 1, "page one survives the abandoned page two");
        assert_eq!(api.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_is_not_cached() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![page(&[], None), page(&["a"], None)]);

        let first = fetch_with(&api, &cache, &settings(), ADDR, false).await;
        assert!(first.is_empty());

        let second = fetch_with(&api, &cache, &settings(), ADDR, false).await;
        assert_eq!(second.len(), 1, "empty response must not poison the cache");
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pagination_is_bounded() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        // every page promises more data
        let api = ScriptedApi::new(
            (0..20)
                .map(|n| {
                    let id = format!("tx-{}", n);
                    page(&[id.as_str()], Some("more"))
                })
                .collect(),
        );

        let mut bounded = settings();
        bounded.max_pages = 3;

        let txs = fetch_with(&api, &cache, &bounded, ADDR, false).await;

        assert_eq!(api.calls(), 3);
        assert_eq!(txs.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_requests_array_ends_pagination() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let api = ScriptedApi::new(vec![
            page(&["a"], Some("cursor-1")),
            Ok(RequestsPage {
                requests: None,
                continuation: Some(String::from("bogus")),
            }),
        ]);

        let txs = fetch_with(&api, &cache, &settings(), ADDR, false).await;

        assert_eq!(txs.len(), 1);
        assert_eq!(api.calls(), 2);
    }
}
