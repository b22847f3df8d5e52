//! Spot price lookup with a short-lived on-disk cache.
//!
//! A failed lookup always resolves to `None`; the affected token is simply
//! left unpriced and drops out of the USD total. No retry on misses.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{cache::FileCache, provider::BridgeApi, types::PricePayload};

/// Tokens without a plausible contract address (native placeholders,
/// empty strings) are never looked up.
const MIN_TOKEN_ADDRESS_LEN: usize = 10;

pub async fn fetch_token_price<A: BridgeApi>(
    api: &A,
    cache: &FileCache,
    ttl: Duration,
    token_address: &str,
    chain_id: i64,
) -> Option<f64> {
    if token_address.len() < MIN_TOKEN_ADDRESS_LEN {
        return None;
    }

    let key = format!("price_{}_{}", chain_id, token_address);

    if let Some(cached) = cache.read_fresh::<PricePayload>(&key, ttl) {
        debug!(
            "using cached price for {} on chain {}: {}",
            token_address, chain_id, cached.price
        );
        return Some(cached.price);
    }

    info!("fetching price for token {} on chain {}", token_address, chain_id);

    match api.token_price(token_address, chain_id).await {
        Ok(Some(price)) => {
            if let Err(err) = cache.write(&key, &PricePayload { price }) {
                warn!("failed to persist price cache for {}: {}", key, err);
            }
            Some(price)
        }
        Ok(None) => None,
        Err(err) => {
            warn!(
                "failed to fetch price for token {} on chain {}: {}",
                token_address, chain_id, err
            );
            None
        }
    }
}
