//! Token flow aggregation over the raw transaction list.
//!
//! Totals are rebuilt from scratch on every pass, never maintained
//! incrementally. Aggregation keys on the token symbol alone: the same
//! symbol on two chains collapses into one entry whose address and chain
//! id come from the first occurrence. That ambiguity is observed provider
//! behavior and is kept, not corrected.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tokio::time;

use crate::{
    cache::FileCache,
    handler::price,
    provider::BridgeApi,
    types::{BridgeRequest, CurrencyAmount, TokenTotal},
};

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

enum Flow {
    In,
    Out,
}

pub fn extract_raw_totals(
    transactions: &[BridgeRequest],
) -> BTreeMap<String, TokenTotal> {
    let mut totals = BTreeMap::new();

    for tx in transactions {
        let Some(md) = tx.data.as_ref().and_then(|d| d.metadata.as_ref())
        else {
            continue;
        };

        if let Some(side) = &md.currency_in {
            accumulate(&mut totals, side, Flow::In);
        }
        if let Some(side) = &md.currency_out {
            accumulate(&mut totals, side, Flow::Out);
        }
    }

    totals
}

fn accumulate(
    totals: &mut BTreeMap<String, TokenTotal>,
    side: &CurrencyAmount,
    flow: Flow,
) {
    let symbol = &side.currency.symbol;
    let entry = totals.entry(symbol.clone()).or_insert_with(|| {
        TokenTotal::new(
            symbol,
            side.currency
                .address
                .clone()
                .unwrap_or_else(|| String::from(ZERO_ADDRESS)),
            side.currency.chain_id,
        )
    });

    let amount = side
        .amount_formatted
        .as_deref()
        .and_then(|a| a.parse::<f64>().ok())
        .unwrap_or(0.0);

    match flow {
        Flow::In => entry.inflow += amount,
        Flow::Out => entry.outflow += amount,
    }
}

#[derive(Debug, Default)]
pub struct ActivityScan {
    pub unique_dates: BTreeSet<String>,
    pub chains: BTreeSet<i64>,
    pub tokens: BTreeSet<String>,
}

impl ActivityScan {
    pub fn first_date(&self) -> String {
        self.unique_dates
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(|| String::from("N/A"))
    }
}

pub fn scan_activity(transactions: &[BridgeRequest]) -> ActivityScan {
    let mut scan = ActivityScan::default();

    for tx in transactions {
        if let Some(created_at) = &tx.created_at {
            if let Some(date) = created_at.split('T').next() {
                if !date.is_empty() {
                    scan.unique_dates.insert(date.to_owned());
                }
            }
        }

        let Some(data) = &tx.data else { continue };

        if let Some(md) = &data.metadata {
            for side in [&md.currency_in, &md.currency_out].into_iter().flatten() {
                if let Some(chain_id) = side.currency.chain_id {
                    scan.chains.insert(chain_id);
                }
                scan.tokens.insert(side.currency.symbol.clone());
            }
        }

        for legs in [&data.in_txs, &data.out_txs].into_iter().flatten() {
            for leg in legs {
                if let Some(chain_id) = leg.chain_id {
                    scan.chains.insert(chain_id);
                }
            }
        }
    }

    scan
}

/// Prices every token with a nonzero inflow and a known address and chain
/// id, one lookup at a time with a fixed delay in between. Unpriced tokens
/// keep `usd_value: None` and are excluded from (not zeroed into) totals.
pub async fn attach_prices<A: BridgeApi>(
    api: &A,
    cache: &FileCache,
    ttl: Duration,
    delay: Duration,
    totals: &mut BTreeMap<String, TokenTotal>,
) {
    for total in totals.values_mut() {
        let Some(chain_id) = total.chain_id else { continue };
        if total.address.is_empty() || total.inflow == 0.0 {
            continue;
        }

        total.price =
            price::fetch_token_price(api, cache, ttl, &total.address, chain_id)
                .await;
        total.usd_value = total.price.map(|p| total.inflow * p);

        time::sleep(delay).await;
    }
}

pub fn total_usd_value(totals: &BTreeMap<String, TokenTotal>) -> f64 {
    totals.values().filter_map(|t| t.usd_value).sum()
}
