//! Wallet address classification and canonicalization.
//!
//! Bridge users arrive with EVM, Solana or Cosmos addresses. Only EVM
//! addresses are case-insensitive; folding the case of a base58 Solana
//! address destroys its identity, so every cache and database key derived
//! from an address must go through the family-aware rules below.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SOLANA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap());

static COSMOS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(cosmos|osmo|juno|stars)[a-zA-Z0-9]{39,59}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Evm,
    Solana,
    Cosmos,
    Unknown,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::Evm => write!(f, "evm"),
            Family::Solana => write!(f, "solana"),
            Family::Cosmos => write!(f, "cosmos"),
            Family::Unknown => write!(f, "unknown"),
        }
    }
}

pub fn classify(address: &str) -> Family {
    let address = address.trim();

    if let Some(hex) = address.strip_prefix("0x") {
        if hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Family::Evm;
        }
    }

    if SOLANA_RE.is_match(address) {
        return Family::Solana;
    }

    if COSMOS_RE.is_match(address) {
        return Family::Cosmos;
    }

    Family::Unknown
}

/// Cache key for an address. EVM addresses are lowercased; everything else
/// keeps its exact case and is percent-encoded so it is safe as a filename.
pub fn canonical_cache_key(address: &str) -> String {
    let address = address.trim();

    if classify(address) == Family::Evm {
        return address.to_lowercase();
    }

    utf8_percent_encode(address, NON_ALPHANUMERIC).to_string()
}

/// Leaderboard key for an address. Lowercases only `0x`-prefixed addresses,
/// Solana and Cosmos addresses are stored verbatim.
pub fn normalize_for_db(address: &str) -> String {
    let address = address.trim();

    if address.starts_with("0x") {
        return address.to_lowercase();
    }

    address.to_owned()
}
