use serde::{Deserialize, Serialize};

/// Body of the provider's token price endpoint. `price` stays `None` for
/// any response shape that does not carry a numeric price.
#[derive(Debug, Deserialize)]
pub struct PriceBody {
    #[serde(default)]
    pub price: Option<f64>,
}

/// Payload of a price-cache entry: `{timestamp, price}` on disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct PricePayload {
    pub price: f64,
}
