use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    types::{PriceBody, RequestsPage},
};

/// Timeout for the price endpoint. Shorter than the transactions timeout;
/// a slow price lookup degrades one token's valuation, nothing else.
const PRICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read access to the bridge provider's HTTP API.
pub trait BridgeApi {
    async fn requests_page(
        &self,
        address: &str,
        limit: u32,
        continuation: Option<&str>,
    ) -> Result<RequestsPage, Error>;

    async fn token_price(
        &self,
        token_address: &str,
        chain_id: i64,
    ) -> Result<Option<f64>, Error>;
}

#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    client: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let client = Client::builder().build()?;
        Ok(HTTP { config, client })
    }
}

impl BridgeApi for HTTP {
    async fn requests_page(
        &self,
        address: &str,
        limit: u32,
        continuation: Option<&str>,
    ) -> Result<RequestsPage, Error> {
        let url = self.config.bridge_api_host.join("requests/v2")?;
        debug!("{} user={}", url, address);

        let mut query: Vec<(&str, String)> = vec![
            ("user", address.to_owned()),
            ("limit", limit.to_string()),
        ];
        if let Some(token) = continuation {
            query.push(("continuation", token.to_owned()));
        }

        let page = self
            .client
            .get(url)
            .query(&query)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<RequestsPage>()
            .await?;

        Ok(page)
    }

    async fn token_price(
        &self,
        token_address: &str,
        chain_id: i64,
    ) -> Result<Option<f64>, Error> {
        let url = self.config.bridge_api_host.join("currencies/token/price")?;

        let body = self
            .client
            .get(url)
            .query(&[
                ("address", token_address),
                ("chainId", &chain_id.to_string()),
            ])
            .timeout(PRICE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<PriceBody>()
            .await?;

        Ok(body.price)
    }
}
