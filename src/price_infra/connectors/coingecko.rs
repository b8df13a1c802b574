use std::collections::HashMap;
use async_trait::async_trait;
use reqwest::Client;
use crate::config::CoingeckoConfig;
use crate::error::{Error, Result};
use crate::interfaces::PriceSource;
use crate::price_infra::symbols::to_coingecko_id;
use crate::types::Price;

/// Spot USD prices from CoinGecko's `/simple/price` endpoint.
pub struct CoingeckoConnector {
    client: Client,
    base_url: String,
}

impl CoingeckoConnector {
    pub fn new(config: &CoingeckoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(CoingeckoConnector {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for CoingeckoConnector {
    fn resolve_id(&self, symbol: &str) -> String {
        to_coingecko_id(symbol)
    }

    async fn fetch(&self, id: &str) -> Result<Price> {
        let url = format!("{}/simple/price", self.base_url);
        let body = self.client
            .get(&url)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        // Shape: { "bitcoin": { "usd": 12345.6 } }
        let quotes: HashMap<String, HashMap<String, f64>> = serde_json::from_slice(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        let usd = quotes.get(id)
            .and_then(|quote| quote.get("usd"))
            .copied()
            .ok_or_else(|| Error::MalformedResponse(format!("usd price missing for {}", id)))?;

        Price::from_usd(usd)
            .ok_or_else(|| Error::MalformedResponse(format!("invalid usd price {} for {}", usd, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connector_for(server: &MockServer) -> CoingeckoConnector {
        let config = CoingeckoConfig {
            base_url: format!("{}/", server.uri()),
            timeout_secs: 1,
        };
        CoingeckoConnector::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_price_in_cents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bitcoin": {"usd": 123.45}})))
            .expect(1)
            .mount(&server)
            .await;

        let connector = connector_for(&server).await;
        let id = connector.resolve_id("BTC");
        assert_eq!(id, "bitcoin");
        assert_eq!(connector.fetch(&id).await.unwrap(), Price::from_cents(12345));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let connector = connector_for(&server).await;
        assert!(matches!(connector.fetch("bitcoin").await, Err(Error::HttpError(_))));
    }

    #[tokio::test]
    async fn missing_id_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let connector = connector_for(&server).await;
        assert!(matches!(connector.fetch("bitcoin").await, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let connector = connector_for(&server).await;
        assert!(matches!(connector.fetch("bitcoin").await, Err(Error::MalformedResponse(_))));
    }
}
