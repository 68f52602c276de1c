//! HTTP client for a single standard relayer API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{
    AssetPair, AssetPairsResponse, FeeRecipientsResponse, OrderBook, OrderBookResponse,
    RelayerConfig,
};
use crate::signing::SignedOrder;
use crate::{Error, Result};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Requests a relayer understands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelayerBackend: Send + Sync {
    async fn get_asset_pairs(&self, per_page: u32, network_id: u64) -> Result<Vec<AssetPair>>;

    async fn get_orderbook(
        &self,
        base_asset_data: String,
        quote_asset_data: String,
        per_page: u32,
        network_id: u64,
    ) -> Result<OrderBookResponse>;

    async fn post_order(&self, order: SignedOrder, network_id: u64) -> Result<()>;

    async fn get_orders(
        &self,
        maker_address: Option<String>,
        per_page: u32,
        network_id: u64,
    ) -> Result<OrderBook>;

    async fn get_fee_recipients(&self, network_id: u64) -> Result<Vec<String>>;
}

pub struct RelayerApiClient {
    http_client: Client,
    base_url: Url,
    path_prefix: Vec<String>,
}

impl RelayerApiClient {
    pub fn new(config: &RelayerConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &RelayerConfig, http_client: Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("Invalid relayer url {}: {}", config.base_url, e),
        })?;
        let path_prefix = [&config.suffix, &config.version]
            .into_iter()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            http_client,
            base_url,
            path_prefix,
        })
    }

    /// `{base_url}/{suffix}/{version}/{endpoint}`, skipping empty parts.
    pub fn endpoint_url(&self, endpoint: &str, network_id: u64) -> Url {
        let mut url = self.base_url.clone();
        {
            let base_path = url.path().trim_matches('/').to_string();
            let path = std::iter::once(base_path.as_str())
                .chain(self.path_prefix.iter().map(String::as_str))
                .chain(std::iter::once(endpoint))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("/");
            url.set_path(&path);
        }
        url.query_pairs_mut()
            .append_pair("networkId", &network_id.to_string());
        url
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            message: format!("Relayer returned {}: {}", status, body),
            status: Some(status.as_u16()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "Querying relayer");
        let response = Self::check(self.http_client.get(url).send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RelayerBackend for RelayerApiClient {
    async fn get_asset_pairs(&self, per_page: u32, network_id: u64) -> Result<Vec<AssetPair>> {
        let mut url = self.endpoint_url("asset_pairs", network_id);
        url.query_pairs_mut()
            .append_pair("perPage", &per_page.to_string());
        let response: AssetPairsResponse = self.get(url).await?;
        Ok(response.records)
    }

    async fn get_orderbook(
        &self,
        base_asset_data: String,
        quote_asset_data: String,
        per_page: u32,
        network_id: u64,
    ) -> Result<OrderBookResponse> {
        let mut url = self.endpoint_url("orderbook", network_id);
        url.query_pairs_mut()
            .append_pair("baseAssetData", &base_asset_data)
            .append_pair("quoteAssetData", &quote_asset_data)
            .append_pair("perPage", &per_page.to_string());
        self.get(url).await
    }

    async fn post_order(&self, order: SignedOrder, network_id: u64) -> Result<()> {
        let url = self.endpoint_url("order", network_id);
        debug!(%url, maker = %order.maker_address, "Posting order");
        Self::check(self.http_client.post(url).json(&order).send().await?).await?;
        Ok(())
    }

    async fn get_orders(
        &self,
        maker_address: Option<String>,
        per_page: u32,
        network_id: u64,
    ) -> Result<OrderBook> {
        let mut url = self.endpoint_url("orders", network_id);
        if let Some(maker) = &maker_address {
            url.query_pairs_mut().append_pair("makerAddress", maker);
        }
        url.query_pairs_mut()
            .append_pair("perPage", &per_page.to_string());
        self.get(url).await
    }

    async fn get_fee_recipients(&self, network_id: u64) -> Result<Vec<String>> {
        let url = self.endpoint_url("fee_recipients", network_id);
        let response: FeeRecipientsResponse = self.get(url).await?;
        Ok(response.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const EMPTY_BOOK: &str = r#"{"total":0,"page":1,"perPage":20,"records":[]}"#;

    fn client(base_url: &str) -> RelayerApiClient {
        RelayerApiClient::new(&RelayerConfig::new(base_url, "sra", "v3")).unwrap()
    }

    #[test]
    fn test_endpoint_url_joins_parts() {
        let client = client("https://relayer.example/api/");
        assert_eq!(
            client.endpoint_url("orderbook", 3).as_str(),
            "https://relayer.example/api/sra/v3/orderbook?networkId=3"
        );

        let bare = RelayerApiClient::new(&RelayerConfig::new("https://relayer.example", "/v2/", ""))
            .unwrap();
        assert_eq!(
            bare.endpoint_url("orders", 42).as_str(),
            "https://relayer.example/v2/orders?networkId=42"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RelayerApiClient::new(&RelayerConfig::new("not a url", "", "")),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_orderbook_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sra/v3/orderbook")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("baseAssetData".into(), "0xaa".into()),
                Matcher::UrlEncoded("quoteAssetData".into(), "0xbb".into()),
                Matcher::UrlEncoded("perPage".into(), "20".into()),
                Matcher::UrlEncoded("networkId".into(), "3".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"bids":{},"asks":{}}}"#, EMPTY_BOOK, EMPTY_BOOK))
            .create_async()
            .await;

        let book = client(&server.url())
            .get_orderbook("0xaa".into(), "0xbb".into(), 20, 3)
            .await
            .unwrap();
        assert_eq!(book.bids.per_page, 20);
        assert!(book.asks.records.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_orders_without_maker() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sra/v3/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("perPage".into(), "100".into()),
                Matcher::UrlEncoded("networkId".into(), "42".into()),
            ]))
            .with_body(EMPTY_BOOK)
            .create_async()
            .await;

        let orders = client(&server.url())
            .get_orders(None, DEFAULT_PER_PAGE, 42)
            .await
            .unwrap();
        assert_eq!(orders.total, 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fee_recipients() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sra/v3/fee_recipients")
            .match_query(Matcher::UrlEncoded("networkId".into(), "3".into()))
            .with_body(r#"{"total":1,"page":1,"perPage":100,"records":["0xa258b39954cef5cb142fd567a46cddb31a670124"]}"#)
            .create_async()
            .await;

        let recipients = client(&server.url()).get_fee_recipients(3).await.unwrap();
        assert_eq!(recipients, vec!["0xa258b39954cef5cb142fd567a46cddb31a670124"]);
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sra/v3/asset_pairs")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client(&server.url())
            .get_asset_pairs(DEFAULT_PER_PAGE, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: Some(502), .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sra/v3/asset_pairs")
            .match_query(Matcher::Any)
            .with_body("<html>")
            .create_async()
            .await;

        let err = client(&server.url())
            .get_asset_pairs(DEFAULT_PER_PAGE, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_transport());
    }
}
