use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use restockd_core::AvailabilityRecord;

use crate::error::{LookupError, NormalizeError};
use crate::normalize::normalize_stock_response;

/// Production endpoint of the stock provider.
pub const DEFAULT_BASE_URL: &str = "https://api.snormax.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the provider's Best Buy stock endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct StockClient {
    client: Client,
    endpoint: Url,
}

impl StockClient {
    /// Client against the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, LookupError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Client against an alternate endpoint, e.g. a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBaseUrl` if `base_url` does not parse, or an HTTP
    /// error if the client cannot be built.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, LookupError> {
        // Url::join drops the last path segment without a trailing slash.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalized)
            .and_then(|base| base.join("stock/bestbuy"))
            .map_err(|e| LookupError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(user_agent)
            .build()?;
        Ok(StockClient { client, endpoint })
    }

    fn build_url(&self, sku: &str, zip_code: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("sku", sku)
            .append_pair("zip", zip_code);
        url
    }

    /// Fetch and normalize current availability for a sku at a zip code.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when the request exceeds the configured timeout,
    /// `NotFound` on HTTP 404, `UnexpectedStatus` on other non-2xx
    /// statuses, `Http` on transport failures, and `Normalize` when the
    /// body is not a usable stock payload.
    pub async fn check_stock(
        &self,
        sku: &str,
        zip_code: &str,
    ) -> Result<AvailabilityRecord, LookupError> {
        let url = self.build_url(sku, zip_code);
        tracing::debug!(sku = %sku, zip_code = %zip_code, "requesting stock data");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_transport_error(e, sku))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                sku: sku.to_string(),
            });
        }
        if !status.is_success() {
            return Err(LookupError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, sku))?;
        let data: Value = serde_json::from_str(&body).map_err(|e| NormalizeError::Unexpected {
            context: format!("response body for sku {sku}"),
            reason: e.to_string(),
        })?;

        let record = normalize_stock_response(&data, sku)?;
        tracing::debug!(
            sku = %sku,
            zip_code = %zip_code,
            available = record.available,
            stores = record.stores.len(),
            "stock data normalized"
        );
        Ok(record)
    }
}

fn map_transport_error(error: reqwest::Error, sku: &str) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout {
            sku: sku.to_string(),
        }
    } else {
        LookupError::Http(error)
    }
}
