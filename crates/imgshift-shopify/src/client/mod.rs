//! Authenticated client for the Shopify Admin GraphQL API.

mod files;
mod product;

use std::time::Duration;

use imgshift_core::AppConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ShopifyError;
use crate::rate_limit::{retry_with_backoff, RetryPolicy};
use crate::types::GraphQlResponse;

pub use files::mime_type_for;

/// Upper bound on search pages; each page holds 250 products.
pub(super) const MAX_PAGES: usize = 200;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Admin API client for one store.
///
/// Every request (GraphQL, image download, staged upload) runs under the
/// same [`RetryPolicy`]. Calls are sequential; the client holds no
/// per-request state.
pub struct ShopifyAdminClient {
    pub(super) client: Client,
    pub(super) graphql_url: String,
    token: String,
    pub(super) retry: RetryPolicy,
    pub(super) poll_attempts: u32,
    pub(super) poll_interval: Duration,
}

impl std::fmt::Debug for ShopifyAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminClient")
            .field("graphql_url", &self.graphql_url)
            .field("token", &"[redacted]")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ShopifyAdminClient {
    /// Builds a client for `https://{config.shopify_store}`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidStoreUrl`] if the store domain does not
    /// form a valid URL, or [`ShopifyError::Http`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ShopifyError> {
        Self::with_base_url(config, &format!("https://{}", config.shopify_store))
    }

    /// Like [`Self::new`] but against an arbitrary origin. Used by tests to
    /// point at a mock server.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, ShopifyError> {
        let base = base_url.trim_end_matches('/');
        let graphql_url = format!(
            "{base}/admin/api/{}/graphql.json",
            config.shopify_api_version
        );
        reqwest::Url::parse(&graphql_url).map_err(|e| ShopifyError::InvalidStoreUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            graphql_url,
            token: config.shopify_admin_api_token.clone(),
            retry: RetryPolicy::from_config(config),
            poll_attempts: config.upload_poll_attempts,
            poll_interval: Duration::from_millis(config.upload_poll_interval_ms),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Posts one GraphQL document and decodes `data` into `T`.
    ///
    /// HTTP 429 and `THROTTLED` errors surface as
    /// [`ShopifyError::RateLimited`] and are retried; 401/403 are
    /// [`ShopifyError::Auth`]; other top-level `errors` become
    /// [`ShopifyError::GraphQl`] when no `data` came back.
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: &Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        retry_with_backoff(self.retry, || {
            let body = &body;
            async move {
                let response = self
                    .client
                    .post(&self.graphql_url)
                    .header(ACCESS_TOKEN_HEADER, &self.token)
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(ShopifyError::Auth {
                        status: status.as_u16(),
                    });
                }
                check_status(&response, &self.graphql_url)?;

                let text = response.text().await?;
                decode_graphql(operation, &text)
            }
        })
        .await
    }
}

/// Maps a non-success status to a typed error: 429 to
/// [`ShopifyError::RateLimited`], 5xx to [`ShopifyError::Transient`], and
/// anything else to [`ShopifyError::UnexpectedStatus`].
pub(super) fn check_status(response: &reqwest::Response, url: &str) -> Result<(), ShopifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        return Err(ShopifyError::RateLimited {
            endpoint: url.to_owned(),
            retry_after_secs,
        });
    }
    if status.is_server_error() {
        return Err(ShopifyError::Transient {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    Err(ShopifyError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
    })
}

/// Shopify sends `Retry-After` as fractional seconds (`"2.0"`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_retry_after(value: &str) -> Option<u64> {
    let secs = value.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.ceil() as u64)
}

fn decode_graphql<T: DeserializeOwned>(operation: &str, text: &str) -> Result<T, ShopifyError> {
    let envelope: GraphQlResponse<Value> =
        serde_json::from_str(text).map_err(|source| ShopifyError::Deserialize {
            context: format!("{operation} response"),
            source,
        })?;

    if envelope.errors.iter().any(crate::types::GraphQlError::is_throttled) {
        return Err(ShopifyError::RateLimited {
            endpoint: operation.to_owned(),
            retry_after_secs: None,
        });
    }

    let data = envelope.data.filter(|d| !d.is_null());
    if !envelope.errors.is_empty() {
        let message = envelope
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if data.is_none() {
            return Err(ShopifyError::GraphQl {
                operation: operation.to_owned(),
                message,
            });
        }
        tracing::warn!(operation, errors = %message, "GraphQL response carried partial errors");
    }

    let data = data.ok_or_else(|| ShopifyError::DataShape {
        context: operation.to_owned(),
        reason: "response has no data".to_owned(),
    })?;
    serde_json::from_value(data).map_err(|source| ShopifyError::Deserialize {
        context: format!("{operation} data"),
        source,
    })
}
