//! Low-level HTTP client: `TradeGraphHttp`.
//!
//! One method per proxy endpoint. Returns wire types; conversion to domain
//! types happens in the fetcher.

use crate::domain::trade::client::TradeHistorySource;
use crate::domain::trade::wire::{RemoteErrorBody, TradeHistoryPage, TradeHistoryRequest};
use crate::error::HttpError;
use crate::network::TRADE_HISTORY_PATH;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Low-level HTTP client for the trade-history proxy.
///
/// Requests are never retried: a failed page fails the whole fetch and the
/// user decides whether to try again.
#[derive(Clone)]
pub struct TradeGraphHttp {
    base_url: String,
    client: Client,
}

impl TradeGraphHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Trade history ────────────────────────────────────────────────────

    pub async fn post_trade_history(
        &self,
        request: &TradeHistoryRequest,
    ) -> Result<TradeHistoryPage, HttpError> {
        let url = format!("{}{}", self.base_url, TRADE_HISTORY_PATH);
        tracing::debug!(page = request.page, currency = %request.currency, "POST {}", url);
        self.post(&url, request).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status();

        if status.is_success() {
            let bytes = resp.bytes().await?;
            return serde_json::from_slice::<T>(&bytes)
                .map_err(|e| HttpError::Decode(e.to_string()));
        }

        let body_text = resp.text().await.unwrap_or_default();
        Err(remote_error(status, &body_text))
    }
}

impl TradeHistorySource for TradeGraphHttp {
    async fn fetch_page(
        &self,
        request: &TradeHistoryRequest,
    ) -> Result<TradeHistoryPage, HttpError> {
        self.post_trade_history(request).await
    }
}

/// Map a non-2xx response to `HttpError::Remote`.
///
/// Uses the proxy's `{"message": ...}` body when it parses, otherwise the
/// status line (e.g. `502 Bad Gateway`).
pub(crate) fn remote_error(status: StatusCode, body: &str) -> HttpError {
    let message = serde_json::from_str::<RemoteErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| status_line(status));

    HttpError::Remote {
        status: status.as_u16(),
        message,
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
