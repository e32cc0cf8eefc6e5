//! High-level client: `GraphClient` and its builder.
//!
//! Wraps the HTTP transport in a shared [`TradeHistoryFetcher`] and exposes
//! one-shot graph fetches plus controllers for long-lived views.

use crate::domain::graph::{aggregate, TradeGraph};
use crate::domain::trade::{FetchProgress, TradeFilters, TradeHistory, TradeHistoryFetcher};
use crate::error::GraphError;
use crate::http::TradeGraphHttp;
use crate::network::{
    DEFAULT_API_URL, DEFAULT_BATCH_SIZE, DEFAULT_MAX_WINDOW, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT,
};
use crate::shared::Viewport;

use std::sync::Arc;
use std::time::Duration;

/// The primary entry point.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) fetcher: Arc<TradeHistoryFetcher<TradeGraphHttp>>,
    pub(crate) page_size: u32,
}

impl GraphClient {
    pub fn builder() -> GraphClientBuilder {
        GraphClientBuilder::default()
    }

    pub fn http(&self) -> &TradeGraphHttp {
        self.fetcher.source()
    }

    pub fn fetcher(&self) -> &Arc<TradeHistoryFetcher<TradeGraphHttp>> {
        &self.fetcher
    }

    pub fn max_window(&self) -> Duration {
        self.fetcher.max_window()
    }

    /// Filters covering the longest allowed window, ending now.
    pub fn filters(&self, currency: &str) -> TradeFilters {
        TradeFilters {
            page_size: self.page_size,
            ..TradeFilters::last(currency, self.max_window())
        }
    }

    /// Fetch every page for `filters`.
    pub async fn fetch_trades<F>(
        &self,
        filters: &TradeFilters,
        on_progress: F,
    ) -> Result<TradeHistory, GraphError>
    where
        F: Fn(FetchProgress) + Sync,
    {
        self.fetcher.fetch_all(filters, on_progress).await
    }

    /// Fetch every page for `filters` and aggregate the result.
    pub async fn fetch_graph<F>(
        &self,
        filters: &TradeFilters,
        viewport: Viewport,
        on_progress: F,
    ) -> Result<TradeGraph, GraphError>
    where
        F: Fn(FetchProgress) + Sync,
    {
        let history = self.fetch_trades(filters, on_progress).await?;
        Ok(aggregate(&history.trades, viewport))
    }

    /// A controller for one graph view, sharing this client's fetcher.
    #[cfg(feature = "native")]
    pub fn controller(
        &self,
        filters: TradeFilters,
        settings: crate::settings::VisualSettings,
        viewport: Viewport,
    ) -> Result<crate::controller::GraphController<TradeGraphHttp>, GraphError> {
        crate::controller::GraphController::new(
            Arc::clone(&self.fetcher),
            filters,
            settings,
            viewport,
        )
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct GraphClientBuilder {
    base_url: String,
    max_window: Duration,
    batch_size: usize,
    page_size: u32,
    timeout: Duration,
}

impl Default for GraphClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            max_window: DEFAULT_MAX_WINDOW,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GraphClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Longest time range a query may span.
    pub fn max_window(mut self, window: Duration) -> Self {
        self.max_window = window;
        self
    }

    /// Pages requested concurrently after page 1. Clamped to at least 1.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GraphClient, GraphError> {
        let http = TradeGraphHttp::new(&self.base_url, self.timeout)?;
        Ok(GraphClient {
            fetcher: Arc::new(TradeHistoryFetcher::new(
                http,
                self.max_window,
                self.batch_size,
            )),
            page_size: self.page_size,
        })
    }
}
