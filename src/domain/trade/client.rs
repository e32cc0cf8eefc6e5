//! Trade-history fetcher: page discovery and batched concurrent retrieval.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::future::try_join_all;

use super::wire::{TradeHistoryPage, TradeHistoryRequest};
use super::{FetchProgress, Trade, TradeFilters, TradeHistory};
use crate::error::{GraphError, HttpError};

/// Anything that can answer one page of a trade-history query.
///
/// `TradeGraphHttp` is the network implementation; tests substitute in-memory
/// sources.
pub trait TradeHistorySource: Send + Sync {
    fn fetch_page(
        &self,
        request: &TradeHistoryRequest,
    ) -> impl Future<Output = Result<TradeHistoryPage, HttpError>> + Send;
}

/// Retrieves every page of a trade-history query.
///
/// Page 1 is always fetched first to discover `num_pages`; the remaining pages
/// are fetched in sequential batches whose members run concurrently. Any
/// failure aborts the whole fetch. Nothing is cached between calls.
pub struct TradeHistoryFetcher<S> {
    source: S,
    max_window: Duration,
    batch_size: usize,
}

impl<S: TradeHistorySource> TradeHistoryFetcher<S> {
    pub fn new(source: S, max_window: Duration, batch_size: usize) -> Self {
        Self {
            source,
            max_window,
            batch_size: batch_size.max(1),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn max_window(&self) -> Duration {
        self.max_window
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fetch all pages for `filters`, reporting progress after each page.
    ///
    /// Validation runs before any request is issued.
    pub async fn fetch_all<F>(
        &self,
        filters: &TradeFilters,
        on_progress: F,
    ) -> Result<TradeHistory, GraphError>
    where
        F: Fn(FetchProgress) + Sync,
    {
        filters.validate(self.max_window)?;

        let first_request = filters.to_request(1);
        let first = self.source.fetch_page(&first_request).await.map_err(|e| {
            tracing::warn!(currency = %filters.currency, "Trade history page 1 failed: {}", e);
            e
        })?;

        let pagination = first.pagination;
        let total_pages = pagination.num_pages.max(1);
        on_progress(FetchProgress::new(1, 1, total_pages));
        tracing::debug!(page = 1, total_pages, trades = first.trades.len(), "Fetched page");

        let mut trades: Vec<Trade> = first.trades.into_iter().map(Trade::from).collect();

        if pagination.num_pages <= 1 {
            tracing::info!(pages = 1, trades = trades.len(), "Trade history fetched");
            return Ok(TradeHistory { trades, pagination });
        }

        let remaining: Vec<u32> = (2..=total_pages).collect();
        let completed = AtomicU32::new(1);
        let completed = &completed;
        let on_progress = &on_progress;

        for batch in remaining.chunks(self.batch_size) {
            let pages = try_join_all(batch.iter().map(|&page| {
                let request = first_request.for_page(page);
                async move {
                    let resp = self.source.fetch_page(&request).await.map_err(|source| {
                        tracing::warn!(page, total_pages, "Trade history page failed: {}", source);
                        GraphError::BatchFailed {
                            page,
                            total_pages,
                            source,
                        }
                    })?;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!(page, total_pages, trades = resp.trades.len(), "Fetched page");
                    on_progress(FetchProgress::new(page, done, total_pages));
                    Ok::<_, GraphError>(resp)
                }
            }))
            .await?;

            for page in pages {
                trades.extend(page.trades.into_iter().map(Trade::from));
            }
        }

        tracing::info!(pages = total_pages, trades = trades.len(), "Trade history fetched");
        Ok(TradeHistory { trades, pagination })
    }
}
