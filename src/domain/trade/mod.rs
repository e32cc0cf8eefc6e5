//! Trade domain: trade legs, history queries, paginated fetching.

pub mod client;
mod convert;
pub mod wire;

use crate::error::ValidationError;
use crate::shared::{Direction, InstrumentType, TradeId, TxStatus, WalletId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use client::{TradeHistoryFetcher, TradeHistorySource};
pub use wire::Pagination;

/// One leg of a two-party trade.
///
/// Numeric fields are parsed leniently: malformed upstream strings become
/// `NaN` rather than failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub trade_id: TradeId,
    pub wallet: WalletId,
    pub subaccount_id: u64,
    pub direction: Direction,
    pub trade_amount: f64,
    pub trade_price: f64,
    pub index_price: f64,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl Trade {
    /// `trade_amount × index_price`, the USD-denominated size of this leg.
    pub fn notional(&self) -> f64 {
        self.trade_amount * self.index_price
    }
}

/// Filter parameters for one trade-history query.
///
/// Owned by the application controller and updated through
/// `PartialFilters`; never read back from rendered UI.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFilters {
    pub currency: String,
    pub instrument_type: InstrumentType,
    /// Inclusive start of the time range.
    pub from: DateTime<Utc>,
    /// Inclusive end of the time range.
    pub to: DateTime<Utc>,
    pub tx_status: TxStatus,
    pub page_size: u32,
    /// Caller-requested page. The fetcher always starts at page 1 regardless.
    pub page: u32,
}

impl TradeFilters {
    /// Filters covering the `window` that ends now.
    pub fn last(currency: &str, window: Duration) -> Self {
        let to = Utc::now();
        let from = to - chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            currency: currency.to_string(),
            instrument_type: InstrumentType::default(),
            from,
            to,
            tx_status: TxStatus::default(),
            page_size: crate::network::DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }

    /// Reject empty/inverted ranges and ranges longer than `max_window`.
    pub fn validate(&self, max_window: Duration) -> Result<(), ValidationError> {
        let from_ms = self.from.timestamp_millis();
        let to_ms = self.to.timestamp_millis();
        if from_ms >= to_ms {
            return Err(ValidationError::EmptyRange { from_ms, to_ms });
        }

        let requested = Duration::from_millis((to_ms - from_ms) as u64);
        if requested > max_window {
            return Err(ValidationError::WindowTooLarge {
                requested,
                max: max_window,
            });
        }
        Ok(())
    }

    /// Wire request for `page`.
    pub fn to_request(&self, page: u32) -> wire::TradeHistoryRequest {
        wire::TradeHistoryRequest {
            currency: self.currency.clone(),
            instrument_type: self.instrument_type,
            from_timestamp: self.from.timestamp_millis(),
            to_timestamp: self.to.timestamp_millis(),
            page,
            page_size: self.page_size,
            tx_status: self.tx_status,
        }
    }
}

/// A partial filter update, as delivered by filter widgets.
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFilters {
    pub currency: Option<String>,
    pub instrument_type: Option<InstrumentType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub tx_status: Option<TxStatus>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
}

impl PartialFilters {
    /// Set both ends of the time range.
    pub fn range(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TradeFilters {
    /// Apply a partial update, returning the merged filters.
    pub fn merged(&self, patch: &PartialFilters) -> Self {
        Self {
            currency: patch.currency.clone().unwrap_or_else(|| self.currency.clone()),
            instrument_type: patch.instrument_type.unwrap_or(self.instrument_type),
            from: patch.from.unwrap_or(self.from),
            to: patch.to.unwrap_or(self.to),
            tx_status: patch.tx_status.unwrap_or(self.tx_status),
            page_size: patch.page_size.unwrap_or(self.page_size),
            page: patch.page.unwrap_or(self.page),
        }
    }
}

/// All pages of one query, concatenated in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeHistory {
    pub trades: Vec<Trade>,
    /// Pagination metadata from page 1.
    pub pagination: Pagination,
}

impl TradeHistory {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Progress notification emitted after each page resolves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchProgress {
    /// The page that just resolved.
    pub page: u32,
    /// Pages completed so far, including this one.
    pub current_page: u32,
    pub total_pages: u32,
    /// `current_page / total_pages × 100`.
    pub percentage: f64,
}

impl FetchProgress {
    pub fn new(page: u32, completed: u32, total_pages: u32) -> Self {
        let percentage = if total_pages == 0 {
            100.0
        } else {
            completed as f64 / total_pages as f64 * 100.0
        };
        Self {
            page,
            current_page: completed,
            total_pages,
            percentage,
        }
    }
}
