//! Wire types for the trade-history proxy (`POST /trade-history`).

use crate::shared::serde_util::string_or_number;
use crate::shared::{Direction, InstrumentType, TradeId, TxStatus, WalletId};
use serde::{Deserialize, Serialize};

/// Request body forwarded by the proxy to the market-data API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeHistoryRequest {
    pub currency: String,
    pub instrument_type: InstrumentType,
    /// Unix milliseconds, inclusive.
    pub from_timestamp: i64,
    /// Unix milliseconds, inclusive.
    pub to_timestamp: i64,
    pub page: u32,
    pub page_size: u32,
    pub tx_status: TxStatus,
}

impl TradeHistoryRequest {
    /// Same query, different page.
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// One leg of a two-party trade, as sent by the API.
///
/// Numeric fields stay as strings here; parsing happens in the conversion
/// to the domain `Trade`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub trade_id: TradeId,
    pub wallet: WalletId,
    pub subaccount_id: u64,
    pub direction: Direction,
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub trade_amount: String,
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub trade_price: String,
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub index_price: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Pagination metadata. Only the first page's copy is authoritative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Pagination {
    pub num_pages: u32,
    pub count: u64,
}

/// One page of the trade-history response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeHistoryPage {
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    pub pagination: Pagination,
}

/// Error body returned by the proxy alongside the remote status.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteErrorBody {
    pub message: String,
}
